//! Client and server events.
//!
//! Every frame on the wire is one event, adjacently tagged:
//!
//! ```text
//! { "event": "join_room_request", "data": { "room_id": "AB3X9KQZ" } }
//! ```
//!
//! The event name tells the gateway which handler to run; `data` is that
//! handler's payload.

use serde::{Deserialize, Serialize};

use crate::{
    ChatEntry, ErrorKind, GameKind, MatchResult, MoveData, PlayerId, RoomCode,
    RoomSnapshot,
};

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Everything a client can ask for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Open a fresh, empty room.
    CreateRoom,

    /// Take a seat in a room. Name and colour are generated when absent.
    JoinRoomRequest {
        room_id: RoomCode,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        avatar_color: Option<String>,
    },

    /// Give up a seat. `player_id` must be the caller's own id.
    LeaveRoomRequest {
        room_id: RoomCode,
        player_id: PlayerId,
    },

    /// Start a match. `reset_scores: false` is a rematch that carries the
    /// running tally forward.
    StartGameRequest {
        room_id: RoomCode,
        game_type: String,
        #[serde(default)]
        reset_scores: bool,
    },

    /// Submit a game-specific move. The payload shape depends on the game
    /// being played and is validated by that game.
    GameMove {
        room_id: RoomCode,
        #[serde(rename = "move", default)]
        payload: serde_json::Value,
    },

    /// The client's reaction countdown is showing.
    ReactionReady { room_id: RoomCode },

    ChatMessage { room_id: RoomCode, message: String },

    RematchRequest { room_id: RoomCode },

    /// Drop the current match without recording it.
    SwitchGameRequest { room_id: RoomCode },

    GetChatHistory { room_id: RoomCode },

    GetRoom { room_id: RoomCode },
}

impl ClientEvent {
    /// The wire name of this event, used in rejections and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom => "create_room",
            Self::JoinRoomRequest { .. } => "join_room_request",
            Self::LeaveRoomRequest { .. } => "leave_room_request",
            Self::StartGameRequest { .. } => "start_game_request",
            Self::GameMove { .. } => "game_move",
            Self::ReactionReady { .. } => "reaction_ready",
            Self::ChatMessage { .. } => "chat_message",
            Self::RematchRequest { .. } => "rematch_request",
            Self::SwitchGameRequest { .. } => "switch_game_request",
            Self::GetChatHistory { .. } => "get_chat_history",
            Self::GetRoom { .. } => "get_room",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Everything the server sends: direct replies and room broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// First frame on every connection.
    Connected { connection_id: u64 },

    RoomCreated { room_id: RoomCode },

    JoinRoomResponse {
        player_id: PlayerId,
        display_name: String,
        avatar_color: String,
        room: RoomSnapshot,
    },

    LeaveRoomResponse { room_id: RoomCode },

    StartGameResponse { game_type: GameKind },

    /// Reply to `game_move`, accepted or not.
    GameMoveResponse {
        success: bool,
        message: String,
        data: MoveData,
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<ErrorKind>,
    },

    PlayerJoined {
        player_id: PlayerId,
        display_name: String,
        avatar_color: String,
        room: RoomSnapshot,
    },

    PlayerLeft {
        player_id: PlayerId,
        room: RoomSnapshot,
    },

    GameStarted {
        game_type: GameKind,
        room: RoomSnapshot,
    },

    MoveMade {
        player_id: PlayerId,
        room: RoomSnapshot,
    },

    /// The match just finished. `room` still shows the finished match
    /// and its final scores.
    GameEnded {
        results: MatchResult,
        room: RoomSnapshot,
    },

    ChatMessage(ChatEntry),

    ChatHistory { messages: Vec<ChatEntry> },

    RematchRequested {
        player_id: PlayerId,
        display_name: String,
    },

    GameSwitched { room: RoomSnapshot },

    /// A member's presence or readiness changed.
    RoomUpdated { room: RoomSnapshot },

    RoomInfo { room: RoomSnapshot },

    /// A request failed. `request` is the client event name.
    Rejected {
        request: String,
        kind: ErrorKind,
        code: u16,
        message: String,
    },
}

impl ServerEvent {
    /// Builds a rejection for the named request.
    pub fn rejected(request: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Rejected {
            request: request.to_string(),
            kind,
            code: kind.code(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_adjacent_tag_format() {
        let json = r#"{
            "event": "join_room_request",
            "data": { "room_id": "ab3x9kqz", "display_name": "Ada" }
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoomRequest {
                room_id: RoomCode::new("AB3X9KQZ"),
                display_name: Some("Ada".into()),
                avatar_color: None,
            }
        );
        assert_eq!(event.name(), "join_room_request");
    }

    #[test]
    fn test_client_event_unit_variant_without_data() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event": "create_room"}"#).unwrap();
        assert_eq!(event, ClientEvent::CreateRoom);
    }

    #[test]
    fn test_game_move_payload_is_kept_raw() {
        let json = r#"{
            "event": "game_move",
            "data": { "room_id": "ROOM", "move": { "choice": "rock", "round": 1 } }
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::GameMove { payload, .. } => {
                assert_eq!(payload["choice"], "rock");
                assert_eq!(payload["round"], 1);
            }
            other => panic!("expected GameMove, got {other:?}"),
        }
    }

    #[test]
    fn test_start_game_reset_scores_defaults_to_false() {
        let json = r#"{
            "event": "start_game_request",
            "data": { "room_id": "ROOM", "game_type": "rps" }
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            ClientEvent::StartGameRequest { reset_scores: false, .. }
        ));
    }

    #[test]
    fn test_unknown_client_event_fails_to_decode() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event": "fly_to_moon", "data": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejected_carries_code_for_kind() {
        let event = ServerEvent::rejected("get_room", ErrorKind::NotFound, "room ZZ not found");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "rejected");
        assert_eq!(json["data"]["request"], "get_room");
        assert_eq!(json["data"]["kind"], "not_found");
        assert_eq!(json["data"]["code"], 404);
    }

    #[test]
    fn test_move_response_omits_kind_when_accepted() {
        let event = ServerEvent::GameMoveResponse {
            success: true,
            message: "Choice recorded".into(),
            data: MoveData::default(),
            kind: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["success"], true);
        assert!(json["data"].get("kind").is_none());
    }

    #[test]
    fn test_chat_message_newtype_variant_format() {
        let event = ServerEvent::ChatMessage(ChatEntry {
            player_id: PlayerId(1),
            display_name: "Swift Fox".into(),
            avatar_color: "#0D9488".into(),
            message: "gg".into(),
            timestamp: 10,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "chat_message");
        assert_eq!(json["data"]["message"], "gg");
    }
}
