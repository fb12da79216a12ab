//! Session gateway: turns client events into room calls, and room
//! results into replies and room-scoped broadcasts.
//!
//! The gateway is transport-agnostic. [`Gateway::handle`] returns a list
//! of [`Outbound`] events and never touches a socket; [`Gateway::deliver`]
//! fans that list out through the [`ConnectionTable`]. Tests drive the
//! first half directly.

use playsync_protocol::{
    ClientEvent, Codec, GameKind, JsonCodec, MoveData, PlayerId, RoomCode, ServerEvent,
};
use playsync_room::{MoveOutcome, Player, RoomError, RoomHandle, RoomRegistry};
use playsync_transport::{ConnectionId, Outbox};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::connections::{ConnectionTable, Seat};
use crate::identity::{IdentitySource, RandomIdentity};
use crate::PlaySyncError;

/// Where an event should go.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Back to the connection that sent the request.
    Reply(ServerEvent),
    /// To every connection seated in the room, the sender included.
    Broadcast(RoomCode, ServerEvent),
}

/// Routes client events for every connection in the process.
pub struct Gateway<I: IdentitySource = RandomIdentity, C: Codec = JsonCodec> {
    registry: RoomRegistry,
    connections: ConnectionTable,
    identity: I,
    codec: C,
}

impl Gateway {
    /// A gateway with random identities and JSON framing.
    pub fn new(registry: RoomRegistry) -> Self {
        Self::with_parts(registry, RandomIdentity, JsonCodec)
    }
}

impl<I: IdentitySource, C: Codec> Gateway<I, C> {
    pub fn with_parts(registry: RoomRegistry, identity: I, codec: C) -> Self {
        Self {
            registry,
            connections: ConnectionTable::new(),
            identity,
            codec,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionTable {
        &self.connections
    }

    /// Decodes one text frame and handles it.
    ///
    /// A frame that isn't a known event gets a `rejected` reply; the
    /// connection stays open.
    pub async fn handle_text(&self, conn: ConnectionId, text: &str) -> Vec<Outbound> {
        match self.codec.decode::<ClientEvent>(text) {
            Ok(event) => self.handle(conn, event).await,
            Err(e) => {
                debug!(%conn, error = %e, "undecodable frame");
                let request = request_name(text);
                vec![Outbound::Reply(ServerEvent::rejected(
                    &request,
                    e.kind(),
                    e.to_string(),
                ))]
            }
        }
    }

    /// Handles one client event.
    pub async fn handle(&self, conn: ConnectionId, event: ClientEvent) -> Vec<Outbound> {
        let request = event.name();
        let result = match event {
            ClientEvent::CreateRoom => self.on_create_room().await,
            ClientEvent::JoinRoomRequest {
                room_id,
                display_name,
                avatar_color,
            } => self.on_join(conn, room_id, display_name, avatar_color).await,
            ClientEvent::LeaveRoomRequest { room_id, player_id } => {
                self.on_leave(conn, room_id, player_id).await
            }
            ClientEvent::StartGameRequest {
                room_id,
                game_type,
                reset_scores,
            } => self.on_start_game(conn, room_id, &game_type, reset_scores).await,
            // Move failures are reported in `game_move_response`, never
            // as `rejected`.
            ClientEvent::GameMove { room_id, payload } => {
                return self.on_game_move(conn, room_id, payload).await;
            }
            ClientEvent::ReactionReady { room_id } => self.on_reaction_ready(conn, room_id).await,
            ClientEvent::ChatMessage { room_id, message } => {
                self.on_chat(conn, room_id, message).await
            }
            ClientEvent::RematchRequest { room_id } => self.on_rematch(conn, room_id).await,
            ClientEvent::SwitchGameRequest { room_id } => self.on_switch_game(conn, room_id).await,
            ClientEvent::GetChatHistory { room_id } => self.on_chat_history(conn, room_id).await,
            ClientEvent::GetRoom { room_id } => self.on_get_room(room_id).await,
        };

        result.unwrap_or_else(|e| {
            debug!(%conn, request, error = %e, "request rejected");
            vec![Outbound::Reply(ServerEvent::rejected(
                request,
                e.kind(),
                e.to_string(),
            ))]
        })
    }

    /// Cleans up after a closed connection.
    ///
    /// The player stays in the room, marked inactive, until they leave or
    /// the room expires. The room hears about it through `room_updated`.
    pub async fn disconnect(&self, conn: ConnectionId) -> Vec<Outbound> {
        let Some(seat) = self.connections.remove(conn).await else {
            return Vec::new();
        };
        info!(%conn, player_id = %seat.player, room = %seat.room, "player disconnected");

        let Some(handle) = self.registry.get_room(&seat.room).await else {
            return Vec::new();
        };
        match handle.disconnect(seat.player).await {
            Ok(room) => vec![Outbound::Broadcast(
                seat.room,
                ServerEvent::RoomUpdated { room },
            )],
            Err(e) => {
                debug!(%conn, error = %e, "disconnect after player left");
                Vec::new()
            }
        }
    }

    /// Sweeps idle rooms if a sweep is due, and unseats the connections
    /// that were in them. Returns how many rooms went away.
    pub async fn maybe_sweep(&self, now: Instant) -> usize {
        let swept = self.registry.maybe_sweep(now).await;
        for room in &swept {
            let unseated = self.connections.unbind_room(&room.code).await;
            debug!(room = %room.code, connections = unseated.len(), "unseated swept room");
        }
        swept.len()
    }

    /// Encodes and queues `outbound` for the connections it addresses.
    ///
    /// Delivery is best-effort: a full or closed outbox loses the frame
    /// and the rest still go out.
    pub async fn deliver(&self, conn: ConnectionId, outbound: Vec<Outbound>) {
        for item in outbound {
            let (targets, event) = match item {
                Outbound::Reply(event) => {
                    let targets: Vec<Outbox> =
                        self.connections.outbox(conn).await.into_iter().collect();
                    (targets, event)
                }
                Outbound::Broadcast(room, event) => {
                    (self.connections.recipients(&room).await, event)
                }
            };

            let text = match self.codec.encode(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(%conn, error = %e, "failed to encode server event");
                    continue;
                }
            };
            for outbox in targets {
                if let Err(e) = outbox.push(text.clone()) {
                    debug!(to = %outbox.id(), error = %e, "frame dropped");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    async fn on_create_room(&self) -> Result<Vec<Outbound>, PlaySyncError> {
        self.maybe_sweep(Instant::now()).await;
        let room_id = self.registry.create_room().await;
        Ok(vec![Outbound::Reply(ServerEvent::RoomCreated { room_id })])
    }

    async fn on_join(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
        display_name: Option<String>,
        avatar_color: Option<String>,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        if let Some(seat) = self.connections.seat(conn).await {
            let err = if seat.room == room_id {
                RoomError::AlreadyMember(seat.player, room_id)
            } else {
                RoomError::InAnotherRoom(seat.player, seat.room)
            };
            return Err(err.into());
        }

        let display_name = non_blank(display_name).unwrap_or_else(|| self.identity.display_name());
        let avatar_color = non_blank(avatar_color).unwrap_or_else(|| self.identity.avatar_color());
        let player_id = self.registry.next_player_id();
        let player = Player::new(
            player_id,
            display_name.clone(),
            avatar_color.clone(),
            Some(conn.into_inner()),
        );

        let room = self.registry.join(&room_id, player).await?;
        self.connections
            .bind(
                conn,
                Seat {
                    player: player_id,
                    room: room_id.clone(),
                },
            )
            .await;
        debug!(%conn, %player_id, room = %room_id, "connection seated");

        Ok(vec![
            Outbound::Reply(ServerEvent::JoinRoomResponse {
                player_id,
                display_name: display_name.clone(),
                avatar_color: avatar_color.clone(),
                room: room.clone(),
            }),
            Outbound::Broadcast(
                room_id,
                ServerEvent::PlayerJoined {
                    player_id,
                    display_name,
                    avatar_color,
                    room,
                },
            ),
        ])
    }

    async fn on_leave(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
        player_id: PlayerId,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let seat = self
            .connections
            .seat(conn)
            .await
            .filter(|seat| seat.room == room_id)
            .ok_or_else(|| PlaySyncError::NotSeated(room_id.clone()))?;
        if seat.player != player_id {
            return Err(PlaySyncError::ForeignPlayer(player_id));
        }

        let departure = self.registry.leave(&room_id, player_id).await?;
        self.connections.unbind(conn).await;
        debug!(%conn, %player_id, room = %room_id, "connection unseated");

        let mut out = vec![Outbound::Reply(ServerEvent::LeaveRoomResponse {
            room_id: room_id.clone(),
        })];
        if let Some(room) = departure.remaining {
            out.push(Outbound::Broadcast(
                room_id,
                ServerEvent::PlayerLeft { player_id, room },
            ));
        }
        Ok(out)
    }

    async fn on_start_game(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
        game_type: &str,
        reset_scores: bool,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (player_id, handle) = self.seated(conn, &room_id).await?;
        let kind: GameKind = game_type.parse()?;
        let room = handle.start_game(player_id, kind, reset_scores).await?;

        Ok(vec![
            Outbound::Reply(ServerEvent::StartGameResponse { game_type: kind }),
            Outbound::Broadcast(
                room_id,
                ServerEvent::GameStarted {
                    game_type: kind,
                    room,
                },
            ),
        ])
    }

    async fn on_game_move(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
        payload: Value,
    ) -> Vec<Outbound> {
        let attempt = async {
            let (player_id, handle) = self.seated(conn, &room_id).await?;
            let outcome = handle.submit_move(player_id, payload).await?;
            Ok::<_, PlaySyncError>((player_id, outcome))
        };

        match attempt.await {
            Ok((player_id, outcome)) => move_outbound(room_id, player_id, outcome),
            Err(e) => {
                debug!(%conn, room = %room_id, error = %e, "move refused");
                vec![Outbound::Reply(ServerEvent::GameMoveResponse {
                    success: false,
                    message: e.to_string(),
                    data: MoveData::default(),
                    kind: Some(e.kind()),
                })]
            }
        }
    }

    async fn on_reaction_ready(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (player_id, handle) = self.seated(conn, &room_id).await?;
        let room = handle.mark_ready(player_id).await?;
        Ok(vec![Outbound::Broadcast(
            room_id,
            ServerEvent::RoomUpdated { room },
        )])
    }

    async fn on_chat(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
        message: String,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (player_id, handle) = self.seated(conn, &room_id).await?;
        let entry = handle.post_chat(player_id, message).await?;
        Ok(vec![Outbound::Broadcast(
            room_id,
            ServerEvent::ChatMessage(entry),
        )])
    }

    async fn on_rematch(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (player_id, handle) = self.seated(conn, &room_id).await?;
        let display_name = handle.request_rematch(player_id).await?;
        Ok(vec![Outbound::Broadcast(
            room_id,
            ServerEvent::RematchRequested {
                player_id,
                display_name,
            },
        )])
    }

    async fn on_switch_game(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (player_id, handle) = self.seated(conn, &room_id).await?;
        let room = handle.switch_game(player_id).await?;
        Ok(vec![Outbound::Broadcast(
            room_id,
            ServerEvent::GameSwitched { room },
        )])
    }

    async fn on_chat_history(
        &self,
        conn: ConnectionId,
        room_id: RoomCode,
    ) -> Result<Vec<Outbound>, PlaySyncError> {
        let (_, handle) = self.seated(conn, &room_id).await?;
        let messages = handle.chat_history().await?;
        Ok(vec![Outbound::Reply(ServerEvent::ChatHistory { messages })])
    }

    async fn on_get_room(&self, room_id: RoomCode) -> Result<Vec<Outbound>, PlaySyncError> {
        let handle = self.room(&room_id).await?;
        let room = handle.snapshot().await?;
        Ok(vec![Outbound::Reply(ServerEvent::RoomInfo { room })])
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    async fn room(&self, room_id: &RoomCode) -> Result<RoomHandle, PlaySyncError> {
        self.registry
            .get_room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()).into())
    }

    /// The caller's player id in `room_id`, and that room's handle.
    async fn seated(
        &self,
        conn: ConnectionId,
        room_id: &RoomCode,
    ) -> Result<(PlayerId, RoomHandle), PlaySyncError> {
        let handle = self.room(room_id).await?;
        match self.connections.seat(conn).await {
            Some(seat) if &seat.room == room_id => Ok((seat.player, handle)),
            _ => Err(PlaySyncError::NotSeated(room_id.clone())),
        }
    }
}

/// Reply and broadcasts for a move the room processed.
///
/// An accepted move is announced with `move_made`; if it ended the match,
/// `game_ended` follows. A move that broke the game reaches the room as
/// `room_updated` with the game cleared. Ordinary rejections only go back
/// to the mover.
fn move_outbound(room_id: RoomCode, player_id: PlayerId, outcome: MoveOutcome) -> Vec<Outbound> {
    let MoveOutcome {
        reply,
        snapshot,
        finished,
    } = outcome;
    let accepted = reply.is_ok();

    let response = match reply {
        Ok(done) => ServerEvent::GameMoveResponse {
            success: true,
            message: done.message,
            data: done.data,
            kind: None,
        },
        Err(rejected) => ServerEvent::GameMoveResponse {
            success: false,
            message: rejected.to_string(),
            data: rejected.data(),
            kind: Some(rejected.kind()),
        },
    };

    let mut out = vec![Outbound::Reply(response)];
    if let Some(room) = snapshot {
        let event = if accepted {
            ServerEvent::MoveMade { player_id, room }
        } else {
            ServerEvent::RoomUpdated { room }
        };
        out.push(Outbound::Broadcast(room_id.clone(), event));
    }
    if let Some(finished) = finished {
        out.push(Outbound::Broadcast(
            room_id,
            ServerEvent::GameEnded {
                results: finished.results,
                room: finished.snapshot,
            },
        ));
    }
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Best guess at the event name of a frame that failed to decode.
fn request_name(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("event").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
