//! Room snapshots: the full visible state of a room, sent after every
//! membership or game change.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{GameKind, GameView, MatchResult, PlayerId, RoomCode};

/// One player as seen by every member of the room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub display_name: String,
    pub avatar_color: String,
    pub score: u32,
    pub is_ready: bool,
    pub is_active: bool,
}

/// The match currently being played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveGame {
    pub game_type: GameKind,
    /// Unix milliseconds.
    pub started_at: u64,
    pub player_scores: BTreeMap<PlayerId, u32>,
    pub state_data: GameView,
}

/// A match that already finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub game_type: GameKind,
    pub results: Option<MatchResult>,
    /// Unix milliseconds.
    pub started_at: u64,
}

/// Everything a client needs to render a room.
///
/// Always computed in one go from the room's current state, so a snapshot
/// never mixes pre- and post-move values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    /// Unix milliseconds.
    pub created_at: u64,
    pub player_count: usize,
    pub max_players: usize,
    /// Players in join order: index 0 is seat 1.
    pub players: Vec<PlayerView>,
    pub current_game: Option<ActiveGame>,
    pub game_history: Vec<HistoryEntry>,
}

impl RoomSnapshot {
    /// Looks up a player's entry by id.
    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}

/// A chat line, broadcast as-is and kept in the room's short history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub player_id: PlayerId,
    pub display_name: String,
    pub avatar_color: String,
    pub message: String,
    /// Unix milliseconds.
    pub timestamp: u64,
}
