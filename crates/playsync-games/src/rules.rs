//! The `GameRules` trait and the pieces every game shares.

use std::collections::BTreeMap;

use playsync_protocol::{GameView, MatchResult, MoveData, PlayerId};
use serde::de::DeserializeOwned;

use crate::{GameConfig, MoveError};

/// A move the game accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAccepted {
    pub message: String,
    pub data: MoveData,
}

impl MoveAccepted {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: MoveData::default(),
        }
    }

    pub fn with_data(mut self, data: MoveData) -> Self {
        self.data = data;
        self
    }
}

/// Per-player points for one match.
///
/// Seeded from the room's cumulative scores on rematch, or all zero on a
/// fresh game. Games that award points during play write into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard(BTreeMap<PlayerId, u32>);

impl Scoreboard {
    /// Everyone in `seats` starts at zero.
    pub fn zeroed(seats: &[PlayerId]) -> Self {
        Self(seats.iter().map(|&p| (p, 0)).collect())
    }

    /// Everyone in `seats` starts from `seed`, defaulting to zero.
    pub fn seeded(seats: &[PlayerId], seed: &BTreeMap<PlayerId, u32>) -> Self {
        Self(
            seats
                .iter()
                .map(|p| (*p, seed.get(p).copied().unwrap_or(0)))
                .collect(),
        )
    }

    pub fn get(&self, player: PlayerId) -> u32 {
        self.0.get(&player).copied().unwrap_or(0)
    }

    /// Adds `points` to a player's score.
    pub fn award(&mut self, player: PlayerId, points: u32) {
        *self.0.entry(player).or_insert(0) += points;
    }

    /// Adds `points` to every player on the board.
    pub fn award_all(&mut self, points: u32) {
        for score in self.0.values_mut() {
            *score += points;
        }
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.0.keys().copied()
    }

    pub fn as_map(&self) -> &BTreeMap<PlayerId, u32> {
        &self.0
    }
}

/// What a game needs to know about the room when it starts.
#[derive(Debug, Clone)]
pub struct GameContext {
    /// Players in join order. Seat 1 is index 0.
    pub seats: [PlayerId; 2],
    /// Tic-tac-toe matches already played in this room.
    pub prior_tictactoe: usize,
    pub config: GameConfig,
}

/// Rules of one game.
///
/// Implementations start themselves in their constructor and are then
/// driven one move at a time. Every method takes `&self` or `&mut self`,
/// so whoever owns the machine decides how access is serialized; the room
/// actor owns exactly one and handles one command at a time, which makes
/// each `process_move` (including any round resolution it triggers) atomic.
pub trait GameRules {
    /// The move payload clients send, decoded from the `move` field.
    type Move: DeserializeOwned;

    /// Validates and applies one move.
    ///
    /// `scores` is the match scoreboard; games that score during play
    /// (rock-paper-scissors) award into it.
    fn process_move(
        &mut self,
        player: PlayerId,
        mv: Self::Move,
        scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError>;

    fn is_complete(&self) -> bool;

    /// The final outcome. `None` until [`is_complete`](Self::is_complete).
    fn results(&self) -> Option<MatchResult>;

    /// What clients may see right now.
    fn view(&self) -> GameView;
}

/// Returns 0 or 1 for a seated player.
pub(crate) fn seat_of(seats: &[PlayerId; 2], player: PlayerId) -> Result<usize, MoveError> {
    seats
        .iter()
        .position(|&p| p == player)
        .ok_or(MoveError::NotSeated)
}
