//! Identity and tag types shared by every PlaySync crate.
//!
//! These are the small values that show up everywhere: who a player is,
//! which room they are in, which game is being played, and what category
//! of failure a rejected request falls into.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a player.
///
/// Assigned by the server when a player joins a room. Serializes as the
/// bare integer, so `PlayerId(42)` is just `42` on the wire (and `"42"`
/// when used as a JSON object key).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{:x}", self.0)
    }
}

/// The short human-typed code that identifies a room.
///
/// Codes are case-insensitive for people, so every `RoomCode` is stored
/// upper-cased and trimmed. Deserializing goes through the same
/// normalisation, which means `"ab3x"` from a client finds room `AB3X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalises arbitrary user input into a room code.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// GameKind
// ---------------------------------------------------------------------------

/// The five games a room can play.
///
/// The serde names are the tags clients send in `start_game_request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    #[serde(rename = "rps")]
    RockPaperScissors,
    #[serde(rename = "tictactoe")]
    TicTacToe,
    #[serde(rename = "reaction")]
    ReactionTime,
    #[serde(rename = "quickmath")]
    QuickMath,
    #[serde(rename = "would_you_rather")]
    WouldYouRather,
}

impl GameKind {
    /// Every game, in lobby order.
    pub const ALL: [GameKind; 5] = [
        GameKind::RockPaperScissors,
        GameKind::TicTacToe,
        GameKind::ReactionTime,
        GameKind::QuickMath,
        GameKind::WouldYouRather,
    ];

    /// The wire tag for this game.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RockPaperScissors => "rps",
            Self::TicTacToe => "tictactoe",
            Self::ReactionTime => "reaction",
            Self::QuickMath => "quickmath",
            Self::WouldYouRather => "would_you_rather",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a client names a game that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game type: {0}")]
pub struct UnknownGameKind(pub String);

impl FromStr for GameKind {
    type Err = UnknownGameKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or(UnknownGameKind(tag))
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Category of a rejected request.
///
/// Every error in the system maps onto exactly one of these. None of them
/// are fatal to the connection: the client always gets a structured reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A room or player that doesn't exist (or no longer exists).
    NotFound,
    /// The room has no free seat.
    Capacity,
    /// The request clashes with what already happened: a duplicate
    /// join, a second answer, a move for a stale round.
    Conflict,
    /// Malformed payload, out-of-range value, unknown game or choice.
    InvalidInput,
    /// The room isn't in a state that allows this: no active game,
    /// match already over, not enough players.
    State,
}

impl ErrorKind {
    /// Numeric code sent alongside the kind, HTTP-flavoured.
    pub fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Capacity => 403,
            Self::Conflict => 409,
            Self::InvalidInput => 400,
            Self::State => 412,
        }
    }
}

/// Milliseconds since the Unix epoch, used for the wall-clock timestamps
/// that appear in snapshots and chat entries.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
