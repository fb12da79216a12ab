//! Error types for the game layer.

use playsync_protocol::{ErrorKind, MoveData};

/// Why a game refused a move.
///
/// The `Display` text is what the mover sees in `game_move_response`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The move payload didn't have the shape this game expects.
    #[error("Invalid move payload: {0}")]
    MalformedPayload(String),

    /// Rock-paper-scissors symbol outside rock/paper/scissors.
    #[error("Invalid move")]
    InvalidChoice,

    /// Would-you-rather answer other than `a` or `b`.
    #[error("Invalid choice")]
    InvalidOption,

    #[error("Invalid position")]
    InvalidPosition,

    #[error("Invalid answer format")]
    InvalidAnswer,

    #[error("Not your turn")]
    NotYourTurn,

    /// The client named a round other than the one being played.
    #[error("Move belongs to a different round")]
    StaleRound { current: u32, requested: u32 },

    #[error("Already submitted for this round")]
    AlreadySubmitted,

    #[error("Position already taken")]
    PositionTaken,

    #[error("Already recorded")]
    AlreadyRecorded,

    #[error("Already answered")]
    AlreadyAnswered,

    /// A reaction tap that landed before the go signal.
    #[error("Too early - disqualified")]
    EarlyTap,

    #[error("Player is not part of this game")]
    NotSeated,

    #[error("Game is already complete")]
    MatchOver,

    /// The machine's state stopped making sense. The room drops the game.
    #[error("Game aborted: {0}")]
    Corrupted(String),
}

impl MoveError {
    /// Maps this error onto the client-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedPayload(_)
            | Self::InvalidChoice
            | Self::InvalidOption
            | Self::InvalidPosition
            | Self::InvalidAnswer
            | Self::NotYourTurn
            | Self::EarlyTap => ErrorKind::InvalidInput,
            Self::StaleRound { .. }
            | Self::AlreadySubmitted
            | Self::PositionTaken
            | Self::AlreadyRecorded
            | Self::AlreadyAnswered => ErrorKind::Conflict,
            Self::NotSeated => ErrorKind::NotFound,
            Self::MatchOver | Self::Corrupted(_) => ErrorKind::State,
        }
    }

    /// Extra fields sent with the rejection.
    pub fn data(&self) -> MoveData {
        match self {
            Self::EarlyTap => MoveData {
                early_tap: Some(true),
                ..MoveData::default()
            },
            _ => MoveData::default(),
        }
    }

    /// `true` if the active game must be thrown away.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Corrupted(_))
    }
}
