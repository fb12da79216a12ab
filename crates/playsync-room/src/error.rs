//! Error types for the room layer.

use playsync_protocol::{ErrorKind, PlayerId, RoomCode};

/// Errors from room and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room existed but sat idle past its timeout.
    #[error("room {0} has expired")]
    Expired(RoomCode),

    #[error("room {0} is full")]
    RoomFull(RoomCode),

    #[error("player {0} already in room {1}")]
    AlreadyMember(PlayerId, RoomCode),

    /// The player is seated somewhere else.
    #[error("player {0} is already in room {1}")]
    InAnotherRoom(PlayerId, RoomCode),

    #[error("player {0} not in room {1}")]
    NotMember(PlayerId, RoomCode),

    #[error("need {need} players to start, room has {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("no active game in room {0}")]
    NoActiveGame(RoomCode),

    #[error("chat message is empty")]
    EmptyMessage,

    #[error("chat message is longer than {0} characters")]
    MessageTooLong(usize),

    /// The room's actor stopped or its command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// Maps this error onto the client-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::Expired(_) | Self::NotMember(..) | Self::Unavailable(_) => {
                ErrorKind::NotFound
            }
            Self::RoomFull(_) => ErrorKind::Capacity,
            Self::AlreadyMember(..) | Self::InAnotherRoom(..) => ErrorKind::Conflict,
            Self::EmptyMessage | Self::MessageTooLong(_) => ErrorKind::InvalidInput,
            Self::NotEnoughPlayers { .. } | Self::NoActiveGame(_) => ErrorKind::State,
        }
    }
}
