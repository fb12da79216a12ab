//! Unified error type for the PlaySync server.

use playsync_games::MoveError;
use playsync_protocol::{ErrorKind, PlayerId, ProtocolError, RoomCode, UnknownGameKind};
use playsync_room::RoomError;
use playsync_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` lift sub-crate errors, so gateway
/// handlers can mix registry, room and protocol calls freely.
#[derive(Debug, thiserror::Error)]
pub enum PlaySyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    UnknownGame(#[from] UnknownGameKind),

    /// The connection asked about a room it never joined.
    #[error("not a member of room {0}")]
    NotSeated(RoomCode),

    /// A leave named a player other than the caller.
    #[error("player {0} does not belong to this connection")]
    ForeignPlayer(PlayerId),
}

impl PlaySyncError {
    /// Maps this error onto the client-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::State,
            Self::Protocol(e) => e.kind(),
            Self::Room(e) => e.kind(),
            Self::Move(e) => e.kind(),
            Self::UnknownGame(_) => ErrorKind::InvalidInput,
            Self::NotSeated(_) | Self::ForeignPlayer(_) => ErrorKind::NotFound,
        }
    }
}
