//! # PlaySync
//!
//! Ephemeral two-player rooms for quick party games over WebSocket.
//!
//! A player creates a room, shares its short code, and a friend joins.
//! Inside the room they play rock-paper-scissors, tic-tac-toe, a reaction
//! test, quick math or would-you-rather, with a running score and a small
//! chat. Rooms live in memory and vanish once empty or idle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playsync::prelude::*;
//!
//! # async fn start() -> Result<(), PlaySyncError> {
//! let server = PlaySyncServer::builder()
//!     .bind("127.0.0.1:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! The [`Gateway`] is the transport-free core: it takes decoded
//! [`ClientEvent`](playsync_protocol::ClientEvent)s and returns replies and
//! room broadcasts, which makes it the natural entry point for embedding
//! and tests.

mod config;
mod connections;
mod error;
mod gateway;
mod handler;
mod identity;
mod server;

pub use config::ServerConfig;
pub use connections::{ConnectionTable, Seat};
pub use error::PlaySyncError;
pub use gateway::{Gateway, Outbound};
pub use identity::{AVATAR_COLORS, IdentitySource, RandomIdentity};
pub use server::{PlaySyncServer, PlaySyncServerBuilder};

/// Convenience re-exports for server users.
pub mod prelude {
    pub use crate::{
        Gateway, IdentitySource, Outbound, PlaySyncError, PlaySyncServer, ServerConfig,
    };
    pub use playsync_games::GameConfig;
    pub use playsync_protocol::{
        ClientEvent, ErrorKind, GameKind, PlayerId, RoomCode, RoomSnapshot, ServerEvent,
    };
    pub use playsync_room::{RoomConfig, RoomRegistry};
}
