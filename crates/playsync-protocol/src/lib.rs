//! Wire protocol for PlaySync.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`PlayerId`], [`RoomCode`], [`GameKind`], [`ErrorKind`])
//!   shared by every layer.
//! - **Game records** ([`GameView`], [`MatchResult`]): the visible state
//!   and final outcome of each game, one explicit shape per game.
//! - **Snapshots** ([`RoomSnapshot`], [`ChatEntry`]) broadcast to a room.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) that travel as
//!   `{"event": ..., "data": ...}` text frames.
//! - **Codec** ([`Codec`], [`JsonCodec`]) for framing.
//!
//! It knows nothing about sockets or rooms; it only describes messages.

mod codec;
mod error;
mod events;
mod game;
mod snapshot;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use game::{
    AnswerOutcome, Board, BoardOutcome, GameView, MatchResult, MoveData,
    RoundOutcome, RpsChoice, RpsRound, Symbol, Verdict, WyrChoice, WyrQuestion,
    WyrRound,
};
pub use snapshot::{ActiveGame, ChatEntry, HistoryEntry, PlayerView, RoomSnapshot};
pub use types::{ErrorKind, GameKind, PlayerId, RoomCode, UnknownGameKind, unix_millis};
