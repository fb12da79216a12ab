//! Rooms for PlaySync.
//!
//! A room is a two-seat table identified by a short code. Each room runs
//! as an isolated Tokio task (actor model) that owns its players, its
//! active match, its history and its chat log.
//!
//! # Key types
//!
//! - [`Room`]: the room's state and rules, synchronous
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`RoomRegistry`]: creates, finds and destroys rooms
//! - [`RoomConfig`]: timeouts, chat limits, game settings

mod actor;
mod code;
mod config;
mod error;
mod registry;
mod room;

pub use actor::{LeaveOutcome, RoomHandle, spawn_room};
pub use code::{CODE_ALPHABET, generate_code};
pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::{Departure, RoomRegistry, SweptRoom};
pub use room::{FinishedMatch, MoveOutcome, Player, Room};
