//! Game state machines for PlaySync.
//!
//! Five two-player games, each a [`GameRules`] implementation:
//!
//! | Game | Type | Ends when |
//! |---|---|---|
//! | rock-paper-scissors | [`Rps`] | a seat earns more than `best_of / 2` points |
//! | tic-tac-toe | [`TicTacToe`] | three in a row, or a full board |
//! | reaction time | [`Reaction`] | both players tapped after the signal |
//! | quick math | [`QuickMath`] | a correct answer, or both answered |
//! | would-you-rather | [`WouldYouRather`] | every round has both choices |
//!
//! [`GameMachine`] closes over the five and is what a room holds.
//! [`GameSession`] wraps one machine with the match's scoreboard and
//! final result.
//!
//! None of these types lock anything. A room owns its session outright
//! and feeds it one move at a time.

mod config;
mod error;
mod machine;
mod quickmath;
mod reaction;
mod rps;
mod rules;
mod session;
mod tictactoe;
mod wyr;

pub use config::GameConfig;
pub use error::MoveError;
pub use machine::GameMachine;
pub use quickmath::{QuickMath, QuickMathMove};
pub use reaction::Reaction;
pub use rps::{Rps, RpsMove};
pub use rules::{GameContext, GameRules, MoveAccepted, Scoreboard};
pub use session::GameSession;
pub use tictactoe::{TicTacToe, TicTacToeMove};
pub use wyr::{QUESTIONS, WouldYouRather, WyrMove};
