//! Per-game visible state and match results.
//!
//! Each game gets its own explicit record. Views and results are
//! serialized with an internal `"game"` tag holding the game's wire name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{GameKind, PlayerId};

// ---------------------------------------------------------------------------
// Rock-paper-scissors
// ---------------------------------------------------------------------------

/// One of the three rock-paper-scissors symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    pub const ALL: [RpsChoice; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    /// The symbol this one defeats.
    pub fn beats(self) -> RpsChoice {
        match self {
            Self::Rock => Self::Scissors,
            Self::Scissors => Self::Paper,
            Self::Paper => Self::Rock,
        }
    }

    /// Case-insensitive parse of a client's choice string.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rock" => Some(Self::Rock),
            "paper" => Some(Self::Paper),
            "scissors" => Some(Self::Scissors),
            _ => None,
        }
    }
}

/// How a single rock-paper-scissors round went, from seat 1's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Tie,
    P1Win,
    P2Win,
}

impl RoundOutcome {
    /// Resolves seat 1's choice against seat 2's.
    pub fn between(p1: RpsChoice, p2: RpsChoice) -> Self {
        if p1 == p2 {
            Self::Tie
        } else if p1.beats() == p2 {
            Self::P1Win
        } else {
            Self::P2Win
        }
    }
}

/// A resolved rock-paper-scissors round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpsRound {
    pub round: u32,
    pub p1_choice: RpsChoice,
    pub p2_choice: RpsChoice,
    pub winner: Option<PlayerId>,
    pub result: RoundOutcome,
}

// ---------------------------------------------------------------------------
// Tic-tac-toe
// ---------------------------------------------------------------------------

/// A tic-tac-toe mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn other(self) -> Symbol {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

/// The 3x3 board, row-major, cells 0..=8.
pub type Board = [Option<Symbol>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardOutcome {
    Win,
    Draw,
}

// ---------------------------------------------------------------------------
// Quick math / would-you-rather
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    FirstCorrect,
    NoWinner,
}

/// One of the two would-you-rather options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WyrChoice {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WyrQuestion {
    pub a: String,
    pub b: String,
}

/// An archived would-you-rather round: the question and what each
/// player picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WyrRound {
    pub round: u32,
    pub question: WyrQuestion,
    pub choices: BTreeMap<PlayerId, WyrChoice>,
}

// ---------------------------------------------------------------------------
// GameView
// ---------------------------------------------------------------------------

/// The client-visible state of an in-progress match.
///
/// Only what clients may see goes in here. Rock-paper-scissors and
/// would-you-rather expose *who* has submitted this round, never *what*.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameView {
    Rps {
        current_round: u32,
        best_of: u32,
        rounds: Vec<RpsRound>,
        submitted: Vec<PlayerId>,
    },
    #[serde(rename = "tictactoe")]
    TicTacToe {
        board: Board,
        player_to_symbol: BTreeMap<PlayerId, Symbol>,
        current_player: PlayerId,
        move_count: u32,
    },
    Reaction {
        delay_ms: u64,
        start_time: u64,
        ready: bool,
        reactions: BTreeMap<PlayerId, u64>,
    },
    #[serde(rename = "quickmath")]
    QuickMath {
        question: String,
        answered_count: u32,
    },
    WouldYouRather {
        question: WyrQuestion,
        round: u32,
        max_rounds: u32,
        submitted: Vec<PlayerId>,
        rounds: Vec<WyrRound>,
    },
}

// ---------------------------------------------------------------------------
// MatchResult
// ---------------------------------------------------------------------------

/// How a finished match should be scored by its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// One player won: they get a point.
    Winner(PlayerId),
    /// A draw: every player gets a point.
    Draw,
    /// Nothing to score (no correct answer, or a game without winners).
    NoContest,
}

/// Final outcome of a match, broadcast in `game_ended` and kept in the
/// room's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum MatchResult {
    /// `winner` is seat 1 when the scores are level.
    Rps {
        winner: PlayerId,
        scores: BTreeMap<PlayerId, u32>,
        rounds: Vec<RpsRound>,
        best_of: u32,
    },
    #[serde(rename = "tictactoe")]
    TicTacToe {
        winner: Option<PlayerId>,
        result: BoardOutcome,
        board: Board,
    },
    Reaction {
        winner: PlayerId,
        reaction_times: BTreeMap<PlayerId, u64>,
        delay_ms: u64,
    },
    #[serde(rename = "quickmath")]
    QuickMath {
        winner: Option<PlayerId>,
        question: String,
        correct_answer: u32,
        result_type: AnswerOutcome,
        answers: BTreeMap<PlayerId, i64>,
    },
    WouldYouRather {
        max_rounds: u32,
        rounds: Vec<WyrRound>,
        message: String,
    },
}

impl MatchResult {
    /// Which game produced this result.
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Rps { .. } => GameKind::RockPaperScissors,
            Self::TicTacToe { .. } => GameKind::TicTacToe,
            Self::Reaction { .. } => GameKind::ReactionTime,
            Self::QuickMath { .. } => GameKind::QuickMath,
            Self::WouldYouRather { .. } => GameKind::WouldYouRather,
        }
    }

    /// Collapses the result into the scoring decision the room applies.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Rps { winner, .. } => Verdict::Winner(*winner),
            Self::TicTacToe { winner, result, .. } => match (result, winner) {
                (BoardOutcome::Win, Some(pid)) => Verdict::Winner(*pid),
                _ => Verdict::Draw,
            },
            Self::Reaction { winner, .. } => Verdict::Winner(*winner),
            Self::QuickMath { winner, .. } => match winner {
                Some(pid) => Verdict::Winner(*pid),
                None => Verdict::NoContest,
            },
            Self::WouldYouRather { .. } => Verdict::NoContest,
        }
    }
}

// ---------------------------------------------------------------------------
// MoveData
// ---------------------------------------------------------------------------

/// Game-specific extras attached to a move response.
///
/// Absent fields are omitted from the JSON, so a plain accepted
/// rock-paper-scissors choice serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_tap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}
