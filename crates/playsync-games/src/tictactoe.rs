//! Tic-tac-toe. Seat 1 always moves first; who plays X alternates from
//! one match to the next.

use std::collections::BTreeMap;

use playsync_protocol::{Board, BoardOutcome, GameView, MatchResult, PlayerId, Symbol};
use serde::Deserialize;

use crate::rules::seat_of;
use crate::{GameRules, MoveAccepted, MoveError, Scoreboard};

/// The 8 winning lines: rows, columns, diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// `{"position": 4}`, cells 0..=8 row-major.
#[derive(Debug, Clone, Deserialize)]
pub struct TicTacToeMove {
    pub position: i64,
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    seats: [PlayerId; 2],
    symbols: [Symbol; 2],
    board: Board,
    /// Seat index of the player to move.
    to_move: usize,
    move_count: u32,
    outcome: Option<(BoardOutcome, Option<PlayerId>)>,
}

impl TicTacToe {
    /// `prior_matches` is how many tic-tac-toe matches this room already
    /// played; seat 1 is X on even counts.
    pub fn new(seats: [PlayerId; 2], prior_matches: usize) -> Self {
        let first = if prior_matches % 2 == 0 { Symbol::X } else { Symbol::O };
        Self {
            seats,
            symbols: [first, first.other()],
            board: [None; 9],
            to_move: 0,
            move_count: 0,
            outcome: None,
        }
    }

    pub fn symbol_of(&self, player: PlayerId) -> Option<Symbol> {
        seat_of(&self.seats, player).ok().map(|s| self.symbols[s])
    }

    fn winning_symbol(&self) -> Option<Symbol> {
        LINES.iter().find_map(|&[a, b, c]| match self.board[a] {
            Some(s) if self.board[b] == Some(s) && self.board[c] == Some(s) => Some(s),
            _ => None,
        })
    }

    fn check_outcome(&mut self) -> Result<(), MoveError> {
        if let Some(symbol) = self.winning_symbol() {
            let seat = self
                .symbols
                .iter()
                .position(|&s| s == symbol)
                .ok_or_else(|| MoveError::Corrupted(format!("no seat holds {symbol:?}")))?;
            self.outcome = Some((BoardOutcome::Win, Some(self.seats[seat])));
        } else if self.board.iter().all(Option::is_some) {
            self.outcome = Some((BoardOutcome::Draw, None));
        }
        Ok(())
    }
}

impl GameRules for TicTacToe {
    type Move = TicTacToeMove;

    fn process_move(
        &mut self,
        player: PlayerId,
        mv: TicTacToeMove,
        _scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::MatchOver);
        }
        let seat = seat_of(&self.seats, player)?;
        if seat != self.to_move {
            return Err(MoveError::NotYourTurn);
        }
        let cell = usize::try_from(mv.position)
            .ok()
            .filter(|&c| c < self.board.len())
            .ok_or(MoveError::InvalidPosition)?;
        if self.board[cell].is_some() {
            return Err(MoveError::PositionTaken);
        }

        self.board[cell] = Some(self.symbols[seat]);
        self.move_count += 1;
        self.to_move = 1 - seat;
        self.check_outcome()?;
        Ok(MoveAccepted::new("Move accepted"))
    }

    fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    fn results(&self) -> Option<MatchResult> {
        let (result, winner) = self.outcome?;
        Some(MatchResult::TicTacToe {
            winner,
            result,
            board: self.board,
        })
    }

    fn view(&self) -> GameView {
        GameView::TicTacToe {
            board: self.board,
            player_to_symbol: self
                .seats
                .iter()
                .copied()
                .zip(self.symbols)
                .collect::<BTreeMap<_, _>>(),
            current_player: self.seats[self.to_move],
            move_count: self.move_count,
        }
    }
}
