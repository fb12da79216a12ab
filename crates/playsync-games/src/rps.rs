//! Rock-paper-scissors, best of N.

use std::collections::BTreeMap;

use playsync_protocol::{GameView, MatchResult, PlayerId, RoundOutcome, RpsChoice, RpsRound};
use serde::Deserialize;
use tracing::debug;

use crate::rules::seat_of;
use crate::{GameRules, MoveAccepted, MoveError, Scoreboard};

/// `{"choice": "rock", "round": 2}`. `round` is optional; when present it
/// must match the round being played.
#[derive(Debug, Clone, Deserialize)]
pub struct RpsMove {
    pub choice: String,
    #[serde(default)]
    pub round: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Rps {
    seats: [PlayerId; 2],
    best_of: u32,
    current_round: u32,
    /// This round's picks, by seat.
    choices: [Option<RpsChoice>; 2],
    /// Session scores as of the last resolved round.
    standing: BTreeMap<PlayerId, u32>,
    rounds: Vec<RpsRound>,
    complete: bool,
}

impl Rps {
    pub fn new(seats: [PlayerId; 2], best_of: u32) -> Self {
        Self {
            seats,
            best_of: best_of.max(1),
            current_round: 1,
            choices: [None; 2],
            standing: BTreeMap::new(),
            rounds: Vec::new(),
            complete: false,
        }
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Settles the current round. Only called once both seats have picked.
    /// The match ends once a seat's session score, carried-over points
    /// included, passes half of `best_of`.
    fn resolve_round(&mut self, scores: &mut Scoreboard) -> Result<(), MoveError> {
        let [Some(c1), Some(c2)] = self.choices else {
            return Err(MoveError::Corrupted(format!(
                "round {} resolved without both choices",
                self.current_round
            )));
        };

        let result = RoundOutcome::between(c1, c2);
        let winner = match result {
            RoundOutcome::Tie => {
                scores.award(self.seats[0], 1);
                scores.award(self.seats[1], 1);
                None
            }
            RoundOutcome::P1Win => {
                scores.award(self.seats[0], 1);
                Some(self.seats[0])
            }
            RoundOutcome::P2Win => {
                scores.award(self.seats[1], 1);
                Some(self.seats[1])
            }
        };

        self.rounds.push(RpsRound {
            round: self.current_round,
            p1_choice: c1,
            p2_choice: c2,
            winner,
            result,
        });
        self.standing = scores.as_map().clone();
        debug!(round = self.current_round, ?result, scores = ?self.standing, "rps round resolved");

        if self.seats.iter().any(|&p| scores.get(p) > self.best_of / 2) {
            self.complete = true;
        } else {
            self.current_round += 1;
            self.choices = [None; 2];
        }
        Ok(())
    }
}

impl GameRules for Rps {
    type Move = RpsMove;

    fn process_move(
        &mut self,
        player: PlayerId,
        mv: RpsMove,
        scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        if self.complete {
            return Err(MoveError::MatchOver);
        }
        let seat = seat_of(&self.seats, player)?;

        if let Some(requested) = mv.round.filter(|&r| r != self.current_round) {
            return Err(MoveError::StaleRound {
                current: self.current_round,
                requested,
            });
        }
        let choice = RpsChoice::parse(&mv.choice).ok_or(MoveError::InvalidChoice)?;
        if self.choices[seat].is_some() {
            return Err(MoveError::AlreadySubmitted);
        }

        self.choices[seat] = Some(choice);
        if self.choices.iter().all(Option::is_some) {
            self.resolve_round(scores)?;
        }
        Ok(MoveAccepted::new("Choice recorded"))
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn results(&self) -> Option<MatchResult> {
        if !self.complete {
            return None;
        }
        let score = |p: PlayerId| self.standing.get(&p).copied().unwrap_or(0);
        // Level scores go to seat 1.
        let [p1, p2] = self.seats;
        let winner = if score(p2) > score(p1) { p2 } else { p1 };
        Some(MatchResult::Rps {
            winner,
            scores: self.standing.clone(),
            rounds: self.rounds.clone(),
            best_of: self.best_of,
        })
    }

    fn view(&self) -> GameView {
        GameView::Rps {
            current_round: self.current_round,
            best_of: self.best_of,
            rounds: self.rounds.clone(),
            submitted: self
                .seats
                .iter()
                .zip(self.choices)
                .filter(|(_, c)| c.is_some())
                .map(|(p, _)| *p)
                .collect(),
        }
    }
}
