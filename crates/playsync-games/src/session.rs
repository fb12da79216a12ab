//! A single match: which game, when it started, the score for this
//! match, and the running machine.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use playsync_protocol::{
    ActiveGame, GameKind, GameView, HistoryEntry, MatchResult, PlayerId, Verdict, unix_millis,
};
use serde_json::Value;
use tracing::{debug, error};

use crate::{GameContext, GameMachine, MoveAccepted, MoveError, Scoreboard};

#[derive(Debug, Clone)]
pub struct GameSession {
    kind: GameKind,
    started_at: u64,
    seats: [PlayerId; 2],
    scores: Scoreboard,
    machine: GameMachine,
    result: Option<MatchResult>,
}

impl GameSession {
    /// Starts a match. With `seed` the scores carry over from the room's
    /// cumulative tally; without it everyone starts at zero.
    pub fn start(
        kind: GameKind,
        ctx: &GameContext,
        seed: Option<&BTreeMap<PlayerId, u32>>,
    ) -> Self {
        let machine = GameMachine::new(kind, ctx);
        let scores = match seed {
            Some(seed) => Scoreboard::seeded(&ctx.seats, seed),
            None => Scoreboard::zeroed(&ctx.seats),
        };
        Self::with_machine(machine, ctx.seats, scores)
    }

    /// Wraps an already-built machine.
    pub fn with_machine(machine: GameMachine, seats: [PlayerId; 2], scores: Scoreboard) -> Self {
        Self {
            kind: machine.kind(),
            started_at: unix_millis(),
            seats,
            scores,
            machine,
            result: None,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    /// The machine's outcome, once it has one.
    pub fn results(&self) -> Option<MatchResult> {
        self.machine.results()
    }

    pub fn view(&self) -> GameView {
        self.machine.view()
    }

    pub fn mark_ready(&mut self) {
        self.machine.mark_ready();
    }

    /// Applies one move.
    ///
    /// A panic inside the machine, or a scoreboard that no longer lists
    /// exactly the seated players, comes back as [`MoveError::Corrupted`].
    pub fn submit(&mut self, player: PlayerId, payload: &Value) -> Result<MoveAccepted, MoveError> {
        if self.result.is_some() {
            return Err(MoveError::MatchOver);
        }
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.machine.process_move(player, payload, &mut self.scores)
        }));
        let reply = match outcome {
            Ok(reply) => reply,
            Err(_) => {
                error!(game = %self.kind, %player, "game machine panicked");
                return Err(MoveError::Corrupted("internal game fault".into()));
            }
        };
        if !self.scores.players().eq(sorted(self.seats)) {
            return Err(MoveError::Corrupted("scoreboard lost a seat".into()));
        }
        if let Err(err) = &reply {
            debug!(game = %self.kind, %player, %err, "move rejected");
        }
        reply
    }

    /// Scores the finished match and attaches its result: the winner
    /// gets a point, or on a draw everyone does.
    pub fn finish(&mut self, result: MatchResult) {
        match result.verdict() {
            Verdict::Winner(player) => self.scores.award(player, 1),
            Verdict::Draw => self.scores.award_all(1),
            Verdict::NoContest => {}
        }
        self.result = Some(result);
    }

    /// The block shown in room snapshots while this match is current.
    pub fn active(&self) -> ActiveGame {
        ActiveGame {
            game_type: self.kind,
            started_at: self.started_at,
            player_scores: self.scores.as_map().clone(),
            state_data: self.view(),
        }
    }

    /// The record kept in room history.
    pub fn archive(&self) -> HistoryEntry {
        HistoryEntry {
            game_type: self.kind,
            results: self.result.clone(),
            started_at: self.started_at,
        }
    }
}

fn sorted(mut seats: [PlayerId; 2]) -> impl Iterator<Item = PlayerId> {
    seats.sort();
    seats.into_iter()
}
