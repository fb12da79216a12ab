//! Reaction-time duel: wait for the signal, tap first.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use playsync_protocol::{GameView, MatchResult, MoveData, PlayerId, unix_millis};
use rand::Rng;
use serde::de::IgnoredAny;

use crate::rules::seat_of;
use crate::{GameRules, MoveAccepted, MoveError, Scoreboard};

#[derive(Debug, Clone)]
pub struct Reaction {
    seats: [PlayerId; 2],
    delay: Duration,
    started: Instant,
    /// Wall-clock start, for clients.
    start_time: u64,
    ready: bool,
    /// Valid reactions in arrival order, in milliseconds after the signal.
    reactions: Vec<(PlayerId, u64)>,
}

impl Reaction {
    /// Starts the clock with a random delay drawn from `delay_ms`.
    pub fn start(seats: [PlayerId; 2], delay_ms: RangeInclusive<u64>, rng: &mut impl Rng) -> Self {
        let delay = if delay_ms.is_empty() {
            *delay_ms.start()
        } else {
            rng.random_range(delay_ms)
        };
        Self::with_delay(seats, Duration::from_millis(delay))
    }

    pub fn with_delay(seats: [PlayerId; 2], delay: Duration) -> Self {
        Self {
            seats,
            delay,
            started: Instant::now(),
            start_time: unix_millis(),
            ready: false,
            reactions: Vec::with_capacity(2),
        }
    }

    /// The client is showing the countdown.
    pub fn set_ready(&mut self) {
        self.ready = true;
    }

    /// Records a tap that happened `elapsed` after the match started.
    pub fn tap_after(
        &mut self,
        player: PlayerId,
        elapsed: Duration,
    ) -> Result<MoveAccepted, MoveError> {
        if self.is_complete() {
            return Err(MoveError::MatchOver);
        }
        seat_of(&self.seats, player)?;
        if self.reactions.iter().any(|(p, _)| *p == player) {
            return Err(MoveError::AlreadyRecorded);
        }
        let Some(after_signal) = elapsed.checked_sub(self.delay) else {
            return Err(MoveError::EarlyTap);
        };

        let reaction_ms = u64::try_from(after_signal.as_millis()).unwrap_or(u64::MAX);
        self.reactions.push((player, reaction_ms));
        Ok(MoveAccepted::new("Reaction recorded").with_data(MoveData {
            reaction_ms: Some(reaction_ms),
            ..MoveData::default()
        }))
    }

    fn delay_ms(&self) -> u64 {
        u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX)
    }

    fn reaction_map(&self) -> BTreeMap<PlayerId, u64> {
        self.reactions.iter().copied().collect()
    }
}

impl GameRules for Reaction {
    type Move = IgnoredAny;

    fn process_move(
        &mut self,
        player: PlayerId,
        _mv: IgnoredAny,
        _scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        let elapsed = self.started.elapsed();
        self.tap_after(player, elapsed)
    }

    fn is_complete(&self) -> bool {
        self.reactions.len() >= self.seats.len()
    }

    fn results(&self) -> Option<MatchResult> {
        if !self.is_complete() {
            return None;
        }
        // Strict `<` keeps the earlier arrival on equal times.
        let (winner, _) = self
            .reactions
            .iter()
            .copied()
            .reduce(|best, next| if next.1 < best.1 { next } else { best })?;
        Some(MatchResult::Reaction {
            winner,
            reaction_times: self.reaction_map(),
            delay_ms: self.delay_ms(),
        })
    }

    fn view(&self) -> GameView {
        GameView::Reaction {
            delay_ms: self.delay_ms(),
            start_time: self.start_time,
            ready: self.ready,
            reactions: self.reaction_map(),
        }
    }
}
