//! Would-you-rather: a few questions, no right answers. Clients compare
//! the choice log afterwards.

use std::collections::BTreeMap;

use playsync_protocol::{GameView, MatchResult, PlayerId, WyrChoice, WyrQuestion, WyrRound};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;

use crate::rules::seat_of;
use crate::{GameRules, MoveAccepted, MoveError, Scoreboard};

pub const QUESTIONS: [(&str, &str); 19] = [
    ("Have the ability to fly", "Have the ability to be invisible"),
    ("Live on the beach", "Live in the mountains"),
    ("Have the power to read minds", "Have the power to see the future"),
    ("Be able to talk to animals", "Be able to speak all languages"),
    ("Have a rewind button in life", "Have a pause button in life"),
    ("Always know what others think of you", "Be able to teleport anywhere"),
    ("Win the lottery", "Find your soulmate"),
    ("Never have to sleep", "Never have to eat"),
    ("Be a famous actor", "Be a famous musician"),
    ("Live without internet", "Live without air conditioning/heating"),
    ("Always use cash", "Always use cards"),
    ("Always be slightly late", "Always be slightly early"),
    ("Travel to the past", "Travel to the future"),
    ("Have unlimited free time", "Have unlimited money"),
    ("Never have to work again", "Have your dream job and be busy"),
    (
        "Be able to eat anything without gaining weight",
        "Be able to sleep anywhere instantly",
    ),
    ("Give up your smartphone", "Give up social media forever"),
    ("Only be able to whisper", "Only be able to shout"),
    ("See the world but be poor", "Live comfortably but never travel"),
];

const COMPLETE_MESSAGE: &str = "Game complete - compare your preferences!";

/// `{"choice": "a"}` or `{"choice": "b"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WyrMove {
    pub choice: String,
}

#[derive(Debug, Clone)]
pub struct WouldYouRather {
    seats: [PlayerId; 2],
    /// One question per round, drawn up front.
    questions: Vec<WyrQuestion>,
    /// 1-based; goes one past the last round when the match ends.
    round: u32,
    choices: [Option<WyrChoice>; 2],
    rounds: Vec<WyrRound>,
}

/// Draws `count` questions, distinct while the pool lasts. Longer matches
/// start another distinct pass over the pool.
fn draw_questions(count: usize, rng: &mut impl Rng) -> Vec<WyrQuestion> {
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        let batch = (count - drawn.len()).min(QUESTIONS.len());
        drawn.extend(QUESTIONS.choose_multiple(rng, batch).map(|(a, b)| WyrQuestion {
            a: (*a).to_string(),
            b: (*b).to_string(),
        }));
    }
    drawn
}

impl WouldYouRather {
    pub fn start(seats: [PlayerId; 2], max_rounds: u32, rng: &mut impl Rng) -> Self {
        let questions = draw_questions(max_rounds.max(1) as usize, rng);
        Self::with_questions(seats, questions)
    }

    /// Plays exactly these questions, one per round.
    pub fn with_questions(seats: [PlayerId; 2], questions: Vec<WyrQuestion>) -> Self {
        Self {
            seats,
            questions,
            round: 1,
            choices: [None; 2],
            rounds: Vec::new(),
        }
    }

    fn max_rounds(&self) -> u32 {
        self.questions.len() as u32
    }

    fn current_question(&self) -> Result<&WyrQuestion, MoveError> {
        let index = self.round.min(self.max_rounds()).saturating_sub(1) as usize;
        self.questions
            .get(index)
            .ok_or_else(|| MoveError::Corrupted(format!("no question for round {}", self.round)))
    }

    fn resolve_round(&mut self) -> Result<(), MoveError> {
        let question = self.current_question()?.clone();
        let choices: BTreeMap<_, _> = self
            .seats
            .iter()
            .zip(self.choices)
            .filter_map(|(p, c)| c.map(|c| (*p, c)))
            .collect();
        self.rounds.push(WyrRound {
            round: self.round,
            question,
            choices,
        });
        self.round += 1;
        self.choices = [None; 2];
        Ok(())
    }
}

impl GameRules for WouldYouRather {
    type Move = WyrMove;

    fn process_move(
        &mut self,
        player: PlayerId,
        mv: WyrMove,
        _scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        if self.is_complete() {
            return Err(MoveError::MatchOver);
        }
        let seat = seat_of(&self.seats, player)?;
        let choice = match mv.choice.trim().to_ascii_lowercase().as_str() {
            "a" => WyrChoice::A,
            "b" => WyrChoice::B,
            _ => return Err(MoveError::InvalidOption),
        };
        if self.choices[seat].is_some() {
            return Err(MoveError::AlreadyAnswered);
        }

        self.choices[seat] = Some(choice);
        if self.choices.iter().all(Option::is_some) {
            self.resolve_round()?;
        }
        Ok(MoveAccepted::new("Choice recorded"))
    }

    fn is_complete(&self) -> bool {
        self.round > self.max_rounds()
    }

    fn results(&self) -> Option<MatchResult> {
        self.is_complete().then(|| MatchResult::WouldYouRather {
            max_rounds: self.max_rounds(),
            rounds: self.rounds.clone(),
            message: COMPLETE_MESSAGE.to_string(),
        })
    }

    fn view(&self) -> GameView {
        let question = self.current_question().cloned().unwrap_or(WyrQuestion {
            a: String::new(),
            b: String::new(),
        });
        GameView::WouldYouRather {
            question,
            round: self.round.min(self.max_rounds()),
            max_rounds: self.max_rounds(),
            submitted: self
                .seats
                .iter()
                .zip(self.choices)
                .filter(|(_, c)| c.is_some())
                .map(|(p, _)| *p)
                .collect(),
            rounds: self.rounds.clone(),
        }
    }
}
