//! Quick-math duel: first correct answer to an addition problem wins.

use std::collections::BTreeMap;

use playsync_protocol::{AnswerOutcome, GameView, MatchResult, MoveData, PlayerId};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::rules::seat_of;
use crate::{GameRules, MoveAccepted, MoveError, Scoreboard};

/// `{"answer": 42}` or `{"answer": "42"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickMathMove {
    #[serde(default)]
    pub answer: Value,
}

impl QuickMathMove {
    fn parse(&self) -> Option<i64> {
        match &self.answer {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuickMath {
    seats: [PlayerId; 2],
    operands: (u32, u32),
    answer: u32,
    /// Every answer in arrival order.
    answers: Vec<(PlayerId, i64)>,
    first_correct: Option<PlayerId>,
}

impl QuickMath {
    /// Draws both operands from `1..=operand_max`.
    pub fn start(seats: [PlayerId; 2], operand_max: u32, rng: &mut impl Rng) -> Self {
        let max = operand_max.max(1);
        let a = rng.random_range(1..=max);
        let b = rng.random_range(1..=max);
        Self::with_operands(seats, a, b)
    }

    pub fn with_operands(seats: [PlayerId; 2], a: u32, b: u32) -> Self {
        Self {
            seats,
            operands: (a, b),
            answer: a + b,
            answers: Vec::with_capacity(2),
            first_correct: None,
        }
    }

    pub fn question(&self) -> String {
        format!("{} + {}", self.operands.0, self.operands.1)
    }

    pub fn answer_key(&self) -> u32 {
        self.answer
    }
}

impl GameRules for QuickMath {
    type Move = QuickMathMove;

    fn process_move(
        &mut self,
        player: PlayerId,
        mv: QuickMathMove,
        _scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        if self.is_complete() {
            return Err(MoveError::MatchOver);
        }
        seat_of(&self.seats, player)?;
        if self.answers.iter().any(|(p, _)| *p == player) {
            return Err(MoveError::AlreadyAnswered);
        }
        let answer = mv.parse().ok_or(MoveError::InvalidAnswer)?;

        self.answers.push((player, answer));
        let correct = answer == i64::from(self.answer);
        if correct && self.first_correct.is_none() {
            self.first_correct = Some(player);
        }
        Ok(MoveAccepted::new("Answer recorded").with_data(MoveData {
            correct: Some(correct),
            ..MoveData::default()
        }))
    }

    fn is_complete(&self) -> bool {
        self.first_correct.is_some() || self.answers.len() >= self.seats.len()
    }

    fn results(&self) -> Option<MatchResult> {
        if !self.is_complete() {
            return None;
        }
        let result_type = match self.first_correct {
            Some(_) => AnswerOutcome::FirstCorrect,
            None => AnswerOutcome::NoWinner,
        };
        Some(MatchResult::QuickMath {
            winner: self.first_correct,
            question: self.question(),
            correct_answer: self.answer,
            result_type,
            answers: self.answers.iter().copied().collect::<BTreeMap<_, _>>(),
        })
    }

    fn view(&self) -> GameView {
        GameView::QuickMath {
            question: self.question(),
            answered_count: self.answers.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    fn answer(
        game: &mut QuickMath,
        player: PlayerId,
        value: Value,
    ) -> Result<MoveAccepted, MoveError> {
        let mut scores = Scoreboard::zeroed(&[P1, P2]);
        game.process_move(player, QuickMathMove { answer: value }, &mut scores)
    }

    #[test]
    fn test_process_move_first_correct_wins() {
        let mut game = QuickMath::with_operands([P1, P2], 12, 30);
        let reply = answer(&mut game, P2, json!(42)).unwrap();
        assert_eq!(reply.data.correct, Some(true));
        assert!(game.is_complete());

        let Some(MatchResult::QuickMath {
            winner,
            result_type,
            correct_answer,
            ..
        }) = game.results()
        else {
            panic!("expected result");
        };
        assert_eq!(winner, Some(P2));
        assert_eq!(result_type, AnswerOutcome::FirstCorrect);
        assert_eq!(correct_answer, 42);
    }

    #[test]
    fn test_process_move_later_correct_answer_is_rejected() {
        let mut game = QuickMath::with_operands([P1, P2], 1, 1);
        answer(&mut game, P1, json!("2")).unwrap();
        assert_eq!(answer(&mut game, P2, json!(2)), Err(MoveError::MatchOver));
        let Some(MatchResult::QuickMath { winner, .. }) = game.results() else {
            panic!("expected result");
        };
        assert_eq!(winner, Some(P1));
    }

    #[test]
    fn test_process_move_wrong_then_right() {
        let mut game = QuickMath::with_operands([P1, P2], 5, 5);
        let wrong = answer(&mut game, P1, json!(11)).unwrap();
        assert_eq!(wrong.data.correct, Some(false));
        assert!(!game.is_complete());
        assert_eq!(answer(&mut game, P1, json!(10)), Err(MoveError::AlreadyAnswered));

        answer(&mut game, P2, json!(" 10 ")).unwrap();
        let Some(MatchResult::QuickMath { winner, answers, .. }) = game.results() else {
            panic!("expected result");
        };
        assert_eq!(winner, Some(P2));
        assert_eq!(answers[&P1], 11);
    }

    #[test]
    fn test_results_nobody_correct() {
        let mut game = QuickMath::with_operands([P1, P2], 5, 5);
        answer(&mut game, P1, json!(1)).unwrap();
        answer(&mut game, P2, json!(2)).unwrap();
        let Some(MatchResult::QuickMath { winner, result_type, .. }) = game.results() else {
            panic!("expected result");
        };
        assert_eq!(winner, None);
        assert_eq!(result_type, AnswerOutcome::NoWinner);
    }

    #[test]
    fn test_process_move_non_numeric_answer() {
        let mut game = QuickMath::with_operands([P1, P2], 5, 5);
        assert_eq!(answer(&mut game, P1, json!("ten")), Err(MoveError::InvalidAnswer));
        assert_eq!(answer(&mut game, P1, Value::Null), Err(MoveError::InvalidAnswer));
        let GameView::QuickMath { answered_count, question } = game.view() else {
            panic!("wrong view");
        };
        assert_eq!(answered_count, 0);
        assert_eq!(question, "5 + 5");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        proptest! {
            #[test]
            fn test_answer_key_is_sum_of_operands(seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let game = QuickMath::start([P1, P2], 99, &mut rng);
                let (a, b) = game.operands;
                prop_assert!((1..=99).contains(&a));
                prop_assert!((1..=99).contains(&b));
                prop_assert_eq!(game.answer_key(), a + b);
                prop_assert_eq!(game.question(), format!("{a} + {b}"));
            }
        }
    }
}
