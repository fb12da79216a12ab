//! Whole matches played through `GameSession`, the way a room drives them.

use std::collections::BTreeMap;

use playsync_games::{GameConfig, GameContext, GameSession, MoveError};
use playsync_protocol::{GameKind, GameView, MatchResult, PlayerId, Symbol};
use serde_json::json;

const P1: PlayerId = PlayerId(10);
const P2: PlayerId = PlayerId(20);

fn ctx(prior_tictactoe: usize) -> GameContext {
    GameContext {
        seats: [P1, P2],
        prior_tictactoe,
        config: GameConfig::default(),
    }
}

fn rps(session: &mut GameSession, c1: &str, c2: &str) {
    session.submit(P1, &json!({ "choice": c1 })).unwrap();
    session.submit(P2, &json!({ "choice": c2 })).unwrap();
}

#[test]
fn test_rps_match_then_rematch_carries_scores() {
    let mut first = GameSession::start(GameKind::RockPaperScissors, &ctx(0), None);
    rps(&mut first, "paper", "rock");
    rps(&mut first, "paper", "rock");
    assert!(first.is_complete());

    let result = first.results().unwrap();
    assert!(matches!(result, MatchResult::Rps { winner: P1, .. }));
    first.finish(result);
    // Two round wins plus the match win.
    assert_eq!(first.scores().get(P1), 3);
    assert_eq!(first.scores().get(P2), 0);

    let cumulative: BTreeMap<_, _> = first.scores().as_map().clone();
    let mut second = GameSession::start(GameKind::RockPaperScissors, &ctx(0), Some(&cumulative));
    assert_eq!(second.scores().as_map(), &cumulative);
    assert!(!second.is_complete());

    // Carried points count toward the threshold, so one round settles it.
    rps(&mut second, "rock", "paper");
    assert!(second.is_complete());
    let result = second.results().unwrap();
    assert!(matches!(result, MatchResult::Rps { winner: P1, .. }));
    second.finish(result);
    assert_eq!(second.scores().get(P1), 4);
    assert_eq!(second.scores().get(P2), 1);
}

#[test]
fn test_rps_round_number_in_payload_is_checked() {
    let mut session = GameSession::start(GameKind::RockPaperScissors, &ctx(0), None);
    rps(&mut session, "rock", "scissors");
    let err = session
        .submit(P2, &json!({ "choice": "rock", "round": 1 }))
        .unwrap_err();
    assert_eq!(err.to_string(), "Move belongs to a different round");
    session
        .submit(P2, &json!({ "choice": "rock", "round": 2 }))
        .unwrap();
}

#[test]
fn test_tictactoe_symbols_swap_between_matches() {
    let symbol_of_seat_one = |prior| {
        let session = GameSession::start(GameKind::TicTacToe, &ctx(prior), None);
        match session.view() {
            GameView::TicTacToe { player_to_symbol, current_player, .. } => {
                assert_eq!(current_player, P1);
                player_to_symbol[&P1]
            }
            other => panic!("unexpected view {other:?}"),
        }
    };
    assert_eq!(symbol_of_seat_one(0), Symbol::X);
    assert_eq!(symbol_of_seat_one(1), Symbol::O);
    assert_eq!(symbol_of_seat_one(2), Symbol::X);
}

#[test]
fn test_would_you_rather_full_match() {
    let mut session = GameSession::start(GameKind::WouldYouRather, &ctx(0), None);
    for round in 1..=3 {
        match session.view() {
            GameView::WouldYouRather { round: shown, max_rounds, .. } => {
                assert_eq!(shown, round);
                assert_eq!(max_rounds, 3);
            }
            other => panic!("unexpected view {other:?}"),
        }
        session.submit(P1, &json!({ "choice": "a" })).unwrap();
        session.submit(P2, &json!({ "choice": "b" })).unwrap();
    }
    assert!(session.is_complete());
    assert_eq!(
        session.submit(P1, &json!({ "choice": "a" })),
        Err(MoveError::MatchOver)
    );

    let result = session.results().unwrap();
    session.finish(result);
    assert_eq!(session.scores().get(P1), 0);
    assert_eq!(session.scores().get(P2), 0);
}

#[test]
fn test_quickmath_string_answer_through_session() {
    let mut session = GameSession::start(GameKind::QuickMath, &ctx(0), None);
    let GameView::QuickMath { question, .. } = session.view() else {
        panic!("unexpected view");
    };
    let sum: u32 = question
        .split(" + ")
        .map(|n| n.parse::<u32>().unwrap())
        .sum();
    let reply = session.submit(P1, &json!({ "answer": sum.to_string() })).unwrap();
    assert_eq!(reply.data.correct, Some(true));
    assert!(session.is_complete());
}
