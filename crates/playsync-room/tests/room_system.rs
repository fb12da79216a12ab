//! Integration tests for rooms running as actors behind the registry.

use std::sync::Arc;
use std::time::Duration;

use playsync_protocol::{ErrorKind, GameKind, GameView, PlayerId, RoomCode};
use playsync_room::{Player, RoomConfig, RoomError, RoomRegistry};
use serde_json::json;
use tokio::time::Instant;

fn player(registry: &RoomRegistry, name: &str) -> Player {
    Player::new(registry.next_player_id(), name, "#0D9488", None)
}

async fn room_with_two(registry: &RoomRegistry) -> (RoomCode, PlayerId, PlayerId) {
    let code = registry.create_room().await;
    let a = player(registry, "Swift Falcon");
    let b = player(registry, "Keen Raven");
    let (ida, idb) = (a.id, b.id);
    registry.join(&code, a).await.unwrap();
    registry.join(&code, b).await.unwrap();
    (code, ida, idb)
}

#[tokio::test]
async fn test_create_room_code_is_eight_characters() {
    let registry = RoomRegistry::default();
    let code = registry.create_room().await;
    assert_eq!(code.as_str().len(), 8);
    assert!(registry.get_room(&code).await.is_some());
    assert_eq!(registry.room_count().await, 1);
}

#[tokio::test]
async fn test_join_unknown_room_not_found() {
    let registry = RoomRegistry::default();
    let p = player(&registry, "Nobody");
    let err = registry.join(&RoomCode::new("ZZZZZZZZ"), p).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_join_full_room_is_capacity() {
    let registry = RoomRegistry::default();
    let (code, _, _) = room_with_two(&registry).await;
    let third = player(&registry, "Late Lynx");
    let third_id = third.id;
    let err = registry.join(&code, third).await.unwrap_err();
    assert_eq!(err, RoomError::RoomFull(code.clone()));
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert!(registry.player_room(third_id).await.is_none());
}

#[tokio::test]
async fn test_join_twice_is_conflict() {
    let registry = RoomRegistry::default();
    let code = registry.create_room().await;
    let p = player(&registry, "Bold Wolf");
    registry.join(&code, p.clone()).await.unwrap();
    let err = registry.join(&code, p).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_join_lowercase_code_finds_room() {
    let registry = RoomRegistry::default();
    let code = registry.create_room().await;
    let lower = RoomCode::new(&code.as_str().to_lowercase());
    let p = player(&registry, "Quick Fox");
    registry.join(&lower, p).await.unwrap();
}

#[tokio::test]
async fn test_leave_last_player_destroys_room() {
    let registry = RoomRegistry::default();
    let (code, a, b) = room_with_two(&registry).await;

    let first = registry.leave(&code, a).await.unwrap();
    let remaining = first.remaining.unwrap();
    assert_eq!(remaining.player_count, 1);
    assert_eq!(remaining.players[0].player_id, b);

    let second = registry.leave(&code, b).await.unwrap();
    assert!(second.remaining.is_none());
    assert!(registry.get_room(&code).await.is_none());
    assert!(registry.player_room(b).await.is_none());
    assert_eq!(registry.room_count().await, 0);
}

#[tokio::test]
async fn test_leave_by_non_member_is_not_found() {
    let registry = RoomRegistry::default();
    let (code, _, _) = room_with_two(&registry).await;
    let err = registry.leave(&code, PlayerId(999)).await.unwrap_err();
    assert!(matches!(err, RoomError::NotMember(PlayerId(999), _)));
}

#[tokio::test(start_paused = true)]
async fn test_maybe_sweep_removes_idle_rooms_once_interval_passed() {
    let registry = RoomRegistry::default();
    let (code, a, _) = room_with_two(&registry).await;
    let fresh = registry.create_room().await;

    // Nothing is due yet.
    assert!(registry.maybe_sweep(Instant::now()).await.is_empty());

    tokio::time::advance(Duration::from_secs(1100)).await;
    // A join counts as activity and keeps `fresh` alive.
    let visitor = player(&registry, "Nimble Hawk");
    registry.join(&fresh, visitor).await.unwrap();

    tokio::time::advance(Duration::from_secs(101)).await;
    let swept = registry.maybe_sweep(Instant::now()).await;
    assert_eq!(swept.len(), 1);
    assert_eq!(swept[0].code, code);
    assert_eq!(swept[0].players.len(), 2);
    assert!(registry.get_room(&code).await.is_none());
    assert!(registry.player_room(a).await.is_none());
    assert!(registry.get_room(&fresh).await.is_some());

    // Rate-limited: an immediate second call does nothing.
    assert!(registry.maybe_sweep(Instant::now()).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_join_expired_room_is_rejected() {
    let registry = RoomRegistry::new(RoomConfig {
        idle_timeout: Duration::from_secs(10),
        ..RoomConfig::default()
    });
    let code = registry.create_room().await;
    tokio::time::advance(Duration::from_secs(11)).await;

    let p = player(&registry, "Sharp Tiger");
    let err = registry.join(&code, p).await.unwrap_err();
    assert_eq!(err, RoomError::Expired(code.clone()));
    assert!(registry.get_room(&code).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_rps_moves_resolve_round_exactly_once() {
    let registry = Arc::new(RoomRegistry::default());
    for _ in 0..50 {
        let (code, a, b) = room_with_two(&registry).await;
        let handle = registry.get_room(&code).await.unwrap();
        handle
            .start_game(a, GameKind::RockPaperScissors, true)
            .await
            .unwrap();

        let (h1, h2) = (handle.clone(), handle.clone());
        let t1 = tokio::spawn(async move { h1.submit_move(a, json!({ "choice": "rock" })).await });
        let t2 = tokio::spawn(async move { h2.submit_move(b, json!({ "choice": "paper" })).await });
        let r1 = t1.await.unwrap().unwrap();
        let r2 = t2.await.unwrap().unwrap();
        assert!(r1.reply.is_ok());
        assert!(r2.reply.is_ok());

        let snap = handle.snapshot().await.unwrap();
        let Some(GameView::Rps { current_round, rounds, submitted, .. }) =
            snap.current_game.map(|g| g.state_data)
        else {
            panic!("expected rps view");
        };
        assert_eq!(current_round, 2);
        assert_eq!(rounds.len(), 1);
        assert!(submitted.is_empty());
        assert_eq!(snap.players[1].score, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_racing_moves_from_one_player_accept_one() {
    let registry = RoomRegistry::default();
    let (code, a, _) = room_with_two(&registry).await;
    let handle = registry.get_room(&code).await.unwrap();
    handle.start_game(a, GameKind::RockPaperScissors, true).await.unwrap();

    let (h1, h2) = (handle.clone(), handle.clone());
    let t1 = tokio::spawn(async move { h1.submit_move(a, json!({ "choice": "rock" })).await });
    let t2 = tokio::spawn(async move { h2.submit_move(a, json!({ "choice": "paper" })).await });
    let replies = [t1.await.unwrap().unwrap(), t2.await.unwrap().unwrap()];
    let accepted = replies.iter().filter(|o| o.reply.is_ok()).count();
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn test_disconnect_marks_player_inactive() {
    let registry = RoomRegistry::default();
    let (code, _, b) = room_with_two(&registry).await;
    let handle = registry.get_room(&code).await.unwrap();
    let snap = handle.disconnect(b).await.unwrap();
    assert!(!snap.player(b).unwrap().is_active);
    assert_eq!(registry.player_room(b).await, Some(code));
}

#[tokio::test]
async fn test_shutdown_makes_handles_unavailable() {
    let registry = RoomRegistry::default();
    let code = registry.create_room().await;
    let handle = registry.get_room(&code).await.unwrap();
    registry.shutdown().await;
    // Commands queued behind the shutdown are dropped with the actor.
    let err = handle.snapshot().await.unwrap_err();
    assert_eq!(err, RoomError::Unavailable(code));
}
