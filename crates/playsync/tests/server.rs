//! End-to-end tests: a real server on a free port, driven by WebSocket
//! clients.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use playsync::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a free port and returns its address.
async fn start_server() -> String {
    let server = PlaySyncServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("bound address").to_string();
    tokio::spawn(server.run());
    addr
}

/// Connects and consumes the `connected` greeting.
async fn connect(addr: &str) -> (Client, u64) {
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client should connect");
    let hello = recv(&mut ws).await;
    assert_eq!(hello["event"], "connected");
    let id = hello["data"]["connection_id"].as_u64().expect("connection id");
    (ws, id)
}

async fn send(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame.into())).await.expect("send");
}

async fn recv(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("frame in time")
            .expect("stream open")
            .expect("frame ok");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("valid json");
        }
    }
}

/// Reads frames until one named `event` shows up.
async fn recv_event(ws: &mut Client, event: &str) -> Value {
    for _ in 0..20 {
        let frame = recv(ws).await;
        if frame["event"] == event {
            return frame;
        }
    }
    panic!("never saw {event}");
}

async fn create_room(ws: &mut Client) -> String {
    send(ws, "create_room", json!({})).await;
    let created = recv_event(ws, "room_created").await;
    created["data"]["room_id"].as_str().expect("room id").to_string()
}

async fn join(ws: &mut Client, room: &str, name: &str) -> u64 {
    send(
        ws,
        "join_room_request",
        json!({ "room_id": room, "display_name": name }),
    )
    .await;
    let joined = recv_event(ws, "join_room_response").await;
    joined["data"]["player_id"].as_u64().expect("player id")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_connections_get_distinct_ids() {
    let addr = start_server().await;
    let (_a, first) = connect(&addr).await;
    let (_b, second) = connect(&addr).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_malformed_frame_is_rejected_and_connection_survives() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;

    ws.send(Message::Text("{not json".into())).await.unwrap();
    let rejected = recv(&mut ws).await;
    assert_eq!(rejected["event"], "rejected");
    assert_eq!(rejected["data"]["kind"], "invalid_input");
    assert_eq!(rejected["data"]["code"], 400);

    send(&mut ws, "get_room", json!({ "room_id": "NOSUCHRM" })).await;
    let missing = recv(&mut ws).await;
    assert_eq!(missing["event"], "rejected");
    assert_eq!(missing["data"]["request"], "get_room");
    assert_eq!(missing["data"]["code"], 404);
}

#[tokio::test]
async fn test_two_players_play_rps_round_over_websocket() {
    let addr = start_server().await;
    let (mut ada, _) = connect(&addr).await;
    let (mut grace, _) = connect(&addr).await;

    let room = create_room(&mut ada).await;
    assert_eq!(room.len(), 8);
    let p1 = join(&mut ada, &room.to_lowercase(), "Ada").await;
    let p2 = join(&mut grace, &room, "Grace").await;

    // Ada hears Grace arrive.
    let arrived = recv_event(&mut ada, "player_joined").await;
    let arrived = if arrived["data"]["player_id"] == p1 {
        recv_event(&mut ada, "player_joined").await
    } else {
        arrived
    };
    assert_eq!(arrived["data"]["player_id"], p2);

    send(
        &mut ada,
        "start_game_request",
        json!({ "room_id": room, "game_type": "rps", "reset_scores": true }),
    )
    .await;
    let started = recv_event(&mut grace, "game_started").await;
    assert_eq!(started["data"]["game_type"], "rps");

    send(&mut ada, "game_move", json!({ "room_id": room, "move": { "choice": "rock" } })).await;
    let reply = recv_event(&mut ada, "game_move_response").await;
    assert_eq!(reply["data"]["success"], true);

    send(
        &mut grace,
        "game_move",
        json!({ "room_id": room, "move": { "choice": "scissors" } }),
    )
    .await;
    let reply = recv_event(&mut grace, "game_move_response").await;
    assert_eq!(reply["data"]["success"], true);

    // The second move resolves the round; both players see it.
    for ws in [&mut ada, &mut grace] {
        let made = loop {
            let made = recv_event(ws, "move_made").await;
            if made["data"]["player_id"] == p2 {
                break made;
            }
        };
        let game = &made["data"]["room"]["current_game"];
        assert_eq!(game["state_data"]["game"], "rps");
        assert_eq!(game["state_data"]["current_round"], 2);
        assert_eq!(game["player_scores"][p1.to_string()], 1);
        assert_eq!(game["player_scores"][p2.to_string()], 0);
    }
}

#[tokio::test]
async fn test_disconnect_shows_player_inactive() {
    let addr = start_server().await;
    let (mut ada, _) = connect(&addr).await;
    let (mut grace, _) = connect(&addr).await;

    let room = create_room(&mut ada).await;
    join(&mut ada, &room, "Ada").await;
    let p2 = join(&mut grace, &room, "Grace").await;

    grace.close(None).await.unwrap();

    let updated = recv_event(&mut ada, "room_updated").await;
    let players = updated["data"]["room"]["players"].as_array().unwrap();
    let grace_view = players
        .iter()
        .find(|p| p["player_id"] == p2)
        .expect("grace keeps her seat");
    assert_eq!(grace_view["is_active"], false);
}

#[tokio::test]
async fn test_chat_reaches_both_players() {
    let addr = start_server().await;
    let (mut ada, _) = connect(&addr).await;
    let (mut grace, _) = connect(&addr).await;

    let room = create_room(&mut ada).await;
    join(&mut ada, &room, "Ada").await;
    join(&mut grace, &room, "Grace").await;

    send(&mut grace, "chat_message", json!({ "room_id": room, "message": "gl hf" })).await;
    for ws in [&mut ada, &mut grace] {
        let line = recv_event(ws, "chat_message").await;
        assert_eq!(line["data"]["message"], "gl hf");
        assert_eq!(line["data"]["display_name"], "Grace");
    }
}

#[tokio::test]
async fn test_run_until_stops_on_signal() {
    let server = PlaySyncServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(server.run_until(async {
        let _ = stop_rx.await;
    }));

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server stops")
        .expect("task joined");
    assert!(result.is_ok());
}
