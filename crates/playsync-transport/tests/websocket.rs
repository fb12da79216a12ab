//! Real-socket tests for the WebSocket transport.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use playsync_transport::{
        Connection, Frame, Transport, WebSocketConnection, WebSocketTransport, spawn_writer,
    };
    use tokio_tungstenite::tungstenite::Message;

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on a free port and returns one accepted server-side
    /// connection plus the client talking to it.
    async fn pair() -> (WebSocketConnection, Client) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_text_both_directions() {
        let (conn, mut client) = pair().await;
        assert!(conn.id().into_inner() > 0);

        conn.send(r#"{"event":"connected"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"connected"}"#);

        client
            .send(Message::Text("hello from client".into()))
            .await
            .unwrap();
        let frame = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(frame, Frame::Text("hello from client".into()));
    }

    #[tokio::test]
    async fn test_websocket_binary_frame_is_surfaced() {
        let (conn, mut client) = pair().await;
        client
            .send(Message::Binary(vec![1u8, 2, 3].into()))
            .await
            .unwrap();
        let frame = conn.recv().await.unwrap().unwrap();
        assert_eq!(frame, Frame::Binary(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_websocket_client_close_yields_none() {
        let (conn, mut client) = pair().await;
        client.close(None).await.unwrap();
        let frame = conn.recv().await.expect("clean close");
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending() {
        let (conn, mut client) = pair().await;
        let conn = Arc::new(conn);
        let (outbox, _writer) = spawn_writer(Arc::clone(&conn), 16);

        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        // Give the reader time to park inside recv.
        tokio::time::sleep(Duration::from_millis(20)).await;

        outbox.push("broadcast".into()).unwrap();
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("send must not wait on recv")
            .unwrap()
            .unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), "broadcast");

        client.send(Message::Text("reply".into())).await.unwrap();
        let frame = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(frame, Frame::Text("reply".into()));
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (a, _ca) = pair().await;
        let (b, _cb) = pair().await;
        assert_ne!(a.id(), b.id());
    }
}
