//! Per-connection handler.
//!
//! Each accepted connection gets its own task running
//! [`handle_connection`]:
//!   1. Start the writer task and register the connection's outbox
//!   2. Send `connected`
//!   3. Loop: receive a frame, let the gateway handle it, deliver the
//!      results
//!
//! Frames from one connection are handled strictly one at a time.

use std::sync::Arc;

use playsync_protocol::{Codec, ErrorKind, ServerEvent};
use playsync_transport::{Connection, ConnectionId, Frame, spawn_writer};

use crate::gateway::{Gateway, Outbound};
use crate::identity::IdentitySource;

/// Runs the gateway's disconnect cleanup when the handler exits.
///
/// `Drop` is synchronous, so the cleanup runs in a spawned task.
struct DisconnectGuard<I: IdentitySource, K: Codec> {
    conn_id: ConnectionId,
    gateway: Arc<Gateway<I, K>>,
}

impl<I: IdentitySource, K: Codec> Drop for DisconnectGuard<I, K> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            let out = gateway.disconnect(conn_id).await;
            gateway.deliver(conn_id, out).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<T, I, K>(
    conn: T,
    gateway: Arc<Gateway<I, K>>,
    outbound_buffer: usize,
) where
    T: Connection,
    I: IdentitySource,
    K: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, "connection opened");

    let (outbox, _writer) = spawn_writer(Arc::clone(&conn), outbound_buffer);
    gateway.connections().register(outbox).await;
    let _guard = DisconnectGuard {
        conn_id,
        gateway: Arc::clone(&gateway),
    };

    let hello = ServerEvent::Connected {
        connection_id: conn_id.into_inner(),
    };
    gateway.deliver(conn_id, vec![Outbound::Reply(hello)]).await;

    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let out = match frame {
            Frame::Text(text) => gateway.handle_text(conn_id, &text).await,
            Frame::Binary(_) => {
                tracing::debug!(%conn_id, "binary frame ignored");
                vec![Outbound::Reply(ServerEvent::rejected(
                    "unknown",
                    ErrorKind::InvalidInput,
                    "binary frames are not supported",
                ))]
            }
        };
        gateway.deliver(conn_id, out).await;
    }

    // _guard drops here: the player is marked inactive and the room told.
}
