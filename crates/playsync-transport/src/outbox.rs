//! Per-connection outbound queue.
//!
//! Room broadcasts are produced by whichever task handled the triggering
//! event, not by the recipient's own handler. Each connection gets a
//! writer task that drains a bounded queue into the socket; everyone else
//! just pushes onto the queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{Connection, ConnectionId, TransportError};

/// Sending side of a connection's outbound queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl Outbox {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame without waiting.
    ///
    /// A slow client whose queue is full loses the frame rather than
    /// stalling the sender.
    pub fn push(&self, text: String) -> Result<(), TransportError> {
        self.tx.try_send(text).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Backpressure(self.id),
            mpsc::error::TrySendError::Closed(_) => {
                TransportError::ConnectionClosed(self.id.to_string())
            }
        })
    }
}

/// Spawns the writer task for `conn` and returns its outbox.
///
/// The task ends when every [`Outbox`] clone is dropped or the socket
/// refuses a frame.
pub fn spawn_writer<C: Connection>(conn: Arc<C>, buffer: usize) -> (Outbox, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<String>(buffer.max(1));
    let id = conn.id();
    let task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = conn.send(&text).await {
                debug!(%id, error = %e, "writer stopped");
                break;
            }
        }
    });
    (Outbox { id, tx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;
    use tokio::sync::Mutex;

    /// Records every frame it is asked to send.
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    impl Connection for Recorder {
        type Error = TransportError;

        async fn send(&self, text: &str) -> Result<(), Self::Error> {
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }

        async fn recv(&self) -> Result<Option<Frame>, Self::Error> {
            Ok(None)
        }

        async fn close(&self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            ConnectionId::new(5)
        }
    }

    #[tokio::test]
    async fn test_spawn_writer_delivers_in_order() {
        let conn = Arc::new(Recorder {
            sent: Mutex::new(Vec::new()),
        });
        let (outbox, task) = spawn_writer(conn.clone(), 8);
        assert_eq!(outbox.id(), ConnectionId::new(5));
        outbox.push("one".into()).unwrap();
        outbox.push("two".into()).unwrap();
        drop(outbox);
        task.await.unwrap();
        assert_eq!(*conn.sent.lock().await, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_push_after_writer_gone_is_closed() {
        let conn = Arc::new(Recorder {
            sent: Mutex::new(Vec::new()),
        });
        let (outbox, task) = spawn_writer(conn, 1);
        task.abort();
        let _ = task.await;
        assert!(matches!(
            outbox.push("late".into()),
            Err(TransportError::ConnectionClosed(_))
        ));
    }
}
