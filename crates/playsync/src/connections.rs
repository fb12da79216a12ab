//! Which connection is which player, in which room, and how to reach it.

use std::collections::HashMap;

use playsync_protocol::{PlayerId, RoomCode};
use playsync_transport::{ConnectionId, Outbox};
use tokio::sync::Mutex;

/// A connection's place in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub player: PlayerId,
    pub room: RoomCode,
}

#[derive(Default)]
struct Tables {
    outboxes: HashMap<ConnectionId, Outbox>,
    seats: HashMap<ConnectionId, Seat>,
}

/// The process-wide connection table.
///
/// A connection is registered with its outbox on accept and gains a
/// [`Seat`] when it joins a room. Room broadcasts go to every connection
/// whose seat is in that room.
#[derive(Default)]
pub struct ConnectionTable {
    inner: Mutex<Tables>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, outbox: Outbox) {
        self.inner.lock().await.outboxes.insert(outbox.id(), outbox);
    }

    /// Forgets a connection entirely, returning the seat it held.
    pub async fn remove(&self, conn: ConnectionId) -> Option<Seat> {
        let mut inner = self.inner.lock().await;
        inner.outboxes.remove(&conn);
        inner.seats.remove(&conn)
    }

    pub async fn bind(&self, conn: ConnectionId, seat: Seat) {
        self.inner.lock().await.seats.insert(conn, seat);
    }

    pub async fn unbind(&self, conn: ConnectionId) -> Option<Seat> {
        self.inner.lock().await.seats.remove(&conn)
    }

    /// Drops every seat in `room`. Used when a room is swept.
    pub async fn unbind_room(&self, room: &RoomCode) -> Vec<ConnectionId> {
        let mut inner = self.inner.lock().await;
        let gone: Vec<ConnectionId> = inner
            .seats
            .iter()
            .filter(|(_, seat)| &seat.room == room)
            .map(|(conn, _)| *conn)
            .collect();
        for conn in &gone {
            inner.seats.remove(conn);
        }
        gone
    }

    pub async fn seat(&self, conn: ConnectionId) -> Option<Seat> {
        self.inner.lock().await.seats.get(&conn).cloned()
    }

    pub async fn outbox(&self, conn: ConnectionId) -> Option<Outbox> {
        self.inner.lock().await.outboxes.get(&conn).cloned()
    }

    /// Outboxes of every connection seated in `room`.
    pub async fn recipients(&self, room: &RoomCode) -> Vec<Outbox> {
        let inner = self.inner.lock().await;
        inner
            .seats
            .iter()
            .filter(|(_, seat)| &seat.room == room)
            .filter_map(|(conn, _)| inner.outboxes.get(conn).cloned())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.outboxes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
