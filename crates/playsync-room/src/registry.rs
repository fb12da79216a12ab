//! Room registry: creates, finds and destroys rooms, and remembers which
//! room each player sits in.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use playsync_protocol::{PlayerId, RoomCode, RoomSnapshot};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::code::generate_unique_code;
use crate::{Player, Room, RoomConfig, RoomError, RoomHandle, spawn_room};

/// A room removed by a sweep, with the players who were still in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweptRoom {
    pub code: RoomCode,
    pub players: Vec<PlayerId>,
}

/// What a leave produced.
#[derive(Debug, Clone)]
pub struct Departure {
    pub player: Player,
    /// The room after the leave, or `None` if it was destroyed.
    pub remaining: Option<RoomSnapshot>,
}

struct Inner {
    rooms: HashMap<RoomCode, RoomHandle>,
    /// Reverse index: the room each player is in. A player is in at most
    /// one room.
    player_rooms: HashMap<PlayerId, RoomCode>,
    last_sweep: Instant,
}

impl Inner {
    /// Forgets a room and everyone in it, and stops its actor.
    async fn destroy(&mut self, code: &RoomCode) -> Vec<PlayerId> {
        let players: Vec<PlayerId> = self
            .player_rooms
            .iter()
            .filter(|(_, c)| *c == code)
            .map(|(p, _)| *p)
            .collect();
        for player in &players {
            self.player_rooms.remove(player);
        }
        if let Some(handle) = self.rooms.remove(code) {
            let _ = handle.shutdown().await;
        }
        players
    }

    async fn sweep(&mut self, now: Instant) -> Vec<SweptRoom> {
        self.last_sweep = now;
        let mut expired = Vec::new();
        for (code, handle) in &self.rooms {
            // An actor that no longer answers is as good as gone.
            if handle.is_expired(now).await.unwrap_or(true) {
                expired.push(code.clone());
            }
        }

        let mut swept = Vec::with_capacity(expired.len());
        for code in expired {
            let players = self.destroy(&code).await;
            info!(room = %code, players = players.len(), "idle room swept");
            swept.push(SweptRoom { code, players });
        }
        swept
    }
}

/// The process-wide table of rooms.
///
/// Registry membership (create, join, leave, sweep) goes through one
/// internal lock. Game traffic doesn't: callers clone a [`RoomHandle`]
/// out with [`get_room`](Self::get_room) and talk to the room's actor
/// directly, so busy rooms never contend with each other.
pub struct RoomRegistry {
    config: RoomConfig,
    inner: Mutex<Inner>,
    next_player_id: AtomicU64,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                rooms: HashMap::new(),
                player_rooms: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            next_player_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// A fresh player id, never handed out before by this registry.
    pub fn next_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Opens an empty room under a new, unused code.
    pub async fn create_room(&self) -> RoomCode {
        let mut inner = self.inner.lock().await;
        let code = generate_unique_code(self.config.code_length, &mut rand::rng(), |c| {
            inner.rooms.contains_key(c)
        });
        let room = Room::new(code.clone(), self.config.clone());
        let handle = spawn_room(room, self.config.command_buffer);
        inner.rooms.insert(code.clone(), handle);
        info!(room = %code, "room created");
        code
    }

    /// Looks a room up. No side effects.
    pub async fn get_room(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.inner.lock().await.rooms.get(code).cloned()
    }

    /// Seats `player` in room `code`.
    ///
    /// A room found idle past its timeout is destroyed on the spot and
    /// reported as [`RoomError::Expired`].
    pub async fn join(&self, code: &RoomCode, player: Player) -> Result<RoomSnapshot, RoomError> {
        let mut inner = self.inner.lock().await;
        if let Some(current) = inner.player_rooms.get(&player.id) {
            return Err(if current == code {
                RoomError::AlreadyMember(player.id, code.clone())
            } else {
                RoomError::InAnotherRoom(player.id, current.clone())
            });
        }
        let handle = inner
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if handle.is_expired(Instant::now()).await? {
            inner.destroy(code).await;
            info!(room = %code, "expired room destroyed on join");
            return Err(RoomError::Expired(code.clone()));
        }

        let player_id = player.id;
        let snapshot = handle.join(player).await?;
        inner.player_rooms.insert(player_id, code.clone());
        Ok(snapshot)
    }

    /// Removes a player. The room is destroyed as soon as it's empty.
    pub async fn leave(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<Departure, RoomError> {
        let mut inner = self.inner.lock().await;
        let handle = inner
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let outcome = handle.leave(player_id).await?;
        inner.player_rooms.remove(&player_id);

        let remaining = if outcome.now_empty {
            inner.destroy(code).await;
            info!(room = %code, "empty room destroyed");
            None
        } else {
            Some(outcome.snapshot)
        };
        Ok(Departure {
            player: outcome.player,
            remaining,
        })
    }

    /// Removes every room idle past its timeout.
    pub async fn sweep(&self, now: Instant) -> Vec<SweptRoom> {
        self.inner.lock().await.sweep(now).await
    }

    /// Sweeps, unless the last sweep was less than `sweep_interval` ago.
    pub async fn maybe_sweep(&self, now: Instant) -> Vec<SweptRoom> {
        let mut inner = self.inner.lock().await;
        if now.saturating_duration_since(inner.last_sweep) < self.config.sweep_interval {
            return Vec::new();
        }
        inner.sweep(now).await
    }

    pub async fn player_room(&self, player_id: PlayerId) -> Option<RoomCode> {
        self.inner.lock().await.player_rooms.get(&player_id).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    /// Stops every room actor.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        for (code, handle) in inner.rooms.drain() {
            if handle.shutdown().await.is_err() {
                warn!(room = %code, "room actor already gone");
            }
        }
        inner.player_rooms.clear();
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
