//! Room actor: one Tokio task per room, owning the [`Room`].
//!
//! Every operation on a room is a command sent down its channel and
//! answered on a oneshot. The actor handles commands one at a time, so a
//! move, the round resolution it may trigger, and the snapshot that
//! follows all happen without any other command in between. Two players
//! submitting at the same instant are simply queued.

use playsync_protocol::{ChatEntry, GameKind, PlayerId, RoomCode, RoomSnapshot};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{MoveOutcome, Player, Room, RoomError};

/// What a successful leave produced.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub player: Player,
    pub snapshot: RoomSnapshot,
    /// The room has nobody left and should be destroyed.
    pub now_empty: bool,
}

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor.
pub(crate) enum RoomCommand {
    Join {
        player: Player,
        reply: Reply<RoomSnapshot>,
    },
    Leave {
        player_id: PlayerId,
        reply: Reply<LeaveOutcome>,
    },
    StartGame {
        player_id: PlayerId,
        kind: GameKind,
        reset_scores: bool,
        reply: Reply<RoomSnapshot>,
    },
    SubmitMove {
        player_id: PlayerId,
        payload: Value,
        reply: Reply<MoveOutcome>,
    },
    MarkReady {
        player_id: PlayerId,
        reply: Reply<RoomSnapshot>,
    },
    Disconnect {
        player_id: PlayerId,
        reply: Reply<RoomSnapshot>,
    },
    Chat {
        player_id: PlayerId,
        text: String,
        reply: Reply<ChatEntry>,
    },
    ChatHistory {
        reply: Reply<Vec<ChatEntry>>,
    },
    Rematch {
        player_id: PlayerId,
        reply: Reply<String>,
    },
    SwitchGame {
        player_id: PlayerId,
        reply: Reply<RoomSnapshot>,
    },
    Snapshot {
        reply: Reply<RoomSnapshot>,
    },
    IsExpired {
        now: Instant,
        reply: Reply<bool>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's just the room code and an `mpsc::Sender`. The
/// registry hands out clones so that callers talk to a room without
/// holding the registry lock.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Join { .. } => "Join",
            Self::Leave { .. } => "Leave",
            Self::StartGame { .. } => "StartGame",
            Self::SubmitMove { .. } => "SubmitMove",
            Self::MarkReady { .. } => "MarkReady",
            Self::Disconnect { .. } => "Disconnect",
            Self::Chat { .. } => "Chat",
            Self::ChatHistory { .. } => "ChatHistory",
            Self::Rematch { .. } => "Rematch",
            Self::SwitchGame { .. } => "SwitchGame",
            Self::Snapshot { .. } => "Snapshot",
            Self::IsExpired { .. } => "IsExpired",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    pub async fn join(&self, player: Player) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Join { player, reply }).await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await
    }

    pub async fn start_game(
        &self,
        player_id: PlayerId,
        kind: GameKind,
        reset_scores: bool,
    ) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::StartGame {
            player_id,
            kind,
            reset_scores,
            reply,
        })
        .await
    }

    pub async fn submit_move(
        &self,
        player_id: PlayerId,
        payload: Value,
    ) -> Result<MoveOutcome, RoomError> {
        self.request(|reply| RoomCommand::SubmitMove {
            player_id,
            payload,
            reply,
        })
        .await
    }

    pub async fn mark_ready(&self, player_id: PlayerId) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::MarkReady { player_id, reply })
            .await
    }

    pub async fn disconnect(&self, player_id: PlayerId) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Disconnect { player_id, reply })
            .await
    }

    pub async fn post_chat(
        &self,
        player_id: PlayerId,
        text: impl Into<String>,
    ) -> Result<ChatEntry, RoomError> {
        let text = text.into();
        self.request(|reply| RoomCommand::Chat {
            player_id,
            text,
            reply,
        })
        .await
    }

    pub async fn chat_history(&self) -> Result<Vec<ChatEntry>, RoomError> {
        self.request(|reply| RoomCommand::ChatHistory { reply }).await
    }

    /// Returns the requester's display name.
    pub async fn request_rematch(&self, player_id: PlayerId) -> Result<String, RoomError> {
        self.request(|reply| RoomCommand::Rematch { player_id, reply })
            .await
    }

    pub async fn switch_game(&self, player_id: PlayerId) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::SwitchGame { player_id, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn is_expired(&self, now: Instant) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::IsExpired { now, reply })
            .await
    }

    /// Tells the actor to stop. Pending commands behind it are dropped.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            debug!(room = %self.room.code(), command = ?cmd, "room command");
            let room = &mut self.room;
            match cmd {
                RoomCommand::Join { player, reply } => {
                    let _ = reply.send(room.add_player(player));
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = room.remove_player(player_id).map(|player| LeaveOutcome {
                        player,
                        snapshot: room.snapshot(),
                        now_empty: room.is_empty(),
                    });
                    let _ = reply.send(result);
                }
                RoomCommand::StartGame {
                    player_id,
                    kind,
                    reset_scores,
                    reply,
                } => {
                    let _ = reply.send(room.start_game(player_id, kind, reset_scores));
                }
                RoomCommand::SubmitMove {
                    player_id,
                    payload,
                    reply,
                } => {
                    let _ = reply.send(room.submit_move(player_id, &payload));
                }
                RoomCommand::MarkReady { player_id, reply } => {
                    let _ = reply.send(room.mark_ready(player_id));
                }
                RoomCommand::Disconnect { player_id, reply } => {
                    let result = room.mark_disconnected(player_id).map(|()| room.snapshot());
                    let _ = reply.send(result);
                }
                RoomCommand::Chat {
                    player_id,
                    text,
                    reply,
                } => {
                    let _ = reply.send(room.post_chat(player_id, &text));
                }
                RoomCommand::ChatHistory { reply } => {
                    let _ = reply.send(Ok(room.chat_history()));
                }
                RoomCommand::Rematch { player_id, reply } => {
                    let _ = reply.send(room.request_rematch(player_id));
                }
                RoomCommand::SwitchGame { player_id, reply } => {
                    let _ = reply.send(room.switch_game(player_id));
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(Ok(room.snapshot()));
                }
                RoomCommand::IsExpired { now, reply } => {
                    let _ = reply.send(Ok(room.is_expired(now)));
                }
                RoomCommand::Shutdown => {
                    info!(room = %room.code(), "room shutting down");
                    break;
                }
            }
        }

        info!(room = %self.room.code(), "room actor stopped");
    }
}

/// Spawns an actor for `room` and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it's full.
pub fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let code = room.code().clone();
    let actor = RoomActor { room, receiver: rx };
    tokio::spawn(actor.run());
    RoomHandle { code, sender: tx }
}
