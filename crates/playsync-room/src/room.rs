//! The room: membership, the active match, history, cumulative scores
//! and chat.
//!
//! `Room` is plain synchronous state. It is owned by exactly one actor
//! task (see [`spawn_room`](crate::spawn_room)), so every method here runs
//! with exclusive access and never needs a lock of its own.

use std::collections::{BTreeMap, HashMap, VecDeque};

use playsync_games::{GameContext, GameSession, MoveAccepted, MoveError};
use playsync_protocol::{
    ChatEntry, GameKind, HistoryEntry, MatchResult, PlayerId, PlayerView, RoomCode, RoomSnapshot,
    unix_millis,
};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{error, info};

use crate::{RoomConfig, RoomError};

/// A seated player.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub avatar_color: String,
    /// Transport connection currently bound to this player, if any.
    pub connection: Option<u64>,
    pub is_ready: bool,
    pub is_active: bool,
    pub joined_at: Instant,
}

impl Player {
    pub fn new(
        id: PlayerId,
        display_name: impl Into<String>,
        avatar_color: impl Into<String>,
        connection: Option<u64>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_color: avatar_color.into(),
            connection,
            is_ready: false,
            is_active: true,
            joined_at: Instant::now(),
        }
    }
}

/// A match that just ended, with the snapshot taken before the room let
/// go of it.
#[derive(Debug, Clone)]
pub struct FinishedMatch {
    pub results: MatchResult,
    pub snapshot: RoomSnapshot,
}

/// Everything that came out of one `submit_move`.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// What the mover is told.
    pub reply: Result<MoveAccepted, MoveError>,
    /// Room state after the move. `None` if the move changed nothing.
    pub snapshot: Option<RoomSnapshot>,
    /// Set when this move ended the match.
    pub finished: Option<FinishedMatch>,
}

pub struct Room {
    code: RoomCode,
    config: RoomConfig,
    created_at: u64,
    last_activity: Instant,
    /// Join order. Index 0 is seat 1.
    order: Vec<PlayerId>,
    players: HashMap<PlayerId, Player>,
    game: Option<GameSession>,
    history: Vec<HistoryEntry>,
    cumulative: BTreeMap<PlayerId, u32>,
    chat: VecDeque<ChatEntry>,
}

impl Room {
    pub fn new(code: RoomCode, config: RoomConfig) -> Self {
        let chat = VecDeque::with_capacity(config.chat_history_limit);
        Self {
            code,
            config,
            created_at: unix_millis(),
            last_activity: Instant::now(),
            order: Vec::new(),
            players: HashMap::new(),
            game: None,
            history: Vec::new(),
            cumulative: BTreeMap::new(),
            chat,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn player_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Player ids in join order.
    pub fn player_ids(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn current_game(&self) -> Option<&GameSession> {
        self.game.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn cumulative_scores(&self) -> &BTreeMap<PlayerId, u32> {
        &self.cumulative
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// `true` once the room has been idle for longer than its timeout.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity) > self.config.idle_timeout
    }

    fn require_member(&self, id: PlayerId) -> Result<&Player, RoomError> {
        self.players
            .get(&id)
            .ok_or_else(|| RoomError::NotMember(id, self.code.clone()))
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    /// Seats a player and returns the new snapshot.
    pub fn add_player(&mut self, player: Player) -> Result<RoomSnapshot, RoomError> {
        if self.players.contains_key(&player.id) {
            return Err(RoomError::AlreadyMember(player.id, self.code.clone()));
        }
        if self.order.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        info!(
            room = %self.code,
            player_id = %player.id,
            name = %player.display_name,
            "player joined"
        );
        self.order.push(player.id);
        self.players.insert(player.id, player);
        self.touch();
        Ok(self.snapshot())
    }

    /// Removes a player. A match in progress is abandoned, since it can't
    /// go on with an empty seat.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, RoomError> {
        let player = self
            .players
            .remove(&id)
            .ok_or_else(|| RoomError::NotMember(id, self.code.clone()))?;
        self.order.retain(|p| *p != id);
        self.cumulative.remove(&id);
        if let Some(session) = self.game.take() {
            info!(room = %self.code, game = %session.kind(), "game abandoned after player left");
        }
        self.touch();
        info!(room = %self.code, player_id = %id, remaining = self.order.len(), "player left");
        Ok(player)
    }

    /// The player's connection dropped: keep the seat, show them inactive.
    pub fn mark_disconnected(&mut self, id: PlayerId) -> Result<(), RoomError> {
        let code = self.code.clone();
        let player = self
            .players
            .get_mut(&id)
            .ok_or(RoomError::NotMember(id, code))?;
        player.connection = None;
        player.is_active = false;
        Ok(())
    }

    /// Marks a player ready, and tells the running game.
    pub fn mark_ready(&mut self, id: PlayerId) -> Result<RoomSnapshot, RoomError> {
        let code = self.code.clone();
        let player = self
            .players
            .get_mut(&id)
            .ok_or(RoomError::NotMember(id, code))?;
        player.is_ready = true;
        if let Some(session) = self.game.as_mut() {
            session.mark_ready();
        }
        self.touch();
        Ok(self.snapshot())
    }

    // -----------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------

    /// Starts a new match, replacing any match in progress.
    ///
    /// With `reset_scores` everyone starts the match at zero; otherwise
    /// the room's cumulative scores carry over.
    pub fn start_game(
        &mut self,
        by: PlayerId,
        kind: GameKind,
        reset_scores: bool,
    ) -> Result<RoomSnapshot, RoomError> {
        self.require_member(by)?;
        let &[seat1, seat2, ..] = self.order.as_slice() else {
            return Err(RoomError::NotEnoughPlayers {
                have: self.order.len(),
                need: 2,
            });
        };

        let ctx = GameContext {
            seats: [seat1, seat2],
            prior_tictactoe: self
                .history
                .iter()
                .filter(|h| h.game_type == GameKind::TicTacToe)
                .count(),
            config: self.config.games.clone(),
        };
        let seed = (!reset_scores).then_some(&self.cumulative);
        self.game = Some(GameSession::start(kind, &ctx, seed));
        for player in self.players.values_mut() {
            player.is_ready = false;
        }
        self.touch();
        info!(room = %self.code, game = %kind, reset_scores, "game started");
        Ok(self.snapshot())
    }

    /// Scores the active match and files it in history.
    ///
    /// The active match stays in place so that a snapshot taken now still
    /// shows it with its final scores; call [`clear_game`](Self::clear_game)
    /// afterwards.
    pub fn end_game(&mut self, result: MatchResult) -> Result<(), RoomError> {
        let session = self
            .game
            .as_mut()
            .ok_or_else(|| RoomError::NoActiveGame(self.code.clone()))?;
        session.finish(result);
        self.cumulative = session.scores().as_map().clone();
        self.history.push(session.archive());
        info!(
            room = %self.code,
            game = %session.kind(),
            scores = ?self.cumulative,
            "game finished"
        );
        Ok(())
    }

    /// Drops the active match without archiving it.
    pub fn clear_game(&mut self) -> Option<GameSession> {
        self.game.take()
    }

    /// Applies a move to the active match.
    ///
    /// Room-level problems (not a member, no game) are errors. Whatever the
    /// game itself says, accept or reject, is in [`MoveOutcome::reply`].
    /// If the move ends the match, the match is scored and archived, a
    /// final snapshot is taken, and only then is the match cleared.
    pub fn submit_move(&mut self, by: PlayerId, payload: &Value) -> Result<MoveOutcome, RoomError> {
        self.require_member(by)?;
        let code = self.code.clone();
        let session = self.game.as_mut().ok_or(RoomError::NoActiveGame(code))?;
        self.last_activity = Instant::now();

        match session.submit(by, payload) {
            Ok(accepted) => {
                let snapshot = self.snapshot();
                let finished = self.settle_if_complete();
                match finished {
                    Ok(finished) => Ok(MoveOutcome {
                        reply: Ok(accepted),
                        snapshot: Some(snapshot),
                        finished,
                    }),
                    Err(fault) => Ok(self.abort_game(fault)),
                }
            }
            Err(fault) if fault.is_fatal() => Ok(self.abort_game(fault)),
            Err(rejected) => Ok(MoveOutcome {
                reply: Err(rejected),
                snapshot: None,
                finished: None,
            }),
        }
    }

    fn settle_if_complete(&mut self) -> Result<Option<FinishedMatch>, MoveError> {
        let Some(session) = self.game.as_ref() else {
            return Ok(None);
        };
        if !session.is_complete() {
            return Ok(None);
        }
        let results = session
            .results()
            .ok_or_else(|| MoveError::Corrupted("completed game has no result".into()))?;
        self.end_game(results.clone())
            .map_err(|e| MoveError::Corrupted(e.to_string()))?;
        let snapshot = self.snapshot();
        self.clear_game();
        Ok(Some(FinishedMatch { results, snapshot }))
    }

    /// Drops a game whose state can no longer be trusted.
    fn abort_game(&mut self, fault: MoveError) -> MoveOutcome {
        if let Some(session) = self.game.take() {
            error!(room = %self.code, game = %session.kind(), %fault, "game aborted");
        }
        MoveOutcome {
            reply: Err(fault),
            snapshot: Some(self.snapshot()),
            finished: None,
        }
    }

    /// Drops the current match so the room can pick another.
    pub fn switch_game(&mut self, by: PlayerId) -> Result<RoomSnapshot, RoomError> {
        self.require_member(by)?;
        if let Some(session) = self.game.take() {
            info!(room = %self.code, game = %session.kind(), "game switched away");
        }
        self.touch();
        Ok(self.snapshot())
    }

    /// Returns the requester's display name, for the rematch notice.
    pub fn request_rematch(&mut self, by: PlayerId) -> Result<String, RoomError> {
        let name = self.require_member(by)?.display_name.clone();
        self.touch();
        Ok(name)
    }

    // -----------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------

    /// Appends a chat line, dropping the oldest once the log is full.
    pub fn post_chat(&mut self, by: PlayerId, text: &str) -> Result<ChatEntry, RoomError> {
        let player = self.require_member(by)?;
        let message = text.trim();
        if message.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        if message.chars().count() > self.config.chat_max_chars {
            return Err(RoomError::MessageTooLong(self.config.chat_max_chars));
        }

        let entry = ChatEntry {
            player_id: player.id,
            display_name: player.display_name.clone(),
            avatar_color: player.avatar_color.clone(),
            message: message.to_string(),
            timestamp: unix_millis(),
        };
        self.chat.push_back(entry.clone());
        while self.chat.len() > self.config.chat_history_limit {
            self.chat.pop_front();
        }
        self.touch();
        Ok(entry)
    }

    pub fn chat_history(&self) -> Vec<ChatEntry> {
        self.chat.iter().cloned().collect()
    }

    // -----------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------

    /// The room's full visible state, computed in one pass.
    pub fn snapshot(&self) -> RoomSnapshot {
        let match_scores = self.game.as_ref().map(|g| g.scores());
        let players = self
            .order
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|p| PlayerView {
                player_id: p.id,
                display_name: p.display_name.clone(),
                avatar_color: p.avatar_color.clone(),
                score: match match_scores {
                    Some(scores) => scores.get(p.id),
                    None => self.cumulative.get(&p.id).copied().unwrap_or(0),
                },
                is_ready: p.is_ready,
                is_active: p.is_active,
            })
            .collect();

        RoomSnapshot {
            room_id: self.code.clone(),
            created_at: self.created_at,
            player_count: self.order.len(),
            max_players: self.config.max_players,
            players,
            current_game: self.game.as_ref().map(GameSession::active),
            game_history: self.history.clone(),
        }
    }
}
