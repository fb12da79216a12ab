//! The closed set of game machines and the factory that builds them.

use playsync_protocol::{GameKind, GameView, MatchResult, PlayerId};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    GameContext, GameRules, MoveAccepted, MoveError, QuickMath, Reaction, Rps, Scoreboard,
    TicTacToe, WouldYouRather,
};

/// One running game of any kind.
#[derive(Debug, Clone)]
pub enum GameMachine {
    Rps(Rps),
    TicTacToe(TicTacToe),
    Reaction(Reaction),
    QuickMath(QuickMath),
    WouldYouRather(WouldYouRather),
}

impl GameMachine {
    /// Builds and starts the machine for `kind`.
    pub fn new(kind: GameKind, ctx: &GameContext) -> Self {
        let mut rng = rand::rng();
        let config = &ctx.config;
        match kind {
            GameKind::RockPaperScissors => Self::Rps(Rps::new(ctx.seats, config.rps_best_of)),
            GameKind::TicTacToe => Self::TicTacToe(TicTacToe::new(ctx.seats, ctx.prior_tictactoe)),
            GameKind::ReactionTime => Self::Reaction(Reaction::start(
                ctx.seats,
                config.reaction_delay_ms.clone(),
                &mut rng,
            )),
            GameKind::QuickMath => Self::QuickMath(QuickMath::start(
                ctx.seats,
                config.math_operand_max,
                &mut rng,
            )),
            GameKind::WouldYouRather => Self::WouldYouRather(WouldYouRather::start(
                ctx.seats,
                config.wyr_rounds,
                &mut rng,
            )),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Self::Rps(_) => GameKind::RockPaperScissors,
            Self::TicTacToe(_) => GameKind::TicTacToe,
            Self::Reaction(_) => GameKind::ReactionTime,
            Self::QuickMath(_) => GameKind::QuickMath,
            Self::WouldYouRather(_) => GameKind::WouldYouRather,
        }
    }

    /// Decodes `payload` into this game's move type and applies it.
    pub fn process_move(
        &mut self,
        player: PlayerId,
        payload: &Value,
        scores: &mut Scoreboard,
    ) -> Result<MoveAccepted, MoveError> {
        match self {
            Self::Rps(game) => apply(game, player, payload, scores),
            Self::TicTacToe(game) => apply(game, player, payload, scores),
            Self::Reaction(game) => apply(game, player, payload, scores),
            Self::QuickMath(game) => apply(game, player, payload, scores),
            Self::WouldYouRather(game) => apply(game, player, payload, scores),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Self::Rps(game) => game.is_complete(),
            Self::TicTacToe(game) => game.is_complete(),
            Self::Reaction(game) => game.is_complete(),
            Self::QuickMath(game) => game.is_complete(),
            Self::WouldYouRather(game) => game.is_complete(),
        }
    }

    pub fn results(&self) -> Option<MatchResult> {
        match self {
            Self::Rps(game) => game.results(),
            Self::TicTacToe(game) => game.results(),
            Self::Reaction(game) => game.results(),
            Self::QuickMath(game) => game.results(),
            Self::WouldYouRather(game) => game.results(),
        }
    }

    pub fn view(&self) -> GameView {
        match self {
            Self::Rps(game) => game.view(),
            Self::TicTacToe(game) => game.view(),
            Self::Reaction(game) => game.view(),
            Self::QuickMath(game) => game.view(),
            Self::WouldYouRather(game) => game.view(),
        }
    }

    /// A player signalled readiness. Only the reaction game shows it.
    pub fn mark_ready(&mut self) {
        if let Self::Reaction(game) = self {
            game.set_ready();
        }
    }
}

fn apply<R: GameRules>(
    rules: &mut R,
    player: PlayerId,
    payload: &Value,
    scores: &mut Scoreboard,
) -> Result<MoveAccepted, MoveError> {
    let mv = <R::Move as Deserialize>::deserialize(payload)
        .map_err(|e| MoveError::MalformedPayload(e.to_string()))?;
    rules.process_move(player, mv, scores)
}
