//! Room configuration.

use std::time::Duration;

use playsync_games::GameConfig;
use serde::{Deserialize, Serialize};

/// Settings shared by every room in a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Seats per room. Every game is two-player.
    pub max_players: usize,

    /// A room nobody has touched for this long is swept.
    pub idle_timeout: Duration,

    /// Minimum time between two sweeps.
    pub sweep_interval: Duration,

    /// Characters in a generated room code.
    pub code_length: usize,

    /// Chat lines kept per room; older ones are dropped.
    pub chat_history_limit: usize,

    /// Longest accepted chat message, in characters, after trimming.
    pub chat_max_chars: usize,

    /// Capacity of each room actor's command channel.
    pub command_buffer: usize,

    pub games: GameConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 2,
            idle_timeout: Duration::from_secs(1200),
            sweep_interval: Duration::from_secs(60),
            code_length: 8,
            chat_history_limit: 50,
            chat_max_chars: 200,
            command_buffer: 64,
            games: GameConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_players, 2);
        assert_eq!(config.idle_timeout, Duration::from_secs(1200));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.code_length, 8);
        assert_eq!(config.chat_history_limit, 50);
        assert_eq!(config.chat_max_chars, 200);
    }
}
