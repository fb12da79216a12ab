//! Server configuration.

use playsync_room::RoomConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to. Port 0 picks a free port.
    pub bind_addr: String,

    /// Frames queued per connection before new ones are dropped.
    pub outbound_buffer: usize,

    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            outbound_buffer: 256,
            room: RoomConfig::default(),
        }
    }
}
