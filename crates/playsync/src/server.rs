//! `PlaySyncServer` builder and server loop.
//!
//! Ties the layers together: transport → gateway → registry → rooms.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use playsync_room::{RoomConfig, RoomRegistry};
use playsync_transport::{Transport, WebSocketTransport};
use tokio::time::{Instant, MissedTickBehavior};

use crate::gateway::Gateway;
use crate::handler::handle_connection;
use crate::{PlaySyncError, ServerConfig};

/// Builder for configuring and starting a PlaySync server.
///
/// # Example
///
/// ```rust,no_run
/// use playsync::prelude::*;
///
/// # async fn start() -> Result<(), PlaySyncError> {
/// let server = PlaySyncServer::builder()
///     .bind("0.0.0.0:5000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PlaySyncServerBuilder {
    config: ServerConfig,
}

impl PlaySyncServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    pub fn outbound_buffer(mut self, frames: usize) -> Self {
        self.config.outbound_buffer = frames;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<PlaySyncServer, PlaySyncError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let registry = RoomRegistry::new(self.config.room.clone());
        Ok(PlaySyncServer {
            transport,
            gateway: Arc::new(Gateway::new(registry)),
            config: self.config,
        })
    }
}

impl Default for PlaySyncServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound PlaySync server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PlaySyncServer {
    transport: WebSocketTransport,
    gateway: Arc<Gateway>,
    config: ServerConfig,
}

impl PlaySyncServer {
    pub fn builder() -> PlaySyncServerBuilder {
        PlaySyncServerBuilder::new()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, PlaySyncError> {
        Ok(self.transport.local_addr()?)
    }

    pub fn gateway(&self) -> Arc<Gateway> {
        Arc::clone(&self.gateway)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), PlaySyncError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then stops every
    /// room.
    ///
    /// Alongside the accept loop a sweeper task removes idle rooms every
    /// `sweep_interval`.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), PlaySyncError> {
        tracing::info!(addr = %self.config.bind_addr, "PlaySync server running");
        let sweeper = tokio::spawn(sweep_loop(
            Arc::clone(&self.gateway),
            self.config.room.sweep_interval,
        ));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let gateway = Arc::clone(&self.gateway);
                        let buffer = self.config.outbound_buffer;
                        tokio::spawn(handle_connection(conn, gateway, buffer));
                    }
                    Err(e) => tracing::error!(error = %e, "accept failed"),
                },
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("PlaySync server shutting down");
        sweeper.abort();
        self.transport.shutdown().await?;
        self.gateway.registry().shutdown().await;
        Ok(())
    }
}

async fn sweep_loop(gateway: Arc<Gateway>, every: Duration) {
    let every = every.max(Duration::from_millis(10));
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        let now = ticker.tick().await;
        let swept = gateway.maybe_sweep(now).await;
        if swept > 0 {
            tracing::info!(rooms = swept, "sweep finished");
        }
    }
}
