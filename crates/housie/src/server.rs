//! `HousieServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room registry, with
//! the in-process broadcast publisher feeding per-connection forwarders.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use housie_protocol::{Codec, JsonCodec};
use housie_room::{BroadcastPublisher, RoomConfig, RoomRegistry};
use housie_transport::{Transport, WebSocketTransport};

use crate::HousieError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RoomRegistry,
    pub(crate) publisher: Arc<BroadcastPublisher>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Housie server.
///
/// # Example
///
/// ```rust,no_run
/// use housie::prelude::*;
///
/// # async fn run() -> Result<(), HousieError> {
/// let server = HousieServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct HousieServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
}

impl HousieServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: Duration::from_secs(120),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the settings every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Closes connections that send nothing for this long. Clients keep
    /// an idle connection open with `ping`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and starts the notifier task.
    pub async fn build(self) -> Result<HousieServer, HousieError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let publisher = Arc::new(BroadcastPublisher::new(self.room_config.broadcast_capacity));
        let registry = RoomRegistry::with_publisher(self.room_config, Arc::clone(&publisher));

        let state = Arc::new(ServerState {
            registry,
            publisher,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(HousieServer { transport, state })
    }
}

impl Default for HousieServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Housie server. Call [`run()`](Self::run) to start accepting.
pub struct HousieServer {
    transport: WebSocketTransport,
    state: Arc<ServerState<JsonCodec>>,
}

impl HousieServer {
    pub fn builder() -> HousieServerBuilder {
        HousieServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, HousieError> {
        Ok(self.transport.local_addr()?)
    }

    /// The registry behind this server, for embedding or inspection.
    pub fn registry(&self) -> &RoomRegistry {
        &self.state.registry
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), HousieError> {
        tracing::info!("Housie server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
