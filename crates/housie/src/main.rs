//! `housie-server`: runs the WebSocket front end.
//!
//! Environment:
//!
//! - `HOUSIE_BIND`: listen address (default `127.0.0.1:8080`)
//! - `HOUSIE_PUBLISH_TIMEOUT_MS`: per-publication timeout (default 250)
//! - `RUST_LOG`: tracing filter (default `info`)

use std::time::Duration;

use housie::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), HousieError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind = std::env::var("HOUSIE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let mut room_config = RoomConfig::default();
    if let Ok(raw) = std::env::var("HOUSIE_PUBLISH_TIMEOUT_MS") {
        match raw.parse::<u64>() {
            Ok(ms) => room_config.publish_timeout = Duration::from_millis(ms),
            Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid HOUSIE_PUBLISH_TIMEOUT_MS"),
        }
    }

    let server = HousieServer::builder()
        .bind(&bind)
        .room_config(room_config)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "housie server ready");

    server.run().await
}
