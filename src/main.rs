//! Historle · Daily History Puzzle Backend
//!
//! - Axum HTTP + WebSocket API around the puzzle session engine
//! - Optional remote event feed (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   GAME_CONFIG_PATH  : path to TOML config (settings + event bank)
//!   EVENTS_URL        : remote event feed base URL; enables the feed if present
//!   DATA_PATH         : JSON file for history + leaderboard; in-memory only if unset
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod engine;
mod clock;
mod config;
mod seeds;
mod events;
mod history;
mod leaderboard;
mod store;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (event sources, history, leaderboard, sessions).
  let state = Arc::new(AppState::new().await);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "historle_backend", %addr, today = %state.clock.today(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  // Flush whatever the last sessions wrote.
  state.persist().await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "historle_backend", error = %e, "Failed to listen for Ctrl-C");
  }
  info!(target: "historle_backend", "Shutdown signal received");
}
