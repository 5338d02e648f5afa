//! HTTP server for comment analysis.
//!
//! This module provides:
//! - The axum router and handlers (`routes`)
//! - Shared handler state (`state`)
//! - Configuration types (`config`)
//! - Analyzer construction from configuration (`backend`)

pub mod backend;
pub mod config;
pub mod routes;
pub mod state;

pub use backend::{Backend, build_analyzer};
pub use routes::router;
pub use state::AppState;

use std::net::SocketAddr;

use tracing::info;

/// Serve `state` on `addr` until the process is stopped.
pub async fn run(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await
}
