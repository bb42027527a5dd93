//! Replay server node - the main application entry point.
//!
//! Architecture:
//! - Single process with one shared RocksDB archive
//! - HTTP API for listings, WebSocket endpoint for replay streams
//! - One replay loop per viewer, tracked by the scheduler's registry

use std::sync::Arc;

use rewind_engine::{ReplayScheduler, TelemetryStore};

use crate::api;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::Storage;

/// Shared state for request handlers.
pub struct ServerState {
    pub storage: Arc<Storage>,
    pub scheduler: Arc<ReplayScheduler>,
    pub config: ServerConfig,
}

/// A replay server instance.
pub struct ReplayNode {
    state: Arc<ServerState>,
}

impl ReplayNode {
    /// Open the archive and prepare the scheduler.
    pub fn new(config: ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = Arc::new(Storage::open(&config.data_dir)?);

        let store: Arc<dyn TelemetryStore> = storage.clone();
        let scheduler = Arc::new(ReplayScheduler::new(store, config.scheduler.clone()));

        let state = Arc::new(ServerState {
            storage,
            scheduler,
            config,
        });

        Ok(Self { state })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Serve HTTP and WebSocket traffic until the listener fails.
    pub async fn run(self) -> Result<()> {
        let config = &self.state.config;
        tracing::info!("Replay server starting");
        tracing::info!("  API: http://{}", config.api_addr);
        tracing::info!("  Data: {:?}", config.data_dir);
        tracing::info!(
            "  Replays: {} fps, up to {} concurrent, {:?} interpolation",
            config.scheduler.target_fps,
            config.scheduler.max_concurrent_replays,
            config.scheduler.interpolation
        );

        let app = api::build_router(self.state());

        let listener = tokio::net::TcpListener::bind(config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
