//! Rewind Replay Server
//!
//! Streams archived race sessions to browsers over WebSocket.
//!
//! # Architecture
//!
//! - **Storage**: RocksDB archive of sessions and telemetry
//! - **API**: HTTP listings of archived sessions and live replays
//! - **WebSocket**: one replay loop per viewer, driven by `rewind-engine`
//!
//! # Example
//!
//! ```no_run
//! use rewind_server::{ReplayNode, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let node = ReplayNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod node;
pub mod storage;
pub mod ws;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use node::{ReplayNode, ServerState};
pub use storage::{SessionArchive, SessionSummary, Storage};
