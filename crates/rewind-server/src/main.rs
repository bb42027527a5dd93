//! Replay server binary
//!
//! Serves archived race sessions as controllable WebSocket replays.

use rewind_server::{ReplayNode, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rewind_server=info,rewind_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting replay server");

    let config = ServerConfig::from_env()?;

    let node = ReplayNode::new(config)?;
    node.run().await?;

    Ok(())
}
