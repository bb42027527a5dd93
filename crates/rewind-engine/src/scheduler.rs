//! Per-viewer replay loops.
//!
//! Every connection gets its own [`PlaybackSession`] and a loop that races
//! the next inbound command against the frame interval:
//!
//! ```text
//!   ┌────────── wait: command | frame interval ──────────┐
//!   │                                                    │
//!   ▼                                                    │
//! apply command ─► status ─► advance clock ─► frame ─────┘
//!                                   │
//!                                   └─► finished (once)
//! ```
//!
//! Loops share nothing but the [`ConnectionRegistry`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::loader::load_dataset;
use crate::playback::{PlaybackSession, Tick};
use crate::protocol::{Command, ServerMessage};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::store::TelemetryStore;

/// A bidirectional message channel to one viewer.
pub trait ReplayConnection: Send {
    /// Next text message from the viewer. `None` once the viewer is gone.
    fn recv(&mut self) -> impl Future<Output = Option<Result<String>>> + Send;

    /// Deliver a message. Fails when the viewer can no longer be reached.
    fn send(&mut self, message: &ServerMessage) -> impl Future<Output = Result<()>> + Send;

    /// Close the channel. Errors are ignored.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Starts and supervises replay loops.
pub struct ReplayScheduler {
    store: Arc<dyn TelemetryStore>,
    registry: Arc<ConnectionRegistry>,
    config: SchedulerConfig,
}

impl ReplayScheduler {
    pub fn new(store: Arc<dyn TelemetryStore>, config: SchedulerConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.max_concurrent_replays));
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Serve a replay of `session_id` over `conn` until the viewer leaves.
    ///
    /// An unknown session or a full registry is reported to the viewer with
    /// an `error` message and the connection is closed. The registry slot is
    /// released however this future ends, including when it is dropped.
    pub async fn serve<C: ReplayConnection>(&self, session_id: u64, mut conn: C) {
        let registration = match self.registry.register(session_id) {
            Ok(registration) => registration,
            Err(e) => {
                warn!(session_id, "Rejecting replay: {}", e);
                reject(&mut conn, &e).await;
                return;
            }
        };
        let connection_id = registration.connection_id();

        let dataset = match load_dataset(Arc::clone(&self.store), session_id).await {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(%connection_id, session_id, "Rejecting replay: {}", e);
                drop(registration);
                reject(&mut conn, &e).await;
                return;
            }
        };

        info!(%connection_id, session_id, "Replay started");
        let mut session = PlaybackSession::new(dataset, self.config.interpolation);

        let outcome = async {
            conn.send(&ServerMessage::Init {
                data: session.init_info(),
            })
            .await?;
            run_loop(connection_id, &mut session, &mut conn, self.config.frame_interval()).await
        }
        .await;

        // Dropping the session releases the dataset.
        drop(registration);
        drop(session);

        match outcome {
            Ok(()) => info!(%connection_id, "Viewer disconnected"),
            Err(e) => warn!(%connection_id, "Replay loop terminated: {}", e),
        }
        conn.close().await;
    }
}

async fn reject<C: ReplayConnection>(conn: &mut C, error: &Error) {
    let message = ServerMessage::Error {
        message: error.viewer_message(),
    };
    if let Err(e) = conn.send(&message).await {
        debug!("Failed to deliver rejection: {}", e);
    }
    conn.close().await;
}

/// Drive one session until the viewer disconnects or a send fails.
///
/// Within an iteration a command is applied before the frame that reflects
/// it is assembled.
pub async fn run_loop<C: ReplayConnection>(
    connection_id: ConnectionId,
    session: &mut PlaybackSession,
    conn: &mut C,
    frame_interval: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let inbound = tokio::select! {
            msg = conn.recv() => Some(msg),
            _ = tokio::time::sleep(frame_interval) => None,
        };

        if let Some(msg) = inbound {
            let text = match msg {
                Some(Ok(text)) => text,
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            };

            match Command::parse(&text) {
                Ok(command) => {
                    if command == Command::Unknown {
                        debug!(%connection_id, "Ignoring unknown action: {}", text);
                    }
                    let repositioned = session.apply(command);
                    conn.send(&ServerMessage::Status {
                        data: session.status(),
                    })
                    .await?;

                    // Playing sessions get their frame from the tick below.
                    if repositioned && !session.is_playing() {
                        conn.send(&ServerMessage::Frame {
                            data: session.frame(),
                        })
                        .await?;
                    }
                }
                Err(e) => debug!(%connection_id, "Ignoring malformed command: {}", e),
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;

        match session.advance(elapsed) {
            Tick::Idle => {}
            Tick::Advanced => {
                conn.send(&ServerMessage::Frame {
                    data: session.frame(),
                })
                .await?;
            }
            Tick::Finished => {
                conn.send(&ServerMessage::Frame {
                    data: session.frame(),
                })
                .await?;
                conn.send(&ServerMessage::Finished).await?;
                info!(%connection_id, "Replay finished");
            }
            Tick::Halted => {
                conn.send(&ServerMessage::Status {
                    data: session.status(),
                })
                .await?;
            }
        }
    }
}
