//! Rewind Replay Engine
//!
//! Replays archived race sessions to many viewers at once, each with an
//! independent virtual clock that can be played, paused, seeked and sped up.
//!
//! # Architecture
//!
//! - **Store**: read-only source of finalized laps and telemetry
//! - **Loader**: builds an immutable [`ReplayDataset`] per viewer
//! - **Interpolate**: a car's state at any session time
//! - **Frame**: snapshot of every resolvable car at one instant
//! - **Playback**: per-viewer clock and transport controls
//! - **Scheduler**: one loop per viewer racing commands against the frame
//!   interval, tracked by the [`ConnectionRegistry`]
//!
//! # Usage
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::new().with_session(session, telemetry));
//! let scheduler = ReplayScheduler::new(store, SchedulerConfig::default());
//! scheduler.serve(session_id, connection).await;
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod interpolate;
pub mod loader;
pub mod playback;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use config::SchedulerConfig;
pub use dataset::{DriverId, DriverSummary, Lap, ReplayDataset, TelemetrySeries};
pub use error::{Error, Result};
pub use frame::{assemble, format_elapsed, CarFrame, Frame, FrameClock};
pub use interpolate::{interpolate, interpolate_with, CarState, Interpolation};
pub use loader::{build_dataset, load_dataset};
pub use playback::{
    InitInfo, PlaybackSession, PlaybackState, PlaybackStatus, Tick, MAX_SPEED, MIN_SPEED,
};
pub use protocol::{Command, ServerMessage};
pub use registry::{ConnectionId, ConnectionInfo, ConnectionRegistry, Registration};
pub use scheduler::{run_loop, ReplayConnection, ReplayScheduler};
pub use store::{MemoryStore, SessionRecord, SessionResult, TelemetryRecord, TelemetryStore};
