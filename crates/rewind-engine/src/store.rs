//! Read-only access to archived sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{DriverId, Lap};
use crate::error::{Error, Result};

/// A declared result row for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub driver_id: DriverId,
    pub team_id: Option<u32>,
    pub position: Option<u32>,
}

/// A finalized session as stored in the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: u64,
    #[serde(default)]
    pub total_laps: u32,
    #[serde(default)]
    pub laps: Vec<Lap>,
    #[serde(default)]
    pub results: Vec<SessionResult>,
}

/// Recorded telemetry for one (driver, lap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub driver_id: DriverId,
    pub lap_number: u32,
    pub sample_count: usize,
    #[serde(default)]
    pub timestamps_ms: Vec<f64>,
    #[serde(default)]
    pub pos_x: Vec<f64>,
    #[serde(default)]
    pub pos_y: Vec<f64>,
    #[serde(default)]
    pub speed_kmh: Vec<f64>,
    #[serde(default)]
    pub gear: Vec<i32>,
    #[serde(default)]
    pub drs: Vec<i32>,
}

/// Source of finalized session records.
///
/// Implementations are called from tokio's blocking pool, so they may do
/// synchronous I/O.
pub trait TelemetryStore: Send + Sync {
    /// Fetch a session's laps and results. Fails with `Error::NotFound` for
    /// unknown ids.
    fn get_session(&self, session_id: u64) -> Result<SessionRecord>;

    /// Fetch every telemetry record of a session. An empty list is valid.
    fn get_telemetry(&self, session_id: u64) -> Result<Vec<TelemetryRecord>>;
}

/// A store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    sessions: HashMap<u64, SessionRecord>,
    telemetry: HashMap<u64, Vec<TelemetryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a session together with its telemetry.
    pub fn insert(&mut self, session: SessionRecord, telemetry: Vec<TelemetryRecord>) {
        let id = session.session_id;
        self.sessions.insert(id, session);
        self.telemetry.insert(id, telemetry);
    }

    /// Builder form of [`MemoryStore::insert`].
    pub fn with_session(mut self, session: SessionRecord, telemetry: Vec<TelemetryRecord>) -> Self {
        self.insert(session, telemetry);
        self
    }
}

impl TelemetryStore for MemoryStore {
    fn get_session(&self, session_id: u64) -> Result<SessionRecord> {
        self.sessions
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))
    }

    fn get_telemetry(&self, session_id: u64) -> Result<Vec<TelemetryRecord>> {
        Ok(self.telemetry.get(&session_id).cloned().unwrap_or_default())
    }
}
