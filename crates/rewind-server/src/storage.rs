//! Archived sessions in RocksDB.
//!
//! Key layout:
//! - `session:{id}` → [`SessionRecord`] JSON
//! - `telemetry:{id}:{driver}:{lap}` → [`TelemetryRecord`] JSON

use std::path::Path;

use rewind_engine::{SessionRecord, TelemetryRecord, TelemetryStore};
use rocksdb::{Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// A session with all of its telemetry, as exchanged by the import tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArchive {
    pub session: SessionRecord,
    #[serde(default)]
    pub telemetry: Vec<TelemetryRecord>,
}

/// Listing entry for an archived session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: u64,
    pub total_laps: u32,
    pub driver_count: usize,
    pub lap_count: usize,
}

/// RocksDB-backed archive.
pub struct Storage {
    db: DB,
}

fn session_key(session_id: u64) -> String {
    format!("session:{}", session_id)
}

fn telemetry_prefix(session_id: u64) -> String {
    format!("telemetry:{}:", session_id)
}

fn telemetry_key(session_id: u64, record: &TelemetryRecord) -> String {
    format!(
        "{}{}:{}",
        telemetry_prefix(session_id),
        record.driver_id,
        record.lap_number
    )
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // --- Sessions ---

    /// Store a session record.
    pub fn put_session(&self, session: &SessionRecord) -> Result<()> {
        let value = serde_json::to_vec(session)?;
        self.db.put(session_key(session.session_id).as_bytes(), value)?;
        Ok(())
    }

    /// Remove a session and all of its telemetry.
    pub fn delete_session(&self, session_id: u64) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.delete(session_key(session_id).as_bytes());
        for key in self.keys_with_prefix(telemetry_prefix(session_id).as_bytes())? {
            batch.delete(key);
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// Summaries of every archived session, ordered by id.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let prefix = b"session:";
        let mut sessions = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            let session: SessionRecord = serde_json::from_slice(&value)?;
            sessions.push(SessionSummary {
                session_id: session.session_id,
                total_laps: session.total_laps,
                driver_count: session.results.len(),
                lap_count: session.laps.len(),
            });
        }

        sessions.sort_by_key(|s| s.session_id);
        Ok(sessions)
    }

    // --- Telemetry ---

    /// Store telemetry for one (driver, lap) of a session.
    pub fn put_telemetry(&self, session_id: u64, record: &TelemetryRecord) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        self.db.put(telemetry_key(session_id, record).as_bytes(), value)?;
        Ok(())
    }

    /// Replace a session and its telemetry in one write.
    pub fn import(&self, archive: &SessionArchive) -> Result<()> {
        let session_id = archive.session.session_id;
        let mut batch = WriteBatch::default();

        for key in self.keys_with_prefix(telemetry_prefix(session_id).as_bytes())? {
            batch.delete(key);
        }
        batch.put(
            session_key(session_id).as_bytes(),
            serde_json::to_vec(&archive.session)?,
        );
        for record in &archive.telemetry {
            batch.put(
                telemetry_key(session_id, record).as_bytes(),
                serde_json::to_vec(record)?,
            );
        }

        self.db.write(batch)?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Box<[u8]>>> {
        let mut keys = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            keys.push(key);
        }
        Ok(keys)
    }
}

fn storage_error(e: rocksdb::Error) -> rewind_engine::Error {
    rewind_engine::Error::Storage(e.to_string())
}

impl TelemetryStore for Storage {
    fn get_session(&self, session_id: u64) -> rewind_engine::Result<SessionRecord> {
        match self
            .db
            .get(session_key(session_id).as_bytes())
            .map_err(storage_error)?
        {
            Some(data) => Ok(serde_json::from_slice(&data)?),
            None => Err(rewind_engine::Error::NotFound(format!("session {}", session_id))),
        }
    }

    /// Corrupt entries are skipped so the rest of the session still plays.
    fn get_telemetry(&self, session_id: u64) -> rewind_engine::Result<Vec<TelemetryRecord>> {
        let prefix = telemetry_prefix(session_id);
        let prefix = prefix.as_bytes();
        let mut records = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item.map_err(storage_error)?;
            if !key.starts_with(prefix) {
                break;
            }
            match serde_json::from_slice::<TelemetryRecord>(&value) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    key = %String::from_utf8_lossy(&key),
                    "Skipping unreadable telemetry: {}", e
                ),
            }
        }

        Ok(records)
    }
}
