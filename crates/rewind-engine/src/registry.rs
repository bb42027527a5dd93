//! Registry of live replay connections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Identity of one viewer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What the registry knows about a live connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    /// Archived session being replayed
    pub session_id: u64,
    /// Unix time the replay started, in ms
    pub started_at_ms: u64,
}

/// Live replay connections keyed by connection identity.
///
/// Each connection's playback state lives in its own loop; the registry
/// only tracks membership and enforces the concurrency limit. The lock is
/// never held across an await point, so removal can run from `Drop`.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionInfo>>,
    next_id: AtomicU64,
    max_connections: usize,
}

/// A live slot in the registry. Dropping it frees the slot.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    connection_id: ConnectionId,
}

impl Registration {
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.remove(self.connection_id);
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("live", &self.len())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl ConnectionRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_connections,
        }
    }

    /// Add a connection replaying `session_id`.
    ///
    /// The slot is held until the returned [`Registration`] is dropped.
    pub fn register(self: &Arc<Self>, session_id: u64) -> Result<Registration> {
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        if connections.len() >= self.max_connections {
            return Err(Error::CapacityExceeded {
                limit: self.max_connections,
            });
        }

        let connection_id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let started_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        connections.insert(
            connection_id,
            ConnectionInfo {
                connection_id,
                session_id,
                started_at_ms,
            },
        );
        debug!(%connection_id, session_id, live = connections.len(), "Registered replay");
        Ok(Registration {
            registry: Arc::clone(self),
            connection_id,
        })
    }

    fn remove(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        let removed = connections.remove(&connection_id);
        if removed.is_some() {
            debug!(%connection_id, live = connections.len(), "Unregistered replay");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.connections.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live connections ordered by id.
    pub fn list(&self) -> Vec<ConnectionInfo> {
        let mut list: Vec<_> = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        list.sort_by_key(|c| c.connection_id);
        list
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}
