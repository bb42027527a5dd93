//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use rewind_engine::{Interpolation, SchedulerConfig};

use crate::error::{Error, Result};

/// Configuration for a replay server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP/WebSocket listen address
    pub api_addr: SocketAddr,

    /// RocksDB archive directory
    pub data_dir: PathBuf,

    /// Allowed browser origins; empty allows any
    pub cors_origins: Vec<String>,

    /// Replay loop settings
    pub scheduler: SchedulerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_dir: PathBuf::from("./rewind-data"),
            cors_origins: Vec::new(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("REWIND_API_ADDR") {
            config.api_addr = parse("REWIND_API_ADDR", &addr)?;
        }
        if let Some(dir) = lookup("REWIND_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(origins) = lookup("REWIND_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(fps) = lookup("REWIND_REPLAY_FPS") {
            let fps: u32 = parse("REWIND_REPLAY_FPS", &fps)?;
            if fps == 0 {
                return Err(Error::InvalidConfig("REWIND_REPLAY_FPS must be positive".into()));
            }
            config.scheduler.target_fps = fps;
        }
        if let Some(max) = lookup("REWIND_MAX_REPLAYS") {
            config.scheduler.max_concurrent_replays = parse("REWIND_MAX_REPLAYS", &max)?;
        }
        if let Some(mode) = lookup("REWIND_INTERPOLATION") {
            config.scheduler.interpolation =
                Interpolation::from_str(&mode).map_err(Error::InvalidConfig)?;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("{}={:?}: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_addr.port(), 8000);
        assert_eq!(config.scheduler.target_fps, 30);
        assert_eq!(config.scheduler.max_concurrent_replays, 100);
        assert_eq!(config.scheduler.interpolation, Interpolation::Step);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("REWIND_API_ADDR", "127.0.0.1:9100"),
            ("REWIND_DATA_DIR", "/var/lib/rewind"),
            ("REWIND_CORS_ORIGINS", "http://localhost:3000, https://replay.example"),
            ("REWIND_REPLAY_FPS", "60"),
            ("REWIND_MAX_REPLAYS", "5"),
            ("REWIND_INTERPOLATION", "linear"),
        ]))
        .unwrap();
        assert_eq!(config.api_addr, "127.0.0.1:9100".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/rewind"));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.scheduler.target_fps, 60);
        assert_eq!(config.scheduler.max_concurrent_replays, 5);
        assert_eq!(config.scheduler.interpolation, Interpolation::Linear);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("REWIND_API_ADDR", "nowhere")])),
            Err(Error::InvalidConfig(_))
        ));
        assert!(ServerConfig::from_lookup(lookup(&[("REWIND_REPLAY_FPS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("REWIND_INTERPOLATION", "cubic")])).is_err());
    }
}
