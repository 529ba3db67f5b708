use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{ServerError, ServerResult};

/// Server tunables, loaded from a TOML file or built from defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Interface to bind
    pub bind_address: String,
    /// Simultaneous session cap; excess connections are closed on accept
    pub max_connections: usize,
    /// Readiness poll timeout in milliseconds
    pub poll_timeout_ms: u64,
    /// How long to wait for terminal negotiation replies, in seconds
    pub autosense_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7777,
            bind_address: "127.0.0.1".to_string(),
            max_connections: 1000,
            poll_timeout_ms: 100,
            autosense_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are written to `path`
    /// for next time and returned. A present but malformed file is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ServerError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("bad config {}: {}", path.display(), e),
                ))
            }),
            Err(_) => {
                let config = Self::default();
                match toml::to_string_pretty(&config) {
                    Ok(rendered) => {
                        if let Err(e) = fs::write(path, rendered) {
                            warn!(path = %path.display(), error = %e, "could not write default config");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "could not serialize default config");
                    }
                }
                Ok(config)
            }
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn autosense_timeout(&self) -> Duration {
        Duration::from_secs(self.autosense_timeout_secs)
    }

    /// Address string suitable for binding.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
