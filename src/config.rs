/*!
 * Configuration types for the Tether client
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_connect::{parse_pool, DriverConfig, Endpoint};

use crate::error::{Result, TetherError};

/// Main configuration for the client process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Interchangeable servers, as `host:port`
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Identity sent as `instance-id` metadata (None = random UUID)
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Seed for endpoint selection (None = seeded from the OS)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Delay between two queries of an active session
    #[serde(default = "default_pacing_interval_ms")]
    pub pacing_interval_ms: u64,

    /// Soft deadline of a fresh session
    #[serde(default = "default_initial_grace_ms")]
    pub initial_grace_ms: u64,

    /// Pause after a failed connection and after every teardown
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Length of one unit of a server disconnect hint
    #[serde(default = "default_hint_unit_ms")]
    pub hint_unit_ms: u64,

    /// Upper bound on establishing a channel
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound on a single StartTransaction call
    #[serde(default = "default_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            instance_id: None,
            seed: None,
            pacing_interval_ms: default_pacing_interval_ms(),
            initial_grace_ms: default_initial_grace_ms(),
            backoff_ms: default_backoff_ms(),
            hint_unit_ms: default_hint_unit_ms(),
            connect_timeout_ms: default_timeout_ms(),
            call_timeout_ms: default_timeout_ms(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_endpoints() -> Vec<String> {
    vec!["localhost:50051".to_string(), "localhost:50053".to_string()]
}

fn default_pacing_interval_ms() -> u64 {
    1000
}

fn default_initial_grace_ms() -> u64 {
    2000
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_hint_unit_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    5000
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            TetherError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| TetherError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check everything that would make the client unable to start
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 || self.call_timeout_ms == 0 {
            return Err(TetherError::Config(
                "timeouts must be greater than 0".to_string(),
            ));
        }

        if let Some(id) = &self.instance_id {
            if id.is_empty() || !id.is_ascii() {
                return Err(TetherError::Config(format!(
                    "instance_id must be non-empty ASCII, got {:?}",
                    id
                )));
            }
        }

        self.endpoint_pool()?;
        self.to_driver_config().validate()?;
        Ok(())
    }

    /// Parse the configured endpoints
    pub fn endpoint_pool(&self) -> Result<Vec<Endpoint>> {
        if self.endpoints.is_empty() {
            return Err(TetherError::Config(
                "at least one endpoint is required".to_string(),
            ));
        }

        Ok(parse_pool(&self.endpoints)?)
    }

    /// Timing settings for the session driver
    pub fn to_driver_config(&self) -> DriverConfig {
        DriverConfig {
            pacing_interval: Duration::from_millis(self.pacing_interval_ms),
            initial_grace: Duration::from_millis(self.initial_grace_ms),
            backoff: Duration::from_millis(self.backoff_ms),
            hint_unit: Duration::from_millis(self.hint_unit_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Configured instance id, or a fresh random one
    pub fn resolve_instance_id(&self) -> String {
        self.instance_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}
