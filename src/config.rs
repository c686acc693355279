//! Configuration types and loading
//!
//! Configuration is loaded from JSON and validated at startup. All fields
//! have defaults, so an empty object `{}` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Default per-connection deferred-packet queue capacity
pub const DEFAULT_MAX_DEFERRED: usize = 512;

/// Matching strategy for tuple-based registry lookups.
///
/// The original interception layer matched on destination address/port only,
/// ignoring the source side of the tuple. That behavior is preserved as the
/// default; `FullTuple` is an opt-in strictness upgrade for deployments with
/// multiple local connections to the same remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationMatch {
    /// Match destination address and port only (historical behavior)
    #[default]
    DestinationOnly,
    /// Match the full source/destination 4-tuple
    FullTuple,
}

/// Tracker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Maximum deferred packets buffered per connection
    #[serde(default = "default_max_deferred")]
    pub max_deferred_packets: usize,

    /// Lookup matching strategy for `find_by_key`
    #[serde(default)]
    pub destination_match: DestinationMatch,
}

fn default_max_deferred() -> usize {
    DEFAULT_MAX_DEFERRED
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_deferred_packets: DEFAULT_MAX_DEFERRED,
            destination_match: DestinationMatch::default(),
        }
    }
}

impl TrackerConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_deferred_packets == 0 {
            return Err(ConfigError::ValidationError(
                "max_deferred_packets must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig, ConfigError> {
    let path = path.as_ref();

    debug!("Loading configuration from {:?}", path);

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path)?;

    let config: TrackerConfig = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {e} at {path:?}")))?;

    config.validate()?;

    info!(
        "Configuration loaded: max_deferred={} match={:?}",
        config.max_deferred_packets, config.destination_match
    );

    Ok(config)
}

/// Load configuration from a JSON string
///
/// # Errors
///
/// Returns `ConfigError` if parsing or validation fails.
pub fn load_config_str(json: &str) -> Result<TrackerConfig, ConfigError> {
    let config: TrackerConfig =
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.validate()?;

    Ok(config)
}
