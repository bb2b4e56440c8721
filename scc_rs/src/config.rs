//! Configuration file support for scc-metrics.
//!
//! Loads optional `.scc-mcp/config.toml` from the working directory.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::types::DEFAULT_HOTSPOT_THRESHOLD;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SccConfig {
    /// scc executable name or path
    pub binary: String,
    /// Kill scc after this many seconds. Unset (or 0) waits forever.
    pub timeout_secs: Option<u64>,
    /// Threshold for `hotspots` when the caller omits one
    pub default_threshold: u64,
    /// Arguments passed to every scc invocation, before the path.
    /// Example: `["--no-gitignore", "--exclude-dir", "vendor"]`
    pub extra_args: Vec<String>,
}

impl Default for SccConfig {
    fn default() -> Self {
        Self {
            binary: "scc".to_string(),
            timeout_secs: None,
            default_threshold: DEFAULT_HOTSPOT_THRESHOLD,
            extra_args: Vec::new(),
        }
    }
}

impl SccConfig {
    /// Load config from `.scc-mcp/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".scc-mcp").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
