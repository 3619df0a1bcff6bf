//! Harness configuration.
//!
//! Everything that used to be scattered run-variant knowledge lives here as
//! one explicit configuration value: daemon mode, concurrency degree, marker
//! paths and the catalog parameter tables. Defaults are usable as-is; a TOML
//! file can override any subset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogParams;
use crate::error::{CoreError, Result};

/// Who owns the invoker daemon's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonMode {
    /// The harness spawns, verifies and stops the daemon itself.
    Bundled,
    /// Another process supervises the daemon; the harness only checks for
    /// the readiness marker.
    #[default]
    External,
}

fn default_daemon_binary() -> PathBuf {
    PathBuf::from("sboxd")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/run/sboxd/sboxd.sock")
}

fn default_pid_path() -> PathBuf {
    PathBuf::from("/run/sboxd.pid")
}

fn default_settle_ms() -> u64 {
    500
}

fn default_concurrency() -> usize {
    1
}

fn default_color() -> bool {
    true
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Daemon ownership mode.
    #[serde(default)]
    pub mode: DaemonMode,

    /// Worker pool size; 1 means strictly sequential execution.
    ///
    /// Concurrency only affects wall-clock duration and the noise level of
    /// timing-sensitive optional cases, never correctness.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Daemon binary to spawn in bundled mode.
    #[serde(default = "default_daemon_binary")]
    pub daemon_binary: PathBuf,

    /// Arguments passed to the daemon binary in bundled mode.
    #[serde(default)]
    pub daemon_args: Vec<String>,

    /// Readiness marker: the daemon's listening socket path.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Lifecycle marker (pid file) used in bundled mode.
    #[serde(default = "default_pid_path")]
    pub pid_path: PathBuf,

    /// Settle interval after spawning the daemon, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Whether report lines carry ANSI colors.
    #[serde(default = "default_color")]
    pub color: bool,

    /// Catalog parameter tables.
    #[serde(default)]
    pub catalog: CatalogParams,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: DaemonMode::External,
            concurrency: default_concurrency(),
            daemon_binary: default_daemon_binary(),
            daemon_args: Vec::new(),
            socket_path: default_socket_path(),
            pid_path: default_pid_path(),
            settle_ms: default_settle_ms(),
            color: default_color(),
            catalog: CatalogParams::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads a configuration file, applying defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parses a TOML document, applying defaults for missing fields.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CoreError::config("concurrency must be at least 1"));
        }
        self.catalog.validate()
    }

    /// Settle interval as a [`Duration`].
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.mode, DaemonMode::External);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.settle(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = HarnessConfig::from_toml_str(
            r#"
            mode = "bundled"
            concurrency = 8
            settle_ms = 250

            [catalog]
            exit_codes = [0, 1, 255]
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.mode, DaemonMode::Bundled);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.settle(), Duration::from_millis(250));
        assert_eq!(config.catalog.exit_codes, vec![0, 1, 255]);
        // Untouched tables keep their defaults.
        assert_eq!(config.catalog.time_usage_targets_ms, vec![200, 500, 1000]);
        assert_eq!(config.socket_path, PathBuf::from("/run/sboxd/sboxd.sock"));
    }

    #[test]
    fn test_from_toml_empty_document() {
        let config = HarnessConfig::from_toml_str("").expect("empty config is all defaults");
        assert_eq!(config.mode, DaemonMode::External);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = HarnessConfig::from_toml_str("concurrency = 0");
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let err = HarnessConfig::from_toml_str(
            r#"
            [catalog]
            terminating_signals = [9]
            ignorable_signals = [9]
            "#,
        );
        assert!(err.is_err());
    }
}
