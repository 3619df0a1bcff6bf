//! Error types for sboxcheck-core.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type for catalog and configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration value rejected during validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl CoreError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::config("time_usage_targets_ms cannot be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: time_usage_targets_ms cannot be empty"
        );
    }
}
