//! Error types for run orchestration.

/// Result type alias for run operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Failure modes of the orchestration engine.
///
/// Per-case validator failures are never errors here; they are recorded as
/// results, and a crashed worker is folded into its case's result. The only
/// fatal condition is a daemon that never becomes ready.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The invoker daemon never became ready; the run aborted with zero
    /// tests executed.
    #[error(transparent)]
    Supervisor(#[from] sboxcheck_daemon::SupervisorError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_supervisor_error_is_transparent() {
        let err = RunError::from(sboxcheck_daemon::SupervisorError::NotReady(PathBuf::from(
            "/run/sboxd/sboxd.sock",
        )));
        assert!(err.to_string().contains("not running"));
    }
}
