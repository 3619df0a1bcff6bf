//! Error types for daemon supervision.

use std::path::PathBuf;

/// Result type alias for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Failure modes of daemon lifecycle supervision.
///
/// Any of these is fatal to the run: no test may execute without a live
/// daemon, because no result would be meaningful.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// External mode: the readiness marker does not exist.
    #[error("invoker daemon is not running: readiness marker {0} not found")]
    NotReady(PathBuf),

    /// Bundled mode: the daemon binary could not be spawned.
    #[error("failed to spawn invoker daemon: {0}")]
    Spawn(String),

    /// Bundled mode: the daemon exited during the settle interval.
    #[error("invoker daemon exited during startup (status {status:?})")]
    ExitedEarly {
        /// Exit status observed while settling, if any.
        status: Option<i32>,
    },

    /// Stopping a running or stale daemon failed.
    #[error("failed to stop invoker daemon: {0}")]
    Stop(String),

    /// Lifecycle operation attempted from the wrong state.
    #[error("invalid supervisor state: {0}")]
    State(String),

    /// I/O error touching a lifecycle marker.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
