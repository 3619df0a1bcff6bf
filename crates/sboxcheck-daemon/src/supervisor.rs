//! Invoker daemon lifecycle supervision.
//!
//! The harness never talks to the daemon itself; validators do. The
//! supervisor's whole job is to guarantee a live, reachable daemon before the
//! first case runs and to clean up after the last result is recorded.
//!
//! Lifecycle transitions are strictly sequential and owned by a single
//! supervisor value, so the daemon is never mutated concurrently.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::{Child, Command};

use sboxcheck_core::{DaemonMode, HarnessConfig};

use crate::error::{Result, SupervisorError};

#[cfg(unix)]
use nix::sys::signal::{Signal as NixSignal, kill as nix_kill};
#[cfg(unix)]
use nix::unistd::Pid;

/// Observable lifecycle state of the invoker daemon.
///
/// ```text
/// Unstarted → Starting → Running → Stopped
///                    ↓
///                 Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Nothing has happened yet.
    Unstarted,
    /// Bundled daemon spawned, settle interval not yet elapsed.
    Starting,
    /// Daemon verified reachable; tests may execute.
    Running,
    /// Bundled daemon stopped after teardown.
    Stopped,
    /// Daemon failed to become ready. Terminal; the run must not proceed.
    Aborted,
}

/// Supervises the invoker daemon for the duration of one run.
pub struct Supervisor {
    mode: DaemonMode,
    daemon_binary: PathBuf,
    daemon_args: Vec<String>,
    socket_path: PathBuf,
    pid_path: PathBuf,
    settle: Duration,
    state: DaemonState,
    child: Option<Child>,
    marker_removed: bool,
}

impl Supervisor {
    /// Creates a supervisor from the harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            mode: config.mode,
            daemon_binary: config.daemon_binary.clone(),
            daemon_args: config.daemon_args.clone(),
            socket_path: config.socket_path.clone(),
            pid_path: config.pid_path.clone(),
            settle: config.settle(),
            state: DaemonState::Unstarted,
            child: None,
            marker_removed: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DaemonState {
        self.state
    }

    /// Returns true once the daemon has been verified reachable.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, DaemonState::Running)
    }

    /// Brings the daemon to the `Running` state, or aborts the run.
    ///
    /// External mode only checks that the readiness marker (the daemon's
    /// listening socket) exists. Bundled mode stops any stale instance,
    /// spawns the daemon, waits out the settle interval and verifies the
    /// child is still alive.
    ///
    /// # Errors
    /// Any error here is fatal to the run; zero tests execute.
    pub async fn ensure_ready(&mut self) -> Result<()> {
        if self.state != DaemonState::Unstarted {
            return Err(SupervisorError::State(format!(
                "ensure_ready called in state {:?}",
                self.state
            )));
        }

        match self.mode {
            DaemonMode::External => self.check_marker(),
            DaemonMode::Bundled => self.spawn_and_settle().await,
        }
    }

    fn check_marker(&mut self) -> Result<()> {
        if self.socket_path.exists() {
            tracing::info!(marker = %self.socket_path.display(), "invoker daemon is reachable");
            self.state = DaemonState::Running;
            Ok(())
        } else {
            self.state = DaemonState::Aborted;
            Err(SupervisorError::NotReady(self.socket_path.clone()))
        }
    }

    async fn spawn_and_settle(&mut self) -> Result<()> {
        self.stop_stale()?;
        self.state = DaemonState::Starting;

        let spawned = Command::new(&self.daemon_binary)
            .args(&self.daemon_args)
            .stdin(std::process::Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                self.state = DaemonState::Aborted;
                return Err(SupervisorError::Spawn(format!(
                    "{}: {e}",
                    self.daemon_binary.display()
                )));
            }
        };

        tracing::info!(
            pid = child.id(),
            binary = %self.daemon_binary.display(),
            settle_ms = self.settle.as_millis() as u64,
            "spawned invoker daemon, settling"
        );

        tokio::time::sleep(self.settle).await;

        // A daemon that died while settling means every downstream result
        // would be meaningless.
        match child.try_wait()? {
            Some(status) => {
                self.state = DaemonState::Aborted;
                Err(SupervisorError::ExitedEarly { status: status.code() })
            }
            None => {
                self.child = Some(child);
                self.state = DaemonState::Running;
                Ok(())
            }
        }
    }

    /// Issues a stop request against a stale instance recorded in the pid
    /// file, then clears the file so the slot is free.
    fn stop_stale(&mut self) -> Result<()> {
        if !self.pid_path.exists() {
            return Ok(());
        }
        let raw = std::fs::read_to_string(&self.pid_path)?;
        match raw.trim().parse::<i32>() {
            Ok(pid) => {
                tracing::warn!(pid, marker = %self.pid_path.display(), "stopping stale invoker daemon");
                signal_pid(pid)?;
            }
            Err(_) => {
                tracing::warn!(marker = %self.pid_path.display(), "stale pid file is unreadable, removing");
            }
        }
        std::fs::remove_file(&self.pid_path)?;
        Ok(())
    }

    /// Stops the bundled daemon (if still running) and removes the lifecycle
    /// marker. External mode performs no teardown.
    ///
    /// Idempotent: the marker is removed exactly once per run no matter how
    /// the tests went; a second call is a no-op.
    pub async fn teardown(&mut self) -> Result<()> {
        if self.mode == DaemonMode::External {
            return Ok(());
        }

        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                stop_child(&mut child)?;
            }
            let status = child.wait().await?;
            tracing::info!(status = ?status.code(), "invoker daemon stopped");
            self.state = DaemonState::Stopped;
        }

        if !self.marker_removed {
            match std::fs::remove_file(&self.pid_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            self.marker_removed = true;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn stop_child(child: &mut Child) -> Result<()> {
    match child.id().map(i32::try_from) {
        Some(Ok(pid)) => signal_pid(pid),
        // Already reaped, or a pid outside the i32 range (cannot happen on
        // Linux, where pid_max caps well below it).
        Some(Err(_)) | None => Ok(()),
    }
}

#[cfg(not(unix))]
fn stop_child(child: &mut Child) -> Result<()> {
    child
        .start_kill()
        .map_err(|e| SupervisorError::Stop(e.to_string()))
}

#[cfg(unix)]
fn signal_pid(pid: i32) -> Result<()> {
    match nix_kill(Pid::from_raw(pid), NixSignal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(SupervisorError::Stop(format!(
            "kill({pid}, SIGTERM) failed: {e}"
        ))),
    }
}

#[cfg(not(unix))]
fn signal_pid(_pid: i32) -> Result<()> {
    Ok(())
}
