//! # sboxcheck-daemon
//!
//! Lifecycle supervision for the invoker daemon under test.
//!
//! This crate provides:
//! - **Supervisor**: brings the daemon to a verified `Running` state before
//!   any test executes, and tears it down afterwards
//! - **Bundled mode**: spawn, settle, verify alive, stop, clear the
//!   lifecycle marker
//! - **External mode**: readiness-marker check only; the daemon is owned by
//!   someone else

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod supervisor;

pub use error::{Result, SupervisorError};
pub use supervisor::{DaemonState, Supervisor};
