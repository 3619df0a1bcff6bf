//! # sboxcheck-run
//!
//! Execution and reporting engine for the sboxcheck conformance harness.
//!
//! This crate provides:
//! - **Oracle**: spawns validator binaries and captures their verdicts
//! - **Reporter**: serialized, colorized per-case console output
//! - **Runner**: the run state machine gluing daemon readiness, catalog
//!   dispatch and teardown together

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod report;
pub mod runner;

pub use error::{Result, RunError};
pub use executor::{Oracle, ProcessOracle};
pub use report::Reporter;
pub use runner::{RunPhase, Runner};
