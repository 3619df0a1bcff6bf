//! sboxcheck: conformance-validation harness for the sboxd invoker daemon.
//!
//! The harness does not implement sandboxing itself. It verifies that an
//! externally built invoker daemon enforces resource limits correctly, by
//! generating an exhaustive catalog of boundary cases and running one
//! validator binary per case.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sboxcheck::prelude::*;
//!
//! # async fn run() -> Result<(), sboxcheck::run::RunError> {
//! let config = HarnessConfig::default();
//! let mut runner = Runner::new(
//!     config.clone(),
//!     Arc::new(ProcessOracle::new()),
//!     Reporter::stdout(config.color),
//! );
//! let summary = runner.run().await?;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

pub use sboxcheck_core as core;
pub use sboxcheck_daemon as daemon;
pub use sboxcheck_run as run;

/// Prelude module for common imports.
pub mod prelude {
    pub use sboxcheck_core::{
        CatalogParams, DaemonMode, HarnessConfig, RunSummary, TestCase, TestResult, Verdict,
    };
    pub use sboxcheck_daemon::{DaemonState, Supervisor};
    pub use sboxcheck_run::{Oracle, ProcessOracle, Reporter, RunPhase, Runner};
}
