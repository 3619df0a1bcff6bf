//! Run orchestration: daemon readiness, catalog dispatch, teardown, verdict.
//!
//! The run proceeds through a fixed sequence of phases. Only two outcomes
//! exist: `Reported` with a summary, or `Aborted` when the daemon never
//! became ready. A failing case never blocks later cases and there is no
//! cancellation path; once dispatch starts, every case runs to completion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use sboxcheck_core::{HarnessConfig, RunSummary, TestCase, TestResult};
use sboxcheck_daemon::Supervisor;

use crate::error::Result;
use crate::executor::Oracle;
use crate::report::Reporter;

/// Top-level run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing started yet.
    Idle,
    /// Bringing the daemon to a ready state.
    DaemonStarting,
    /// Daemon verified reachable.
    DaemonReady,
    /// Catalog dispatch in progress.
    Executing,
    /// All results recorded, stopping a bundled daemon.
    DaemonTeardown,
    /// Terminal: banner printed, summary available.
    Reported,
    /// Terminal: daemon never became ready, zero tests executed.
    Aborted,
}

/// Orchestrates one complete conformance run.
pub struct Runner {
    config: HarnessConfig,
    oracle: Arc<dyn Oracle>,
    reporter: Arc<Reporter>,
    phase: RunPhase,
}

impl Runner {
    /// Creates a runner over the given oracle and reporter.
    #[must_use]
    pub fn new(config: HarnessConfig, oracle: Arc<dyn Oracle>, reporter: Reporter) -> Self {
        Self {
            config,
            oracle,
            reporter: Arc::new(reporter),
            phase: RunPhase::Idle,
        }
    }

    /// Current run phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Executes the full catalog against a ready daemon.
    ///
    /// # Errors
    /// Returns an error only if the daemon fails to become ready (zero
    /// per-case lines printed). Once dispatch starts, nothing aborts the
    /// run: a crashed worker is recorded as that case's failure, and a
    /// teardown error is logged without suppressing the verdict.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.phase = RunPhase::DaemonStarting;
        let mut supervisor = Supervisor::from_config(&self.config);
        if let Err(e) = supervisor.ensure_ready().await {
            self.phase = RunPhase::Aborted;
            return Err(e.into());
        }
        self.phase = RunPhase::DaemonReady;

        let catalog = self.config.catalog.generate();
        tracing::info!(
            cases = catalog.len(),
            concurrency = self.config.concurrency,
            "daemon ready, dispatching catalog"
        );

        self.phase = RunPhase::Executing;
        let results = if self.config.concurrency <= 1 {
            self.execute_sequential(catalog).await
        } else {
            self.execute_pool(catalog).await
        };

        // Teardown always runs once cases have executed; a bundled daemon
        // must never outlive the run and the lifecycle marker is cleared
        // here regardless of how the tests went.
        self.phase = RunPhase::DaemonTeardown;
        if let Err(e) = supervisor.teardown().await {
            tracing::warn!(error = %e, "daemon teardown failed");
        }

        let summary = RunSummary::fold(&results);
        self.reporter.finish(&summary);
        self.phase = RunPhase::Reported;
        Ok(summary)
    }

    /// Conservative default: one validator at a time, results in catalog
    /// order. Avoids resource contention skewing timing-sensitive cases.
    async fn execute_sequential(&self, catalog: Vec<TestCase>) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(catalog.len());
        for case in catalog {
            let result = self.oracle.execute(case).await;
            self.reporter.report(&result);
            results.push(result);
        }
        results
    }

    /// Pool-bounded dispatch. Identical correctness at any degree; only
    /// wall-clock duration and the noise level of optional timing cases
    /// change.
    async fn execute_pool(&self, catalog: Vec<TestCase>) -> Vec<TestResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut workers = JoinSet::new();
        let mut dispatched: HashMap<tokio::task::Id, TestCase> =
            HashMap::with_capacity(catalog.len());
        for case in catalog {
            let semaphore = Arc::clone(&semaphore);
            let oracle = Arc::clone(&self.oracle);
            let reporter = Arc::clone(&self.reporter);
            let worker_case = case.clone();
            let handle = workers.spawn(async move {
                // The semaphore is never closed, so the permit is always
                // granted; it bounds the number of live validator processes.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = oracle.execute(worker_case).await;
                reporter.report(&result);
                result
            });
            dispatched.insert(handle.id(), case);
        }

        // Join barrier: teardown must not begin until every dispatched
        // case's result has been recorded. A crashed worker yields a
        // failure result for its case instead of aborting the catalog.
        let mut results = Vec::with_capacity(dispatched.len());
        while let Some(joined) = workers.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    dispatched.remove(&id);
                    results.push(result);
                }
                Err(e) => {
                    if let Some(case) = dispatched.remove(&e.id()) {
                        let result = TestResult::from_outcome(
                            case,
                            None,
                            format!("validator worker crashed: {e}"),
                        );
                        self.reporter.report(&result);
                        results.push(result);
                    }
                }
            }
        }
        results
    }
}
