//! Core types for the conformance run: test cases, verdicts, results and the
//! run aggregate.
//!
//! A `TestCase` is created once by the catalog generator, executed once and
//! never mutated. The run aggregate is a pure fold over the recorded results,
//! so it is independent of the order in which concurrent workers finish.

use serde::{Deserialize, Serialize};

/// The literal token validators expect as their first argument, naming the
/// daemon under test as the execution backend.
pub const INVOKER_TOKEN: &str = "invoker";

/// A single conformance scenario: one validator invocation.
///
/// `argv[0]` is the validator binary path, `argv[1]` is [`INVOKER_TOKEN`],
/// the remaining elements are scenario parameters. The argv is always at
/// least two elements long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Full command line of the validator invocation.
    pub argv: Vec<String>,
    /// Optional cases report failures without failing the overall run.
    ///
    /// Reserved for inherently timing/precision-sensitive assertions, where
    /// a failure indicates environmental jitter rather than a regression.
    pub optional: bool,
}

impl TestCase {
    /// Creates a mandatory test case.
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        debug_assert!(argv.len() >= 2, "test case argv must name validator and invoker");
        Self { argv, optional: false }
    }

    /// Creates an optional (non-blocking) test case.
    #[must_use]
    pub fn optional(argv: Vec<String>) -> Self {
        debug_assert!(argv.len() >= 2, "test case argv must name validator and invoker");
        Self { argv, optional: true }
    }

    /// Returns the validator binary path.
    #[must_use]
    pub fn validator(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }
}

/// Classification of a single test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Validator exited 0: observed behavior matched the expectation.
    Pass,
    /// Mandatory validator exited non-zero. Fails the run.
    Fail,
    /// Optional validator exited non-zero. Reported but never fails the run.
    FailOptional,
}

impl Verdict {
    /// Derives a verdict from a validator exit code.
    ///
    /// `None` means the validator died without an exit code (killed by a
    /// signal) and is treated the same as a non-zero status.
    #[must_use]
    pub fn from_outcome(exit_code: Option<i32>, optional: bool) -> Self {
        match (exit_code, optional) {
            (Some(0), _) => Self::Pass,
            (_, false) => Self::Fail,
            (_, true) => Self::FailOptional,
        }
    }

    /// Returns true if this verdict fails the overall run.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

/// The outcome of executing one [`TestCase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// The case this result was produced for.
    pub case: TestCase,
    /// Observed exit code, `None` if the validator was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured stderr of the validator (expected-vs-observed diagnostics).
    pub diagnostics: String,
    /// Derived verdict.
    pub verdict: Verdict,
}

impl TestResult {
    /// Builds a result from a raw executor outcome, deriving the verdict.
    #[must_use]
    pub fn from_outcome(case: TestCase, exit_code: Option<i32>, diagnostics: String) -> Self {
        let verdict = Verdict::from_outcome(exit_code, case.optional);
        Self { case, exit_code, diagnostics, verdict }
    }
}

/// Aggregate over a complete run, computed once after the last result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total cases executed.
    pub total: usize,
    /// Cases with verdict [`Verdict::Pass`].
    pub passed: usize,
    /// Cases with verdict [`Verdict::Fail`].
    pub failed_mandatory: usize,
    /// Cases with verdict [`Verdict::FailOptional`].
    pub failed_optional: usize,
    /// True iff at least one mandatory case failed.
    pub failed: bool,
}

impl RunSummary {
    /// Folds a sequence of results into the run aggregate.
    ///
    /// The fold is order-independent: results may have been recorded in any
    /// order by concurrent workers.
    #[must_use]
    pub fn fold(results: &[TestResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            passed: 0,
            failed_mandatory: 0,
            failed_optional: 0,
            failed: false,
        };
        for result in results {
            match result.verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Fail => summary.failed_mandatory += 1,
                Verdict::FailOptional => summary.failed_optional += 1,
            }
            summary.failed |= result.verdict.is_blocking();
        }
        summary
    }

    /// Maps the run verdict to a process exit status.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.failed { 1 } else { 0 }
    }
}
