//! Test execution: one validator child process per case.
//!
//! Validators are opaque oracles. Exit status 0 means the observed sandbox
//! behavior matched the declared expectation; anything else is a mismatch,
//! explained by the captured stderr. The executor relays status and text and
//! never interprets why a case failed.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use sboxcheck_core::{TestCase, TestResult};

/// Executes one test case and produces its result.
///
/// The seam exists so the orchestrator can be driven by a scripted oracle in
/// tests. Infrastructure problems (validator binary missing, not executable)
/// are folded into the result as a failure with diagnostics, never an error:
/// every dispatched case produces exactly one result.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Runs the case to completion and returns its result.
    async fn execute(&self, case: TestCase) -> TestResult;
}

/// Oracle that spawns `case.argv` as a child process and captures its
/// diagnostic stream.
#[derive(Debug, Default)]
pub struct ProcessOracle {
    _private: (),
}

impl ProcessOracle {
    /// Creates a new process oracle.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

#[async_trait]
impl Oracle for ProcessOracle {
    async fn execute(&self, case: TestCase) -> TestResult {
        let Some((program, args)) = case.argv.split_first() else {
            return TestResult::from_outcome(case, None, "empty argv".to_string());
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
                tracing::debug!(
                    validator = %case.validator(),
                    status = ?output.status.code(),
                    "validator finished"
                );
                TestResult::from_outcome(case, output.status.code(), diagnostics)
            }
            Err(e) => {
                let diagnostics = format!("failed to run validator {program}: {e}");
                tracing::debug!(validator = %case.validator(), error = %e, "validator did not run");
                TestResult::from_outcome(case, None, diagnostics)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sboxcheck_core::Verdict;

    fn case(argv: &[&str]) -> TestCase {
        TestCase::new(argv.iter().map(|s| (*s).to_string()).collect())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_passing_validator() {
        let oracle = ProcessOracle::new();
        let result = oracle.execute(case(&["/bin/sh", "-c", "exit 0"])).await;
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.diagnostics.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_validator_captures_stderr() {
        let oracle = ProcessOracle::new();
        let result = oracle
            .execute(case(&[
                "/bin/sh",
                "-c",
                "echo 'memory not enforced' >&2; exit 1",
            ]))
            .await;
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.diagnostics.contains("memory not enforced"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_killed_validator_has_no_exit_code() {
        let oracle = ProcessOracle::new();
        let result = oracle.execute(case(&["/bin/sh", "-c", "kill -9 $$"])).await;
        assert_eq!(result.exit_code, None);
        assert_eq!(result.verdict, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_missing_validator_is_a_case_failure() {
        let oracle = ProcessOracle::new();
        let result = oracle
            .execute(case(&["/no/such/validator", "invoker", "0"]))
            .await;
        assert_eq!(result.exit_code, None);
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.diagnostics.contains("failed to run validator"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_optional_case_failure_is_non_blocking() {
        let oracle = ProcessOracle::new();
        let optional = TestCase::optional(
            ["/bin/sh", "-c", "exit 1"].iter().map(|s| (*s).to_string()).collect(),
        );
        let result = oracle.execute(optional).await;
        assert_eq!(result.verdict, Verdict::FailOptional);
    }
}
