//! Catalog generation: the full, ordered set of boundary-condition cases.
//!
//! Generation is a pure transformation from [`CatalogParams`] to a
//! `Vec<TestCase>`; no I/O happens here. Each resource-limit axis has its own
//! generation function so it can be audited and tested in isolation, and
//! cross products go through an explicit helper instead of ad-hoc nested
//! loops.
//!
//! The mandatory/optional split encodes a policy, not a correctness rule:
//! coarse tolerances must always hold ("usage is in the right ballpark"),
//! tight tolerances are timing-sensitive and environment-dependent, so their
//! failures are reported without failing the run. The band boundaries are
//! plain config values because the right cut depends on the target
//! environment's scheduling jitter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{INVOKER_TOKEN, TestCase};

/// Validator binary asserting exit-code propagation.
pub const VALIDATOR_EXIT_CODE: &str = "test_exit_code";
/// Validator binary asserting termination-signal classification.
pub const VALIDATOR_TERM_SIGNAL: &str = "test_term_signal";
/// Validator binary asserting CPU-time limit enforcement.
pub const VALIDATOR_TIME_LIMIT: &str = "test_time_limit";
/// Validator binary asserting wall-clock limit enforcement.
pub const VALIDATOR_WALL_TIME_LIMIT: &str = "test_wall_time_limit";
/// Validator binary asserting memory limit enforcement.
pub const VALIDATOR_MEMORY_LIMIT: &str = "test_memory_limit";
/// Validator binary asserting CPU-time usage reporting accuracy.
pub const VALIDATOR_TIME_USAGE: &str = "test_time_usage";
/// Validator binary asserting wall-clock usage reporting accuracy.
pub const VALIDATOR_WALL_TIME_USAGE: &str = "test_wall_time_usage";
/// Validator binary asserting memory usage reporting accuracy.
pub const VALIDATOR_MEMORY_USAGE: &str = "test_memory_usage";

/// Expected classification for a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalExpectation {
    /// The daemon must classify the run as killed by the signal.
    Terminated,
    /// The daemon must classify the run as a normal exit: the signal is
    /// delivered but not fatal for an ordinary process, and delivery alone
    /// must not be mistaken for termination.
    Exited,
}

impl SignalExpectation {
    /// The token passed to the term-signal validator.
    #[must_use]
    pub const fn as_token(&self) -> &'static str {
        match self {
            Self::Terminated => "terminated",
            Self::Exited => "exited",
        }
    }
}

#[cfg(unix)]
fn default_terminating_signals() -> Vec<i32> {
    use nix::sys::signal::Signal::*;
    [
        SIGABRT, SIGALRM, SIGFPE, SIGILL, SIGINT, SIGKILL, SIGPIPE, SIGIO, SIGPROF, SIGQUIT,
        SIGSEGV, SIGSYS, SIGTERM, SIGTRAP, SIGUSR1, SIGUSR2, SIGVTALRM, SIGXCPU, SIGXFSZ,
    ]
    .iter()
    .map(|s| *s as i32)
    .collect()
}

#[cfg(unix)]
fn default_ignorable_signals() -> Vec<i32> {
    use nix::sys::signal::Signal::*;
    [SIGCHLD, SIGURG].iter().map(|s| *s as i32).collect()
}

// Without POSIX signals there is no signal axis to probe.
#[cfg(not(unix))]
fn default_terminating_signals() -> Vec<i32> {
    Vec::new()
}

#[cfg(not(unix))]
fn default_ignorable_signals() -> Vec<i32> {
    Vec::new()
}

fn default_validators_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_exit_codes() -> Vec<u8> {
    (0..=255).collect()
}

fn default_limits_ms() -> Vec<u64> {
    vec![500, 1000, 2000]
}

fn default_memory_limits_kb() -> Vec<u64> {
    vec![65536, 131072, 262144]
}

fn default_usage_targets_ms() -> Vec<u64> {
    vec![200, 500, 1000]
}

fn default_usage_deltas_mandatory_ms() -> Vec<u64> {
    vec![100, 50, 25]
}

fn default_usage_deltas_optional_ms() -> Vec<u64> {
    vec![15, 10, 5, 3, 2, 1, 0]
}

fn default_memory_deltas_mandatory_kb() -> Vec<u64> {
    vec![16384]
}

fn default_memory_deltas_optional_kb() -> Vec<u64> {
    vec![4096, 1024, 256]
}

/// Parameter tables driving catalog generation.
///
/// Defaults are the reference tables; every value can be overridden via the
/// harness config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogParams {
    /// Directory holding the validator binaries.
    #[serde(default = "default_validators_dir")]
    pub validators_dir: PathBuf,

    /// Exit codes to probe, one mandatory case each.
    #[serde(default = "default_exit_codes")]
    pub exit_codes: Vec<u8>,

    /// Signals whose delivery must be classified as "terminated".
    #[serde(default = "default_terminating_signals")]
    pub terminating_signals: Vec<i32>,

    /// Signals whose delivery must be classified as "exited".
    #[serde(default = "default_ignorable_signals")]
    pub ignorable_signals: Vec<i32>,

    /// CPU-time limits to probe, in milliseconds.
    #[serde(default = "default_limits_ms")]
    pub time_limits_ms: Vec<u64>,

    /// Wall-clock limits to probe, in milliseconds.
    #[serde(default = "default_limits_ms")]
    pub wall_time_limits_ms: Vec<u64>,

    /// Memory ceilings to probe, in kilobytes.
    #[serde(default = "default_memory_limits_kb")]
    pub memory_limits_kb: Vec<u64>,

    /// Target CPU/wall usage values for the usage-accuracy axes.
    #[serde(default = "default_usage_targets_ms")]
    pub time_usage_targets_ms: Vec<u64>,

    /// Usage tolerance deltas that must always hold.
    #[serde(default = "default_usage_deltas_mandatory_ms")]
    pub usage_deltas_mandatory_ms: Vec<u64>,

    /// Tight usage tolerance deltas, reported as non-blocking.
    #[serde(default = "default_usage_deltas_optional_ms")]
    pub usage_deltas_optional_ms: Vec<u64>,

    /// Memory-usage probe granularities that must always hold.
    #[serde(default = "default_memory_deltas_mandatory_kb")]
    pub memory_deltas_mandatory_kb: Vec<u64>,

    /// Fine memory-usage probe granularities, reported as non-blocking.
    #[serde(default = "default_memory_deltas_optional_kb")]
    pub memory_deltas_optional_kb: Vec<u64>,
}

impl Default for CatalogParams {
    fn default() -> Self {
        Self {
            validators_dir: default_validators_dir(),
            exit_codes: default_exit_codes(),
            terminating_signals: default_terminating_signals(),
            ignorable_signals: default_ignorable_signals(),
            time_limits_ms: default_limits_ms(),
            wall_time_limits_ms: default_limits_ms(),
            memory_limits_kb: default_memory_limits_kb(),
            time_usage_targets_ms: default_usage_targets_ms(),
            usage_deltas_mandatory_ms: default_usage_deltas_mandatory_ms(),
            usage_deltas_optional_ms: default_usage_deltas_optional_ms(),
            memory_deltas_mandatory_kb: default_memory_deltas_mandatory_kb(),
            memory_deltas_optional_kb: default_memory_deltas_optional_kb(),
        }
    }
}

impl CatalogParams {
    /// Validates the parameter tables.
    ///
    /// # Errors
    /// Returns an error if the signal sets overlap or a table the catalog
    /// depends on is empty.
    pub fn validate(&self) -> Result<()> {
        if let Some(sig) = self
            .terminating_signals
            .iter()
            .find(|s| self.ignorable_signals.contains(s))
        {
            return Err(CoreError::config(format!(
                "signal {sig} appears in both the terminating and ignorable sets"
            )));
        }
        if self.exit_codes.is_empty() {
            return Err(CoreError::config("exit_codes cannot be empty"));
        }
        if self.time_usage_targets_ms.is_empty() {
            return Err(CoreError::config("time_usage_targets_ms cannot be empty"));
        }
        if self.usage_deltas_mandatory_ms.is_empty() {
            return Err(CoreError::config(
                "usage_deltas_mandatory_ms cannot be empty",
            ));
        }
        if self.memory_deltas_mandatory_kb.is_empty() {
            return Err(CoreError::config(
                "memory_deltas_mandatory_kb cannot be empty",
            ));
        }
        Ok(())
    }

    fn validator(&self, name: &str) -> String {
        self.validators_dir.join(name).to_string_lossy().into_owned()
    }

    fn case(&self, validator: &str, params: &[String]) -> TestCase {
        let mut argv = vec![self.validator(validator), INVOKER_TOKEN.to_string()];
        argv.extend_from_slice(params);
        TestCase::new(argv)
    }

    fn optional_case(&self, validator: &str, params: &[String]) -> TestCase {
        let mut argv = vec![self.validator(validator), INVOKER_TOKEN.to_string()];
        argv.extend_from_slice(params);
        TestCase::optional(argv)
    }

    /// One mandatory case per configured exit code.
    #[must_use]
    pub fn exit_code_cases(&self) -> Vec<TestCase> {
        self.exit_codes
            .iter()
            .map(|code| self.case(VALIDATOR_EXIT_CODE, &[code.to_string()]))
            .collect()
    }

    /// One mandatory case per signal: terminating signals must be classified
    /// as "terminated", ignorable ones as "exited".
    #[must_use]
    pub fn term_signal_cases(&self) -> Vec<TestCase> {
        let expectations = self
            .terminating_signals
            .iter()
            .map(|sig| (*sig, SignalExpectation::Terminated))
            .chain(
                self.ignorable_signals
                    .iter()
                    .map(|sig| (*sig, SignalExpectation::Exited)),
            );
        expectations
            .map(|(sig, expected)| {
                self.case(
                    VALIDATOR_TERM_SIGNAL,
                    &[sig.to_string(), expected.as_token().to_string()],
                )
            })
            .collect()
    }

    /// One mandatory case per CPU-time limit value.
    #[must_use]
    pub fn time_limit_cases(&self) -> Vec<TestCase> {
        self.time_limits_ms
            .iter()
            .map(|ms| self.case(VALIDATOR_TIME_LIMIT, &[ms.to_string()]))
            .collect()
    }

    /// One mandatory case per wall-clock limit value.
    #[must_use]
    pub fn wall_time_limit_cases(&self) -> Vec<TestCase> {
        self.wall_time_limits_ms
            .iter()
            .map(|ms| self.case(VALIDATOR_WALL_TIME_LIMIT, &[ms.to_string()]))
            .collect()
    }

    /// One mandatory case per memory ceiling.
    #[must_use]
    pub fn memory_limit_cases(&self) -> Vec<TestCase> {
        self.memory_limits_kb
            .iter()
            .map(|kb| self.case(VALIDATOR_MEMORY_LIMIT, &[kb.to_string()]))
            .collect()
    }

    /// CPU-time usage accuracy: targets crossed with tolerance deltas.
    #[must_use]
    pub fn time_usage_cases(&self) -> Vec<TestCase> {
        self.usage_cases(VALIDATOR_TIME_USAGE)
    }

    /// Wall-clock usage accuracy: targets crossed with tolerance deltas.
    #[must_use]
    pub fn wall_time_usage_cases(&self) -> Vec<TestCase> {
        self.usage_cases(VALIDATOR_WALL_TIME_USAGE)
    }

    fn usage_cases(&self, validator: &str) -> Vec<TestCase> {
        let mut cases = Vec::new();
        for (target, delta) in cross(&self.time_usage_targets_ms, &self.usage_deltas_mandatory_ms)
        {
            cases.push(self.case(validator, &[target.to_string(), delta.to_string()]));
        }
        for (target, delta) in cross(&self.time_usage_targets_ms, &self.usage_deltas_optional_ms) {
            cases.push(self.optional_case(validator, &[target.to_string(), delta.to_string()]));
        }
        cases
    }

    /// Memory usage accuracy: per memory ceiling, probes at decreasing
    /// granularity; only the coarse probes are mandatory.
    #[must_use]
    pub fn memory_usage_cases(&self) -> Vec<TestCase> {
        let mut cases = Vec::new();
        for (limit, delta) in cross(&self.memory_limits_kb, &self.memory_deltas_mandatory_kb) {
            cases.push(self.case(
                VALIDATOR_MEMORY_USAGE,
                &[limit.to_string(), delta.to_string()],
            ));
        }
        for (limit, delta) in cross(&self.memory_limits_kb, &self.memory_deltas_optional_kb) {
            cases.push(self.optional_case(
                VALIDATOR_MEMORY_USAGE,
                &[limit.to_string(), delta.to_string()],
            ));
        }
        cases
    }

    /// Generates the full ordered catalog, axis by axis.
    #[must_use]
    pub fn generate(&self) -> Vec<TestCase> {
        let mut catalog = self.exit_code_cases();
        catalog.extend(self.term_signal_cases());
        catalog.extend(self.time_limit_cases());
        catalog.extend(self.wall_time_limit_cases());
        catalog.extend(self.memory_limit_cases());
        catalog.extend(self.time_usage_cases());
        catalog.extend(self.wall_time_usage_cases());
        catalog.extend(self.memory_usage_cases());
        catalog
    }
}

/// Explicit cross product of two parameter tables, left table outermost.
fn cross<'a, A, B>(left: &'a [A], right: &'a [B]) -> impl Iterator<Item = (&'a A, &'a B)> {
    left.iter()
        .flat_map(move |a| right.iter().map(move |b| (a, b)))
}
