//! Console reporting with a serialized sink.
//!
//! Every result renders as exactly one line, written under a mutex so
//! concurrent workers never interleave partial lines. The test identity is
//! the reversible shell-quoted argv from [`sboxcheck_core::format_argv`].

use std::io::Write;

use parking_lot::Mutex;

use sboxcheck_core::{RunSummary, TestResult, Verdict, format_argv};

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[31;1m";
const YELLOW: &str = "\x1b[33;1m";
const RESET: &str = "\x1b[0m";

/// Serialized console reporter.
///
/// All emission goes through one mutex-guarded sink; the lock is held for
/// exactly one line (plus diagnostics for mandatory failures).
pub struct Reporter {
    sink: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl Reporter {
    /// Creates a reporter writing to the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn Write + Send>, color: bool) -> Self {
        Self { sink: Mutex::new(sink), color }
    }

    /// Creates a reporter writing to stdout.
    #[must_use]
    pub fn stdout(color: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), color)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Renders one result line as soon as the result is available.
    pub fn report(&self, result: &TestResult) {
        let identity = format_argv(&result.case.argv);
        let line = match result.verdict {
            Verdict::Pass => {
                format!("[ {} ] {identity}", self.paint(GREEN, "PASSED"))
            }
            Verdict::Fail => {
                format!(
                    "[ {} ] {identity}\n{}",
                    self.paint(RED, "FAILED"),
                    result.diagnostics
                )
            }
            // Diagnostics are omitted for non-blocking failures.
            Verdict::FailOptional => {
                format!("[ {} ] {identity}", self.paint(YELLOW, "FAILED"))
            }
        };
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{line}");
    }

    /// Prints the consolidated banner after the last result.
    pub fn finish(&self, summary: &RunSummary) {
        let banner = if summary.failed {
            self.paint(
                RED,
                &format!(
                    "{} of {} tests failed",
                    summary.failed_mandatory, summary.total
                ),
            )
        } else if summary.failed_optional > 0 {
            format!(
                "{} {}",
                self.paint(GREEN, &format!("all {} mandatory tests passed", summary.total)),
                self.paint(
                    YELLOW,
                    &format!(
                        "({} optional failures are non-blocking)",
                        summary.failed_optional
                    ),
                ),
            )
        } else {
            self.paint(GREEN, &format!("all {} tests passed", summary.total))
        };
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{banner}");
        let _ = sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sboxcheck_core::TestCase;

    /// In-memory sink shared with the test so output can be inspected.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn result(argv: &[&str], optional: bool, exit_code: Option<i32>, diag: &str) -> TestResult {
        let argv = argv.iter().map(|s| (*s).to_string()).collect();
        let case = if optional { TestCase::optional(argv) } else { TestCase::new(argv) };
        TestResult::from_outcome(case, exit_code, diag.to_string())
    }

    #[test]
    fn test_pass_line_format() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        reporter.report(&result(&["./test_exit_code", "invoker", "0"], false, Some(0), ""));
        assert_eq!(
            buf.contents(),
            "[ PASSED ] ./test_exit_code \"invoker\" \"0\"\n"
        );
    }

    #[test]
    fn test_mandatory_failure_includes_diagnostics() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        reporter.report(&result(
            &["./test_memory_limit", "invoker", "262144"],
            false,
            Some(1),
            "memory not enforced",
        ));
        assert_eq!(
            buf.contents(),
            "[ FAILED ] ./test_memory_limit \"invoker\" \"262144\"\nmemory not enforced\n"
        );
    }

    #[test]
    fn test_optional_failure_omits_diagnostics() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        reporter.report(&result(
            &["./test_time_usage", "invoker", "500", "1"],
            true,
            Some(1),
            "usage off by 3ms",
        ));
        assert_eq!(
            buf.contents(),
            "[ FAILED ] ./test_time_usage \"invoker\" \"500\" \"1\"\n"
        );
    }

    #[test]
    fn test_colors_wrap_only_the_tag() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), true);
        reporter.report(&result(&["./v", "invoker", "0"], false, Some(0), ""));
        let out = buf.contents();
        assert!(out.starts_with("[ \x1b[92mPASSED\x1b[0m ] "));
    }

    #[test]
    fn test_banner_failed() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        let results = vec![
            result(&["./v", "invoker", "0"], false, Some(0), ""),
            result(&["./v", "invoker", "1"], false, Some(1), "boom"),
        ];
        reporter.finish(&RunSummary::fold(&results));
        assert_eq!(buf.contents(), "1 of 2 tests failed\n");
    }

    #[test]
    fn test_banner_notes_optional_failures_are_non_blocking() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        let results = vec![
            result(&["./v", "invoker", "0"], false, Some(0), ""),
            result(&["./v", "invoker", "1"], true, Some(1), ""),
        ];
        reporter.finish(&RunSummary::fold(&results));
        assert_eq!(
            buf.contents(),
            "all 2 mandatory tests passed (1 optional failures are non-blocking)\n"
        );
    }

    #[test]
    fn test_banner_all_passed() {
        let buf = SharedBuf::default();
        let reporter = Reporter::new(Box::new(buf.clone()), false);
        let results = vec![result(&["./v", "invoker", "0"], false, Some(0), "")];
        reporter.finish(&RunSummary::fold(&results));
        assert_eq!(buf.contents(), "all 1 tests passed\n");
    }

    #[test]
    fn test_concurrent_lines_never_interleave() {
        let buf = SharedBuf::default();
        let reporter = Arc::new(Reporter::new(Box::new(buf.clone()), false));
        let mut handles = Vec::new();
        for i in 0..8 {
            let reporter = Arc::clone(&reporter);
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    reporter.report(&result(
                        &["./v", "invoker", &format!("{i}-{j}")],
                        false,
                        Some(0),
                        "",
                    ));
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker");
        }
        let out = buf.contents();
        assert_eq!(out.lines().count(), 400);
        for line in out.lines() {
            assert!(line.starts_with("[ PASSED ] ./v "));
        }
    }
}
