//! sboxcheck CLI.
//!
//! # Usage
//!
//! ```bash
//! # Validate against an externally supervised daemon (default)
//! sboxcheck
//!
//! # Let the harness own the daemon lifecycle
//! sboxcheck --use-bundled
//!
//! # Pool-bounded execution with 8 workers
//! sboxcheck --jobs 8
//! ```
//!
//! Exit status: 0 if every mandatory case passed, 1 if any mandatory case
//! failed or the daemon never became ready.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use sboxcheck::prelude::*;

fn print_usage() {
    println!("Usage: sboxcheck [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --use-bundled       Spawn and own the invoker daemon (default: external)");
    println!("  --jobs <N>          Worker pool size, 1 = sequential (default: 1)");
    println!("  --validators <DIR>  Directory holding the validator binaries");
    println!("  --config <PATH>     TOML config overriding the built-in defaults");
    println!("  --no-color          Disable ANSI colors in the report");
    println!("  --help              Show this help");
}

fn parse_args(args: &[String]) -> Result<Option<HarnessConfig>> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(None);
    }

    // The config file is the baseline; explicit flags override it.
    let mut config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .map(PathBuf::from)
                .context("--config requires a value")?;
            HarnessConfig::load(&path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => HarnessConfig::default(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--use-bundled" => config.mode = DaemonMode::Bundled,
            "--no-color" => config.color = false,
            "--jobs" => {
                let value = iter.next().context("--jobs requires a value")?;
                config.concurrency = value
                    .parse()
                    .with_context(|| format!("invalid --jobs value: {value}"))?;
            }
            "--validators" => {
                let value = iter.next().context("--validators requires a value")?;
                config.catalog.validators_dir = PathBuf::from(value);
            }
            "--config" => {
                // Already applied above.
                iter.next();
            }
            other => bail!("unknown argument: {other} (try --help)"),
        }
    }

    config.validate().context("invalid configuration")?;
    Ok(Some(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(config) = parse_args(&args)? else {
        return Ok(());
    };

    let mut runner = Runner::new(
        config.clone(),
        Arc::new(ProcessOracle::new()),
        Reporter::stdout(config.color),
    );

    match runner.run().await {
        Ok(summary) => std::process::exit(summary.exit_code()),
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("sboxcheck")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults_to_external_sequential() {
        let config = parse_args(&args(&[])).expect("parse").expect("config");
        assert_eq!(config.mode, DaemonMode::External);
        assert_eq!(config.concurrency, 1);
        assert!(config.color);
    }

    #[test]
    fn test_use_bundled_flag() {
        let config = parse_args(&args(&["--use-bundled"]))
            .expect("parse")
            .expect("config");
        assert_eq!(config.mode, DaemonMode::Bundled);
    }

    #[test]
    fn test_jobs_and_validators() {
        let config = parse_args(&args(&["--jobs", "8", "--validators", "/opt/validators"]))
            .expect("parse")
            .expect("config");
        assert_eq!(config.concurrency, 8);
        assert_eq!(
            config.catalog.validators_dir,
            PathBuf::from("/opt/validators")
        );
    }

    #[test]
    fn test_invalid_jobs_rejected() {
        assert!(parse_args(&args(&["--jobs", "zero"])).is_err());
        assert!(parse_args(&args(&["--jobs", "0"])).is_err());
        assert!(parse_args(&args(&["--jobs"])).is_err());
    }

    #[test]
    fn test_config_file_baseline_with_flag_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("harness.toml");
        std::fs::write(&path, "mode = \"bundled\"\nconcurrency = 2\n").expect("write config");

        let config = parse_args(&args(&[
            "--config",
            path.to_str().expect("utf-8 path"),
            "--jobs",
            "4",
        ]))
        .expect("parse")
        .expect("config");
        assert_eq!(config.mode, DaemonMode::Bundled);
        // Explicit flags win over the file.
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn test_help_short_circuits() {
        let parsed = parse_args(&args(&["--help"])).expect("parse");
        assert!(parsed.is_none());
    }
}
