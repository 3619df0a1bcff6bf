//! # sboxcheck-core
//!
//! Test-case model and catalog generation for the sboxcheck conformance
//! harness.
//!
//! This crate provides:
//! - **Catalog generation**: table-driven enumeration of boundary cases
//!   across every resource-limit axis the invoker daemon enforces
//! - **Result model**: test cases, verdicts and the order-independent run
//!   aggregate
//! - **Argv quoting**: reversible shell-style rendering of test identities
//! - **Configuration**: harness settings with TOML overrides

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod quote;
pub mod types;

pub use catalog::{CatalogParams, SignalExpectation};
pub use config::{DaemonMode, HarnessConfig};
pub use error::{CoreError, Result};
pub use quote::{format_argv, parse_argv};
pub use types::{INVOKER_TOKEN, RunSummary, TestCase, TestResult, Verdict};
