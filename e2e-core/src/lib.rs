//! Core shared library for the e2e CI tooling.
//!
//! This crate exposes the primitives the rule engine and its entry points
//! depend on: common errors, CI environment configuration, the settings
//! handed to the external test runner and logging setup.

pub mod config;
pub mod errors;
pub mod job_spec;
pub mod logging;
pub mod runner;

pub use config::CiConfig;
pub use errors::{ConfigError, CoreError, Result as CoreResult};
pub use job_spec::{OpenshiftJobSpec, Pull, Refs};
pub use runner::TestRunnerConfig;
