//! Conformance harness for envtap.
//!
//! This crate provides:
//! - Fixture schema: JSON cases describing an environment vector, a query
//!   name, a rewrite mode, and the expected observation
//! - Runner: executes cases against the pure core interceptor
//! - Report generation: machine-readable results with a fixture digest

#![forbid(unsafe_code)]

pub mod fixtures;
pub mod report;
pub mod runner;

pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::{TestRunner, VerificationResult};
