//! Scenario runner and conformance harness for errsig.
//!
//! This crate provides:
//! - Scenarios: the three error-signaling walkthroughs (escape, strtol, errno)
//!   as data-returning functions the CLI prints and tests assert on
//! - Fixture verify: run JSON fixture sets against errsig-core
//! - Report generation: human-readable + machine-readable conformance reports
//! - Structured logging: JSONL events with schema validation

#![forbid(unsafe_code)]

pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;
