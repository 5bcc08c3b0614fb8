//! The three error-signaling walkthroughs.
//!
//! Each scenario returns a report instead of printing, so the CLI, the
//! fixture runner and the tests all observe the same data. `report.lines()`
//! is what the walkthrough prints, in order.

pub mod errno;
pub mod escape;
pub mod strtol;

use std::cell::RefCell;

pub use errno::{ErrnoReport, run_errno};
pub use escape::{EscapeReport, Flavor, run_escape};
pub use strtol::{ParseReport, run_strtol, source_strtol_cases};

/// Lines printed by code deep inside a scenario, collected in order.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: RefCell<Vec<String>>,
}

impl Transcript {
    pub fn note(&self, line: impl Into<String>) {
        self.lines.borrow_mut().push(line.into());
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines.into_inner()
    }
}
