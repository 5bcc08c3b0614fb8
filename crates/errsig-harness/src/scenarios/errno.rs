//! Thread-local errno inspection around a failing `fopen`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use errsig_core::errno::get_errno;
use errsig_core::stdio::fopen;
use errsig_core::string::strerror;

use crate::HarnessError;

/// File the walkthrough tries to open; it is not expected to exist.
pub const DEFAULT_MISSING_PATH: &str = "NON_existing_file.txt";

/// errno value plus its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrnoSnapshot {
    pub value: i32,
    pub message: String,
}

impl ErrnoSnapshot {
    fn capture() -> Self {
        let value = get_errno();
        Self {
            value,
            message: strerror(value).into_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrnoReport {
    pub path: PathBuf,
    pub at_startup: ErrnoSnapshot,
    /// `None` when the open unexpectedly succeeded.
    pub after_failed_open: Option<ErrnoSnapshot>,
}

impl ErrnoReport {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "At startup: value={}, string={}",
            self.at_startup.value, self.at_startup.message
        )];
        match &self.after_failed_open {
            Some(snap) => lines.push(format!(
                "After fopen fails: value={}, string={}",
                snap.value, snap.message
            )),
            None => lines.push(format!("fopen succeeded: {}", self.path.display())),
        }
        lines
    }
}

/// Reads errno on a fresh thread, opens `path` read-only, and reads errno
/// again if the open failed.
///
/// The fresh thread guarantees the startup reading is the initial value
/// rather than whatever the caller's thread accumulated.
pub fn run_errno(path: &Path) -> Result<ErrnoReport, HarnessError> {
    let path = path.to_path_buf();
    std::thread::spawn(move || {
        let at_startup = ErrnoSnapshot::capture();
        let after_failed_open = match fopen(&path, "r") {
            Some(_file) => None,
            None => Some(ErrnoSnapshot::capture()),
        };
        ErrnoReport {
            path,
            at_startup,
            after_failed_open,
        }
    })
    .join()
    .map_err(|payload| {
        let msg = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        HarnessError::ScenarioPanicked(msg)
    })
}
