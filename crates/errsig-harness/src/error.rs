//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture JSON: {0}")]
    FixtureJson(#[from] serde_json::Error),
    #[error("unsupported fixture function '{0}'")]
    UnsupportedFunction(String),
    #[error("{function}: input '{field}' is missing or malformed")]
    BadInput {
        function: String,
        field: &'static str,
    },
    #[error("scenario thread panicked: {0}")]
    ScenarioPanicked(String),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
