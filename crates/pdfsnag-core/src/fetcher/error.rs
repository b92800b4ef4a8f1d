//! Per-link fetch error.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single PDF download failed. Never aborts the run; the orchestrator
/// logs it and moves on to the next link.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported a transport error (timeout, connection refused, DNS, ...).
    #[error("transport: {0}")]
    Transport(#[source] curl::Error),
    /// Server answered with an error status (4xx/5xx).
    #[error("HTTP {code}")]
    Http { code: u32 },
    /// Creating the output directory or writing the file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status code, if the failure was an error response.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            FetchError::Http { code } => Some(*code),
            _ => None,
        }
    }
}
