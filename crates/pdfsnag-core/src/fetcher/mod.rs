//! Single-stream PDF fetcher.
//!
//! One blocking GET per link via libcurl. The body is streamed to a `.part`
//! file in 8 KiB chunks and renamed into place when the transfer completes.
//! A file already present under the target name counts as success and no
//! request is made.

mod error;

pub use error::FetchError;

use crate::storage::PartFile;
use crate::url_model::resolve_filename;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Receive buffer size; curl hands the body to us in chunks of at most this many bytes.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Transport settings for the PDF GETs.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Upper bound for a whole transfer.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Successful result of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The body was written to `filename` in the target directory.
    Downloaded { filename: String, bytes: u64 },
    /// A file with the target name already existed; nothing was fetched.
    AlreadyPresent { filename: String },
}

impl FetchOutcome {
    pub fn filename(&self) -> &str {
        match self {
            FetchOutcome::Downloaded { filename, .. } | FetchOutcome::AlreadyPresent { filename } => {
                filename
            }
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Downloaded { filename, bytes } => {
                write!(f, "downloaded {} ({} bytes)", filename, bytes)
            }
            FetchOutcome::AlreadyPresent { filename } => write!(f, "already exists: {}", filename),
        }
    }
}

/// Downloads PDF links into a flat directory.
#[derive(Debug, Clone, Default)]
pub struct PdfFetcher {
    curl: CurlOptions,
}

impl PdfFetcher {
    pub fn new(curl: CurlOptions) -> Self {
        Self { curl }
    }

    /// Downloads `url` into `target_dir` under its resolved filename.
    ///
    /// Every failure (directory creation, transport, HTTP status, disk write)
    /// is returned as a [`FetchError`] and leaves neither the final file nor
    /// its `.part` behind.
    pub fn fetch(&self, url: &Url, target_dir: &Path) -> Result<FetchOutcome, FetchError> {
        std::fs::create_dir_all(target_dir).map_err(|e| FetchError::io(target_dir, e))?;

        let filename = resolve_filename(url);
        let final_path = target_dir.join(&filename);

        if final_path.exists() {
            tracing::info!(%url, file = %filename, "file already exists, skipping");
            return Ok(FetchOutcome::AlreadyPresent { filename });
        }

        let part = PartFile::create(&final_path).map_err(|e| FetchError::io(&final_path, e))?;
        let temp_path = part.temp_path().to_path_buf();

        let part = match self.transfer(url, part) {
            Ok(part) => part,
            Err(e) => {
                tracing::warn!(%url, error = %e, "download failed");
                return Err(e);
            }
        };

        let bytes = match part.finalize(&final_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let e = FetchError::io(&temp_path, e);
                tracing::warn!(%url, error = %e, "download failed");
                return Err(e);
            }
        };
        tracing::info!(%url, file = %filename, bytes, "downloaded");
        Ok(FetchOutcome::Downloaded { filename, bytes })
    }

    /// Runs the GET, streaming into `part`. On error the temp file is removed.
    fn transfer(&self, url: &Url, mut part: PartFile) -> Result<PartFile, FetchError> {
        let mut write_err: Option<io::Error> = None;
        let result = self.perform(url, &mut part, &mut write_err);

        match (result, write_err) {
            (_, Some(e)) => {
                let path = part.temp_path().to_path_buf();
                part.discard();
                Err(FetchError::io(path, e))
            }
            (Err(e), None) => {
                part.discard();
                Err(e)
            }
            (Ok(()), None) => Ok(part),
        }
    }

    fn perform(
        &self,
        url: &Url,
        part: &mut PartFile,
        write_err: &mut Option<io::Error>,
    ) -> Result<(), FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).map_err(FetchError::Transport)?;
        easy.useragent(&self.curl.user_agent)
            .map_err(FetchError::Transport)?;
        easy.follow_location(true).map_err(FetchError::Transport)?;
        easy.max_redirections(10).map_err(FetchError::Transport)?;
        // 4xx/5xx end the transfer before any body bytes reach the write callback.
        easy.fail_on_error(true).map_err(FetchError::Transport)?;
        easy.buffer_size(CHUNK_SIZE).map_err(FetchError::Transport)?;
        easy.connect_timeout(self.curl.connect_timeout)
            .map_err(FetchError::Transport)?;
        easy.low_speed_limit(1024).map_err(FetchError::Transport)?;
        easy.low_speed_time(Duration::from_secs(60))
            .map_err(FetchError::Transport)?;
        easy.timeout(self.curl.timeout).map_err(FetchError::Transport)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match part.write_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        *write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(FetchError::Transport)?;
            transfer.perform()
        };

        match performed {
            Ok(()) => {}
            Err(e) if e.is_http_returned_error() => {
                let code = easy.response_code().map_err(FetchError::Transport)?;
                return Err(FetchError::Http { code });
            }
            Err(e) => return Err(FetchError::Transport(e)),
        }

        // Non-HTTP schemes report 0; anything else below 400 passed fail_on_error.
        let code = easy.response_code().map_err(FetchError::Transport)?;
        if code >= 400 {
            return Err(FetchError::Http { code });
        }
        Ok(())
    }
}
