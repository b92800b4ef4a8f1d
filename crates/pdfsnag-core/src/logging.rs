//! tracing setup. Log lines go to an append-only file when one can be opened,
//! otherwise to stderr. Terminal narration is the CLI's job, not this module's.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,pdfsnag=debug,pdfsnag_core=debug,chromiumoxide=warn";

/// `$XDG_STATE_HOME/pdfsnag/pdfsnag.log`, creating the directory if needed.
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfsnag")?;
    Ok(xdg_dirs.place_state_file("pdfsnag.log")?)
}

/// Installs the global subscriber.
///
/// Writes to `log_file` when given and openable, else to stderr. Returns the
/// file in use, or `None` for stderr. A second call is a no-op.
pub fn init_logging(log_file: Option<&Path>) -> Option<PathBuf> {
    let opened = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some((path.to_path_buf(), file)),
        Err(e) => {
            eprintln!(
                "pdfsnag: cannot open log file {}: {}; logging to stderr",
                path.display(),
                e
            );
            None
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false);

    match opened {
        Some((path, file)) => {
            let _ = builder.with_writer(Mutex::new(file)).try_init();
            tracing::info!(log = %path.display(), "pdfsnag logging initialized");
            Some(path)
        }
        None => {
            let _ = builder.with_writer(io::stderr).try_init();
            None
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}
