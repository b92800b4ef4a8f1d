//! Download file lifecycle.
//!
//! Bodies are streamed into `<final>.part` and atomically renamed to the
//! final name once the transfer completes, so the output directory never
//! holds a truncated document under its real name.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `plan.pdf` → `plan.pdf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one in-flight download.
pub struct PartFile {
    writer: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create the temp file for `final_path`. Truncates a leftover `.part`
    /// from an earlier interrupted run.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            writer: BufWriter::new(file),
            temp_path,
            written: 0,
        })
    }

    /// Append a body chunk. Empty chunks are skipped.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and rename the temp file to `final_path`. Returns the byte count.
    /// On any error the temp file is removed before returning.
    pub fn finalize(self, final_path: &Path) -> io::Result<u64> {
        let PartFile {
            writer,
            temp_path,
            written,
        } = self;
        let committed = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| file.sync_all())
            .and_then(|()| std::fs::rename(&temp_path, final_path));
        match committed {
            Ok(()) => Ok(written),
            Err(e) => {
                remove_temp(&temp_path);
                Err(e)
            }
        }
    }

    /// Drop the temp file after a failed transfer.
    pub fn discard(self) {
        let PartFile { writer, temp_path, .. } = self;
        drop(writer);
        remove_temp(&temp_path);
    }
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %temp_path.display(), error = %e, "could not remove partial file");
        }
    }
}
