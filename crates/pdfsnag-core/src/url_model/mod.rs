//! URL modeling and filename derivation.
//!
//! Derives the local filename for a PDF link from its URL path (or from the
//! `name` query parameter of generic file-serving endpoints), sanitized for
//! common filesystems.

mod path;
mod sanitize;

pub use path::{filename_from_url_path, query_param};
pub use sanitize::{sanitize_filename, MAX_FILENAME_BYTES, MAX_FILENAME_CHARS};

use url::Url;

/// Canonical extension appended when the base name lacks it.
pub const PDF_EXTENSION: &str = ".pdf";

/// Path segment that identifies a generic file-serving endpoint whose real
/// filename is carried in the `name` query parameter.
pub const DYNAMIC_FILE_MARKER: &str = "get_file.php";

/// Stem used when neither the path nor the query yields a name.
const FALLBACK_STEM: &str = "document";

/// Resolves the target filename for a PDF URL.
///
/// # Examples
///
/// - `https://example.com/docs/report` → `"report.pdf"`
/// - `https://example.com/get_file.php?name=Report%20Final.pdf&id=5` → `"Report_Final.pdf"`
pub fn resolve_filename(url: &Url) -> String {
    let from_path = filename_from_url_path(url);

    let base = match from_path {
        Some(segment) if segment.contains(DYNAMIC_FILE_MARKER) => {
            query_param(url, "name").unwrap_or(segment)
        }
        Some(segment) => segment,
        None => FALLBACK_STEM.to_string(),
    };

    sanitize_filename(&with_pdf_extension(base))
}

fn with_pdf_extension(mut name: String) -> String {
    if !name.to_lowercase().ends_with(PDF_EXTENSION) {
        name.push_str(PDF_EXTENSION);
    }
    name
}
