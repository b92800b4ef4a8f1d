//! Filename hints from the URL path and query string.

use url::Url;

/// Extracts the last non-empty path segment of `url`, percent-decoded.
///
/// Returns `None` if the path is empty/root or the segment is `.`/`..`.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let decoded = percent_decode(segment);
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

/// Returns the percent-decoded value of the first `key` parameter in the query string.
///
/// Only `%XX` escapes are decoded; `+` is kept as-is.
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| percent_decode(v))
        .filter(|v| !v.is_empty())
}

/// Percent-decodes `raw`, replacing invalid UTF-8 sequences rather than failing.
fn percent_decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}
