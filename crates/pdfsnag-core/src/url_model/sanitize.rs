//! Filesystem-safe filename sanitization.

/// Longest name we produce, counted in characters and including the extension.
pub const MAX_FILENAME_CHARS: usize = 200;

/// Byte limit for one path component on ext4 and most other filesystems.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Characters that are reserved on at least one common filesystem.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitizes a candidate filename for safe use on disk.
///
/// - Replaces reserved characters (`< > : " / \ | ? *`), whitespace and
///   control characters with `_`
/// - Collapses consecutive underscores
/// - Limits the name to [`MAX_FILENAME_CHARS`] characters and
///   [`MAX_FILENAME_BYTES`] UTF-8 bytes, truncating the stem and keeping the
///   extension intact
///
/// Non-empty input always yields non-empty output.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = if RESERVED.contains(&c) || c.is_whitespace() || c.is_control() {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    truncate_keeping_extension(out)
}

fn truncate_keeping_extension(name: String) -> String {
    if within_limits(&name) {
        return name;
    }

    let (stem, ext) = split_extension(&name);
    let ext_chars = ext.chars().count();
    if ext_chars >= MAX_FILENAME_CHARS || ext.len() >= MAX_FILENAME_BYTES {
        return prefix_within(&name, MAX_FILENAME_CHARS, MAX_FILENAME_BYTES).to_string();
    }

    let stem = prefix_within(stem, MAX_FILENAME_CHARS - ext_chars, MAX_FILENAME_BYTES - ext.len());
    format!("{}{}", stem, ext)
}

fn within_limits(name: &str) -> bool {
    name.len() <= MAX_FILENAME_BYTES && name.chars().count() <= MAX_FILENAME_CHARS
}

/// Longest prefix of `s` with at most `max_chars` characters and `max_bytes` bytes,
/// cut on a character boundary.
fn prefix_within(s: &str, max_chars: usize, max_bytes: usize) -> &str {
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take(max_chars)
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Splits `name` into (stem, extension) at the last `.`; the extension keeps its dot.
/// A leading dot does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}
