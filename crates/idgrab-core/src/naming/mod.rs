//! Filename derivation.
//!
//! Derives safe local filenames from the Content-Disposition header, or from the
//! download ID when the server suggests nothing usable.

mod content_disposition;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use sanitize::sanitize_filename;

/// Name used when the response carries no usable filename. Depends only on `id`,
/// so re-runs find the same file.
pub fn fallback_filename(id: u64) -> String {
    format!("file_{}.unknown", id)
}

/// Derives a safe filename for saving the body of download `id`.
///
/// Prefers the filename from `content_disposition` (if present and parseable),
/// sanitized to ASCII letters, digits, `.`, `-` and `_`. Falls back to
/// [`fallback_filename`] when the header is missing or sanitizes to nothing
/// usable (empty, `.` or `..`).
///
/// # Examples
///
/// - `derive_filename(7, Some("attachment; filename=\"report.pdf\""))` → `"report.pdf"`
/// - `derive_filename(7, None)` → `"file_7.unknown"`
pub fn derive_filename(id: u64, content_disposition: Option<&str>) -> String {
    let sanitized = content_disposition
        .and_then(parse_content_disposition_filename)
        .map(|raw| sanitize_filename(&raw));

    match sanitized {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => fallback_filename(id),
    }
}
