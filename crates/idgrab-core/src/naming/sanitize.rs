//! Portable filename sanitization.

use crate::storage::TEMP_SUFFIX;

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

/// Longest name we emit: the `.part` temp name must fit in NAME_MAX too.
const MAX_NAME_LEN: usize = NAME_MAX - TEMP_SUFFIX.len();

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'
}

/// Sanitizes a server-suggested filename.
///
/// - Replaces every char outside ASCII letters, digits, `.`, `-`, `_` with `_`
/// - Collapses consecutive underscores
/// - Keeps case as-is
/// - Limits length to 250 bytes, so `<name>.part` still fits in NAME_MAX
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    // Output is pure ASCII, so any byte index is a char boundary.
    out.truncate(MAX_NAME_LEN);
    out
}
