//! Content-Disposition header parsing (`filename=` parameter only).

const KEY: &str = "filename=";

/// Extracts the suggested filename from a raw Content-Disposition header value.
///
/// Matches `filename="value"` and `filename=value`; the key is case-insensitive and
/// the value ends at the next `"`, `;` or the end of the header. Surrounding
/// whitespace is trimmed. An empty value does not count as a match and the search
/// continues with the next `filename=` occurrence. `filename*=` is not recognized.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets identical, so indices carry over.
    let lower = header_value.to_ascii_lowercase();
    let mut from = 0;

    while let Some(pos) = lower[from..].find(KEY) {
        let start = from + pos + KEY.len();
        let rest = &header_value[start..];
        let rest = rest.strip_prefix('"').unwrap_or(rest);
        let end = rest.find(['"', ';']).unwrap_or(rest.len());
        let value = rest[..end].trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
        from = start;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quoted() {
        let r = parse_content_disposition_filename("attachment; filename=\"report.pdf\"");
        assert_eq!(r.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn parse_token() {
        let r = parse_content_disposition_filename("attachment; filename=report.pdf");
        assert_eq!(r.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn parse_bare_parameter() {
        let r = parse_content_disposition_filename("filename=\"a.bin\"");
        assert_eq!(r.as_deref(), Some("a.bin"));
    }

    #[test]
    fn key_is_case_insensitive() {
        let r = parse_content_disposition_filename("Attachment; FileName=\"Manual.PDF\"");
        assert_eq!(r.as_deref(), Some("Manual.PDF"));
    }

    #[test]
    fn value_ends_at_semicolon() {
        let r = parse_content_disposition_filename("attachment; filename=fw.hex; size=42");
        assert_eq!(r.as_deref(), Some("fw.hex"));
    }

    #[test]
    fn value_is_trimmed() {
        let r = parse_content_disposition_filename("attachment; filename=\"  spaced.txt  \"");
        assert_eq!(r.as_deref(), Some("spaced.txt"));
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let r = parse_content_disposition_filename("attachment; filename=\"open.zip");
        assert_eq!(r.as_deref(), Some("open.zip"));
    }

    #[test]
    fn empty_value_is_not_a_match() {
        assert_eq!(parse_content_disposition_filename("attachment; filename=\"\""), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=;"), None);
        let r = parse_content_disposition_filename("filename=\"\"; filename=\"second.bin\"");
        assert_eq!(r.as_deref(), Some("second.bin"));
    }

    #[test]
    fn extended_parameter_is_ignored() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename*=UTF-8''caf%C3%A9.txt"),
            None
        );
    }

    #[test]
    fn missing_parameter() {
        assert_eq!(parse_content_disposition_filename("inline"), None);
        assert_eq!(parse_content_disposition_filename(""), None);
    }

    #[test]
    fn non_ascii_value_survives_parsing() {
        let r = parse_content_disposition_filename("attachment; filename=\"café.txt\"");
        assert_eq!(r.as_deref(), Some("café.txt"));
    }
}
