//! Parse HTTP response header lines into ResponseHead.

use super::ResponseHead;

/// Parse collected header lines into a ResponseHead.
///
/// With redirects followed, libcurl reports one header block per response; only
/// the block after the last status line counts. Returns `None` if no status line
/// was seen.
pub(crate) fn parse_head(lines: &[String]) -> Option<ResponseHead> {
    let last_status = lines
        .iter()
        .rposition(|l| l.trim_start().starts_with("HTTP/"))?;
    let status = parse_status_line(&lines[last_status])?;

    let mut content_length = None;
    let mut content_disposition = None;

    for line in &lines[last_status + 1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                content_disposition = Some(value.to_string());
            }
        }
    }

    Some(ResponseHead {
        status,
        content_length,
        content_disposition,
    })
}

/// `HTTP/1.1 404 Not Found` -> 404.
fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}
