//! Response head of a download GET.
//!
//! libcurl hands us raw header lines; the worker collects them and, once the
//! body starts (or the transfer ends), turns them into a `ResponseHead` to decide
//! whether the body is worth keeping.

mod parse;

pub(crate) use parse::parse_head;

/// Status line and the headers the worker acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP status code of the final response (after redirects).
    pub status: u32,
    /// Declared body size, if `Content-Length` is present and numeric.
    pub content_length: Option<u64>,
    /// `Content-Disposition` value if present (filename hint).
    pub content_disposition: Option<String>,
}

impl ResponseHead {
    /// True for `200 OK` with a declared length other than zero. An absent
    /// `Content-Length` (chunked responses) is accepted.
    pub fn is_downloadable(&self) -> bool {
        self.status == 200 && self.content_length != Some(0)
    }
}
