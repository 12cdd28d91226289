//! Minimal HTTP/1.1 server that answers `?download_id=N` with a canned response.
//!
//! Unknown IDs get `404 Not Found` with a short body. Counts requests per ID and
//! records the peak number of requests being served at the same time.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    /// Raw header value, written as-is (need not be UTF-8).
    pub content_disposition: Option<Vec<u8>>,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            content_disposition: None,
            body: body.to_vec(),
        }
    }

    pub fn named(filename: &str, body: &[u8]) -> Self {
        Self::named_raw(filename.as_bytes(), body)
    }

    /// Like `named`, but the filename bytes go on the wire untouched.
    pub fn named_raw(filename: &[u8], body: &[u8]) -> Self {
        let mut value = b"attachment; filename=\"".to_vec();
        value.extend_from_slice(filename);
        value.push(b'"');
        Self {
            status: 200,
            content_disposition: Some(value),
            body: body.to_vec(),
        }
    }

    pub fn status(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            content_disposition: None,
            body: body.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdServerOptions {
    /// Time each request is held before the response is written.
    pub delay: Duration,
}

#[derive(Default)]
struct Stats {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: Mutex<HashMap<u64, usize>>,
}

pub struct IdServer {
    /// Base URL without query (e.g. "http://127.0.0.1:12345/dl").
    pub base_url: String,
    stats: Arc<Stats>,
}

impl IdServer {
    /// Highest number of requests that were held concurrently.
    pub fn peak_in_flight(&self) -> usize {
        self.stats.peak.load(Ordering::SeqCst)
    }

    /// Requests received for `id` so far.
    pub fn requests_for(&self, id: u64) -> usize {
        *self.stats.requests.lock().unwrap().get(&id).unwrap_or(&0)
    }

    pub fn total_requests(&self) -> usize {
        self.stats.requests.lock().unwrap().values().sum()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(responses: HashMap<u64, Canned>) -> IdServer {
    start_with_options(responses, IdServerOptions::default())
}

pub fn start_with_options(responses: HashMap<u64, Canned>, opts: IdServerOptions) -> IdServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let responses = Arc::new(responses);
    let stats = Arc::new(Stats::default());
    let server_stats = Arc::clone(&stats);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let responses = Arc::clone(&responses);
            let stats = Arc::clone(&server_stats);
            thread::spawn(move || handle(stream, &responses, &stats, opts));
        }
    });
    IdServer {
        base_url: format!("http://127.0.0.1:{}/dl", port),
        stats,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    responses: &HashMap<u64, Canned>,
    stats: &Stats,
    opts: IdServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let id = parse_download_id(request);
    if let Some(id) = id {
        *stats.requests.lock().unwrap().entry(id).or_insert(0) += 1;
    }

    // Counted while held, released before the client can see the response.
    let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    stats.peak.fetch_max(now, Ordering::SeqCst);
    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }
    stats.in_flight.fetch_sub(1, Ordering::SeqCst);

    let not_found = Canned::status(404, b"not found");
    let canned = id.and_then(|id| responses.get(&id)).unwrap_or(&not_found);
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        canned.status,
        reason(canned.status),
        canned.body.len()
    )
    .into_bytes();
    if let Some(value) = &canned.content_disposition {
        head.extend_from_slice(b"Content-Disposition: ");
        head.extend_from_slice(value);
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");
    let _ = stream.write_all(&head);
    let _ = stream.write_all(&canned.body);
}

/// `GET /dl?route=x&download_id=5 HTTP/1.1` -> Some(5).
fn parse_download_id(request: &str) -> Option<u64> {
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "download_id")
        .and_then(|(_, v)| v.parse().ok())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
