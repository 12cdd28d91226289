//! Single-ID download: one GET, validate the head, name the file, stream the body.
//!
//! The transfer runs on a blocking thread with its own curl Easy handle. The
//! response head is evaluated when the first body chunk arrives; a rejected or
//! already-present download aborts the transfer before the body is read.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::endpoint::Endpoint;
use crate::error::FetchError;
use crate::head::parse_head;
use crate::naming::{derive_filename, fallback_filename};
use crate::storage::{temp_path, PartFile};
use crate::summary::TaskOutcome;

/// Upper bound on the connect phase; the total timeout still applies.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything a task needs besides its ID. Built once by the pool and shared.
#[derive(Debug)]
pub struct FetchContext {
    pub endpoint: Endpoint,
    pub output_dir: PathBuf,
    /// Total time allowed for one request, body included.
    pub timeout: Duration,
    /// Final paths some task of this run is currently writing.
    writing: Mutex<HashSet<PathBuf>>,
}

impl FetchContext {
    pub fn new(endpoint: Endpoint, output_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            endpoint,
            output_dir,
            timeout,
            writing: Mutex::new(HashSet::new()),
        }
    }

    /// Reserves `path` for the calling task. `None` if another task holds it.
    fn claim(&self, path: &Path) -> Option<NameClaim<'_>> {
        let mut writing = self.writing.lock().unwrap_or_else(|e| e.into_inner());
        if !writing.insert(path.to_path_buf()) {
            return None;
        }
        Some(NameClaim {
            writing: &self.writing,
            path: path.to_path_buf(),
        })
    }
}

/// Exclusive right to write one final path; released on drop.
struct NameClaim<'a> {
    writing: &'a Mutex<HashSet<PathBuf>>,
    path: PathBuf,
}

impl Drop for NameClaim<'_> {
    fn drop(&mut self) {
        let mut writing = self.writing.lock().unwrap_or_else(|e| e.into_inner());
        writing.remove(&self.path);
    }
}

/// An accepted body: its `.part` file, final path and the claim on that path.
struct OpenBody<'a> {
    part: PartFile,
    final_path: PathBuf,
    claim: NameClaim<'a>,
}

/// Where the body goes, decided once the response head is known.
enum Sink<'a> {
    /// No body bytes seen yet.
    Pending,
    Writing(OpenBody<'a>),
    /// Body rejected or write failed; outcome is final.
    Done(TaskOutcome),
}

/// Runs the whole task for `id`: waits for a slot in `slots`, then fetches and
/// stores. Never fails; every problem ends up as a logged `TaskOutcome`.
pub async fn fetch_one(ctx: Arc<FetchContext>, slots: Arc<Semaphore>, id: u64) -> TaskOutcome {
    let _permit = match slots.acquire_owned().await {
        Ok(p) => p,
        Err(e) => {
            let outcome = TaskOutcome::Failed(FetchError::Task(e.to_string()));
            log_outcome(&ctx, id, &outcome);
            return outcome;
        }
    };

    // An unnamed body from an earlier run is already here; no request needed.
    let fallback = ctx.output_dir.join(fallback_filename(id));
    if fallback.exists() {
        let outcome = TaskOutcome::AlreadyExists { path: fallback };
        log_outcome(&ctx, id, &outcome);
        return outcome;
    }

    let outcome = tokio::task::spawn_blocking({
        let ctx = Arc::clone(&ctx);
        move || fetch_blocking(&ctx, id)
    })
    .await
    .unwrap_or_else(|e| TaskOutcome::Failed(e.into()));

    log_outcome(&ctx, id, &outcome);
    outcome
}

/// Blocking part of a task. Call from `spawn_blocking` when used from async code.
pub fn fetch_blocking(ctx: &FetchContext, id: u64) -> TaskOutcome {
    let url = ctx.endpoint.url_for(id);
    tracing::debug!(id, url = %url, "requesting");
    transfer(ctx, id, &url).unwrap_or_else(TaskOutcome::Failed)
}

fn transfer(ctx: &FetchContext, id: u64, url: &str) -> Result<TaskOutcome, FetchError> {
    let headers: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let sink = RefCell::new(Sink::Pending);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(ctx.timeout))?;
    easy.timeout(ctx.timeout)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            // Non-ASCII filename bytes are replaced during sanitization anyway.
            let line = String::from_utf8_lossy(data);
            headers.borrow_mut().push(line.trim_end().to_string());
            true
        })?;
        transfer.write_function(|data| {
            let mut sink = sink.borrow_mut();
            if let Sink::Pending = *sink {
                *sink = match open_body(ctx, id, &headers.borrow()) {
                    Ok(body) => Sink::Writing(body),
                    Err(outcome) => Sink::Done(outcome),
                };
            }
            // Returning fewer bytes than offered aborts the transfer.
            if write_body(&mut *sink, data) {
                Ok(data.len())
            } else {
                Ok(0)
            }
        })?;
        transfer.perform()
    };

    let OpenBody {
        part,
        final_path,
        claim: _claim,
    } = match (performed, sink.into_inner()) {
        // Aborted on purpose (skip, already exists, write failure).
        (_, Sink::Done(outcome)) => return Ok(outcome),
        (Err(e), Sink::Writing(body)) => {
            body.part.discard();
            return Err(e.into());
        }
        (Err(e), Sink::Pending) => return Err(e.into()),
        (Ok(()), Sink::Writing(body)) => body,
        // Completed without a single body byte: judge the head now.
        (Ok(()), Sink::Pending) => match open_body(ctx, id, &headers.into_inner()) {
            Ok(body) => body,
            Err(outcome) => return Ok(outcome),
        },
    };

    // The claim is held until the rename is done.
    match part.finalize(&final_path) {
        Ok(bytes) => Ok(TaskOutcome::Downloaded {
            path: final_path,
            bytes,
        }),
        Err(source) => Err(FetchError::Write {
            path: final_path,
            source,
        }),
    }
}

/// Validates the response head, claims the final path and opens the `.part`
/// file for the body. `Err` carries the terminal outcome when the body must not
/// be stored.
fn open_body<'a>(
    ctx: &'a FetchContext,
    id: u64,
    header_lines: &[String],
) -> Result<OpenBody<'a>, TaskOutcome> {
    let head = parse_head(header_lines).ok_or(TaskOutcome::Skipped {
        status: 0,
        content_length: None,
    })?;
    if !head.is_downloadable() {
        return Err(TaskOutcome::Skipped {
            status: head.status,
            content_length: head.content_length,
        });
    }

    let name = derive_filename(id, head.content_disposition.as_deref());
    let final_path = ctx.output_dir.join(name);
    // Claim before the existence check: a task that loses the claim race then
    // sees the winner's renamed file instead of overwriting it.
    let Some(claim) = ctx.claim(&final_path) else {
        return Err(TaskOutcome::AlreadyExists { path: final_path });
    };
    if final_path.exists() {
        return Err(TaskOutcome::AlreadyExists { path: final_path });
    }

    match PartFile::create(&final_path) {
        Ok(part) => Ok(OpenBody {
            part,
            final_path,
            claim,
        }),
        Err(source) => Err(TaskOutcome::Failed(FetchError::CreateFile {
            path: temp_path(&final_path),
            source,
        })),
    }
}

/// Appends a chunk to the open body. Returns false when the transfer should stop.
fn write_body(sink: &mut Sink, data: &[u8]) -> bool {
    let source = match sink {
        Sink::Writing(body) => match body.part.write_chunk(data) {
            Ok(()) => return true,
            Err(e) => e,
        },
        Sink::Pending | Sink::Done(_) => return false,
    };
    if let Sink::Writing(body) = std::mem::replace(sink, Sink::Pending) {
        body.part.discard();
        *sink = Sink::Done(TaskOutcome::Failed(FetchError::Write {
            path: body.final_path,
            source,
        }));
    }
    false
}

fn log_outcome(ctx: &FetchContext, id: u64, outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Downloaded { path, bytes } => {
            tracing::info!(id, path = %path.display(), bytes, "downloaded");
        }
        TaskOutcome::Skipped {
            status,
            content_length,
        } => {
            tracing::info!(id, status, content_length = ?content_length, "skipped");
        }
        TaskOutcome::AlreadyExists { path } => {
            tracing::info!(id, path = %path.display(), "already exists");
        }
        TaskOutcome::Failed(e) => {
            tracing::warn!(id, url = %ctx.endpoint.url_for(id), error = %e, "download failed");
        }
    }
}
