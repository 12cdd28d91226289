//! Per-task failure type.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single download task failed. Handled at the task boundary: logged,
/// counted, never propagated to the pool.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connect, timeout, etc.).
    #[error("request failed: {0}")]
    Transport(#[from] curl::Error),

    /// The `.part` file could not be created.
    #[error("failed to create {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing, flushing or renaming the body failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task itself panicked or was cancelled.
    #[error("task did not complete: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(e: tokio::task::JoinError) -> Self {
        FetchError::Task(e.to_string())
    }
}
