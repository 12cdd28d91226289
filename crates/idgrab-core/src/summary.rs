//! Task outcomes and the run totals built from them.

use std::fmt;
use std::path::PathBuf;

use crate::error::FetchError;

/// Terminal state of one download task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Body written to `path`.
    Downloaded { path: PathBuf, bytes: u64 },
    /// Response was not `200` or declared an empty body. Not an error.
    Skipped {
        status: u32,
        content_length: Option<u64>,
    },
    /// A file with the derived name is already on disk.
    AlreadyExists { path: PathBuf },
    Failed(FetchError),
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

/// Totals for one pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub already_exists: u64,
    pub failed: u64,
    /// Bytes written across all downloaded files.
    pub bytes: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Downloaded { bytes, .. } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            TaskOutcome::Skipped { .. } => self.skipped += 1,
            TaskOutcome::AlreadyExists { .. } => self.already_exists += 1,
            TaskOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Tasks that reached a terminal outcome.
    pub fn completed(&self) -> u64 {
        self.downloaded + self.skipped + self.already_exists + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dispatched: {} downloaded ({:.1} MiB), {} skipped, {} already existed, {} failed",
            self.dispatched,
            self.downloaded,
            self.bytes as f64 / 1_048_576.0,
            self.skipped,
            self.already_exists,
            self.failed
        )
    }
}
