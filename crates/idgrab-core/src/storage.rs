//! Disk I/O and file lifecycle.
//!
//! Creates the output directory, streams a body into a `.part` temp file and
//! renames it to the final name only once the whole body is on disk. A failed
//! write never leaves a file at the final path.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Creates `dir` (and parents) if missing, owner-only (0700) on Unix.
/// Fails if the path exists but is not a directory, or cannot be created.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => anyhow::bail!("output path exists and is not a directory: {}", dir.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to inspect output directory: {}", dir.display()))
        }
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), "created output directory");
    Ok(())
}

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Body being written for one download. Created next to its final path with the
/// `.part` suffix; overwrites a stale `.part` left by an earlier, interrupted run.
pub struct PartFile {
    writer: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            writer: BufWriter::new(file),
            temp_path,
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flushes, closes and renames the temp file to `final_path`. Returns the byte count.
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> io::Result<u64> {
        let PartFile {
            writer,
            temp_path,
            written,
        } = self;

        let flushed = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| {
                drop(file);
                fs::rename(&temp_path, final_path)
            });
        if let Err(e) = flushed {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(written)
    }

    /// Drops the temp file after a failed or rejected transfer.
    pub fn discard(self) {
        let PartFile {
            writer, temp_path, ..
        } = self;
        drop(writer);
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
    }
}
