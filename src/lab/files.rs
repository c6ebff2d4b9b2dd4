//! Write-once input files shared between concurrent lab processes.
//!
//! A file is produced under `<file>.lock`, created with `create_new`, and
//! written to a temporary sibling that is renamed into place. Readers never
//! see a partial file, and two processes never generate the same file twice.

use crate::diagnostics::LabError;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

const LOCK_POLL: Duration = Duration::from_millis(50);

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const LOCK_EXTENSION: &str = "lock";
pub const TEMP_EXTENSION: &str = "tmp";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

pub fn lock_path(path: &Path) -> PathBuf {
    with_suffix(path, &format!(".{}", LOCK_EXTENSION))
}

/// A fresh file name in `dir`, unique within and across processes.
pub fn scratch_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("{}-{}-{}.{}", stem, std::process::id(), n, extension))
}

struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "could not release lock: {}", e);
        }
    }
}

/// Produces `path` unless it already exists.
///
/// Returns `Ok(true)` when this call wrote the file and `Ok(false)` when the
/// file was already there, possibly after waiting for another process. A lock
/// held longer than `max_wait` is reported as an input generation failure.
pub fn write_once<F>(path: &Path, max_wait: Duration, produce: F) -> Result<bool, LabError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), LabError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LabError::io("create directory", parent, e))?;
    }
    let lock = lock_path(path);
    let started = Instant::now();

    let _guard = loop {
        if path.exists() {
            return Ok(false);
        }
        match OpenOptions::new().write(true).create_new(true).open(&lock) {
            Ok(_) => break LockGuard { path: lock.clone() },
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if started.elapsed() >= max_wait {
                    return Err(LabError::InputGeneration {
                        target: path.display().to_string(),
                        reason: format!(
                            "lock '{}' was held for more than {} ms; remove stale locks with `combilab clean`",
                            lock.display(),
                            max_wait.as_millis()
                        ),
                    });
                }
                tracing::debug!(path = %path.display(), "waiting for another process to write");
                thread::sleep(LOCK_POLL);
            }
            Err(e) => return Err(LabError::io("create lock", &lock, e)),
        }
    };

    // Another process may have finished between our check and the lock.
    if path.exists() {
        return Ok(false);
    }

    let temp = with_suffix(
        path,
        &format!(".{}.{}", std::process::id(), TEMP_EXTENSION),
    );
    let written = write_temp(&temp, produce).and_then(|()| {
        fs::rename(&temp, path).map_err(|e| LabError::io("rename", &temp, e))
    });
    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written?;
    tracing::debug!(path = %path.display(), "wrote input file");
    Ok(true)
}

fn write_temp<F>(temp: &Path, produce: F) -> Result<(), LabError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), LabError>,
{
    let file = fs::File::create(temp).map_err(|e| LabError::io("create", temp, e))?;
    let mut writer = BufWriter::new(file);
    produce(&mut writer)?;
    writer.flush().map_err(|e| LabError::io("write", temp, e))?;
    Ok(())
}

fn is_stale(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == LOCK_EXTENSION || ext == TEMP_EXTENSION)
}

/// Lock and temporary files left under `root` by interrupted runs.
///
/// The list is sorted so that removal order is deterministic.
pub fn find_stale<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, LabError> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| LabError::Io {
            operation: "walk".to_string(),
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_stale(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
