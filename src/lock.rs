//! File-based locking for single-writer safety.
//!
//! Cross-platform (fs2) advisory lock on <root>/LOCK. The engine takes the
//! exclusive mode on open: two engines pointed at the same directory would
//! interleave their active files and corrupt latest-wins semantics, so the
//! second open fails instead. Released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_FILE;

pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn lock_file_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

fn open_lock_file(root: &Path) -> Result<std::fs::File> {
    let path = lock_file_path(root);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    Ok(f)
}

/// Acquire the exclusive lock. Blocks until acquired.
pub fn acquire_exclusive_lock(root: &Path) -> Result<LockGuard> {
    let file = open_lock_file(root)?;
    file.lock_exclusive()
        .with_context(|| format!("lock_exclusive {}", lock_file_path(root).display()))?;
    Ok(LockGuard {
        file,
        path: lock_file_path(root),
    })
}

/// Try to acquire the exclusive lock. Returns Err if already locked.
pub fn try_acquire_exclusive_lock(root: &Path) -> Result<LockGuard> {
    let file = open_lock_file(root)?;
    file.try_lock_exclusive().with_context(|| {
        format!(
            "try_lock_exclusive failed: {}",
            lock_file_path(root).display()
        )
    })?;
    Ok(LockGuard {
        file,
        path: lock_file_path(root),
    })
}
