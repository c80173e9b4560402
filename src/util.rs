//! util — общие утилиты.
//!
//! Содержит:
//! - now_secs(): текущее Unix-время в секундах (u32, saturating).
//! - fsync_dir(): fsync каталога после create/rename (no-op вне unix).

use std::path::Path;

/// Текущее Unix-время в секундах, обрезанное к u32 (saturating).
#[inline]
pub fn now_secs() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs().min(u32::MAX as u64) as u32
}

#[cfg(unix)]
pub fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    use std::fs::File;
    if !dir.as_os_str().is_empty() {
        let d = File::open(dir)?;
        d.sync_all()?;
    }
    Ok(())
}
#[cfg(not(unix))]
pub fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_secs_monotonic_nonzero() {
        let a = now_secs();
        let b = now_secs();
        assert!(a > 0);
        assert!(b >= a);
    }
}
