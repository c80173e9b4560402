//! Centralized configuration for CaskDB.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - CaskConfig::from_env() reads CK1_* env vars; fluent with_* setters
//!   override specific fields in code.
//!
//! Durability-oriented defaults:
//! - rotate_fsync = true (the retiring active file is fsynced before a new
//!   one is opened; this is the engine's main durability point).
//! - data_fsync = false (no fsync on every put; can be enabled for
//!   write-through durability at an obvious throughput cost).

use std::fmt;

use crate::consts::DEFAULT_MAX_FILE_SIZE;

/// Top-level configuration for a store instance.
#[derive(Clone, Debug)]
pub struct CaskConfig {
    /// Upper bound on a single data file's byte length; a put that would
    /// exceed it rotates the active file first (an exact fit is allowed).
    /// Env: CK1_MAX_FILE_SIZE (default 32 MiB)
    pub max_file_size: u64,

    /// Whether to fsync the active file on every put.
    /// Env: CK1_DATA_FSYNC (default false; "1|true|on|yes" => true)
    pub data_fsync: bool,

    /// Whether to fsync the retiring active file on rotation.
    /// Env: CK1_ROTATE_FSYNC (default true; "0|false|off|no" => false)
    pub rotate_fsync: bool,
}

impl Default for CaskConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            data_fsync: false,
            rotate_fsync: true,
        }
    }
}

impl CaskConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("CK1_MAX_FILE_SIZE") {
            if let Ok(n) = v.trim().parse::<u64>() {
                if n > 0 {
                    cfg.max_file_size = n;
                }
            }
        }

        if let Ok(v) = std::env::var("CK1_DATA_FSYNC") {
            let s = v.trim().to_ascii_lowercase();
            cfg.data_fsync = s == "1" || s == "true" || s == "on" || s == "yes";
        }

        if let Ok(v) = std::env::var("CK1_ROTATE_FSYNC") {
            let s = v.trim().to_ascii_lowercase();
            cfg.rotate_fsync = !(s == "0" || s == "false" || s == "off" || s == "no");
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    pub fn with_rotate_fsync(mut self, on: bool) -> Self {
        self.rotate_fsync = on;
        self
    }
}

impl fmt::Display for CaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CaskConfig {{ max_file_size: {}, data_fsync: {}, rotate_fsync: {} }}",
            self.max_file_size, self.data_fsync, self.rotate_fsync
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_setters() {
        let cfg = CaskConfig::default();
        assert_eq!(cfg.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(!cfg.data_fsync);
        assert!(cfg.rotate_fsync);

        let cfg = CaskConfig::default()
            .with_max_file_size(128)
            .with_data_fsync(true)
            .with_rotate_fsync(false);
        assert_eq!(cfg.max_file_size, 128);
        assert!(cfg.data_fsync);
        assert!(!cfg.rotate_fsync);
    }
}
