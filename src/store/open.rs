//! store/open — открытие Store: lock, построение индекса, активный файл.

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use crate::config::CaskConfig;
use crate::lock::acquire_exclusive_lock;

use super::build::build_keydir;
use super::core::Store;

impl Store {
    /// Открыть хранилище с конфигурацией из окружения (CK1_*).
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_with_config(root, CaskConfig::from_env())
    }

    pub fn open_with_config(root: &Path, cfg: CaskConfig) -> Result<Self> {
        // Каталог нужен до LOCK; скан создал бы его и сам, но позже.
        if !root.exists() {
            fs::create_dir_all(root)
                .with_context(|| format!("create store directory {}", root.display()))?;
        }
        let lock = acquire_exclusive_lock(root)?;

        let built = build_keydir(root)?;

        let mut store = Store {
            root: root.to_path_buf(),
            keydir: built.keydir,
            active: None,
            cfg,
            last_file_id: built.max_file_id,
            _lock: lock,
        };
        store.open_active()?;

        info!(
            "opened store at {} ({} indexed keys, active file {})",
            store.root.display(),
            store.keydir.len(),
            store.last_file_id
        );
        Ok(store)
    }
}
