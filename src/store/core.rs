//! store/core — ядро: структура Store, активный файл, выделение id, ротация.
//!
//! Инварианты:
//! - Активный файл не более одного; write_pos равен его текущей длине.
//! - Идентификаторы файлов строго возрастают в пределах жизни каталога:
//!   аллокатор берёт max(wall-clock секунды, последний выданный id + 1)
//!   и дополнительно шагает вперёд, пока имя занято на диске. Быстрые
//!   ротации в пределах одной секунды не сталкиваются.

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use crate::config::CaskConfig;
use crate::files;
use crate::keydir::KeyDir;
use crate::lock::LockGuard;
use crate::metrics::record_rotation;
use crate::util::{fsync_dir, now_secs};

pub(crate) struct ActiveFile {
    pub file: File,
    pub id: u32,
    pub write_pos: u64,
}

pub struct Store {
    pub root: PathBuf,
    pub(crate) keydir: KeyDir,
    // None после неудачной ротации/append: хранилище закрыто для записи.
    pub(crate) active: Option<ActiveFile>,
    pub(crate) cfg: CaskConfig,
    // Максимальный id, выданный или наблюдавшийся этим процессом.
    pub(crate) last_file_id: u32,
    pub(crate) _lock: LockGuard,
}

impl Store {
    pub fn config(&self) -> &CaskConfig {
        &self.cfg
    }

    /// Идентификатор активного файла; None, если запись закрыта.
    pub fn active_file_id(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Число живых ключей (без tombstone-локаторов).
    pub fn live_len(&self) -> usize {
        let mut n = 0usize;
        self.keydir.for_each(|_k, e| {
            if e.value_sz > 0 {
                n += 1;
            }
        });
        n
    }

    /// Выделить следующий id файла: секунды wall-clock, прыжком за
    /// последний известный id и за любые занятые имена.
    pub(crate) fn allocate_file_id(&mut self) -> Result<u32> {
        let mut id = now_secs().max(self.last_file_id.saturating_add(1));
        loop {
            if !files::data_path(&self.root, id).exists()
                && !files::hint_path(&self.root, id).exists()
            {
                break;
            }
            id = id
                .checked_add(1)
                .ok_or_else(|| anyhow!("file id space exhausted (u32)"))?;
        }
        self.last_file_id = id;
        Ok(id)
    }

    /// Создать свежий активный файл. Используется из open и при ротации.
    pub(crate) fn open_active(&mut self) -> Result<()> {
        let id = self.allocate_file_id()?;
        let path = files::data_path(&self.root, id);
        let file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("create active data file {}", path.display()))?;
        let _ = fsync_dir(&self.root); // best-effort
        self.active = Some(ActiveFile {
            file,
            id,
            write_pos: 0,
        });
        Ok(())
    }

    /// Ротация: закрыть текущий активный файл, открыть новый с write_pos = 0.
    ///
    /// При ошибке active остаётся None — хранилище закрыто для записи,
    /// последующие put/delete возвращают ошибку до переоткрытия.
    pub(crate) fn rotate_active(&mut self) -> Result<()> {
        if let Some(retired) = self.active.take() {
            if self.cfg.rotate_fsync {
                retired.file.sync_all().with_context(|| {
                    format!("fsync retiring data file {} on rotation", retired.id)
                })?;
            }
            debug!(
                "rotating active file {} at {} B",
                retired.id, retired.write_pos
            );
        }
        self.open_active()?;
        record_rotation();
        Ok(())
    }

    #[inline]
    pub(crate) fn active_mut(&mut self) -> Result<&mut ActiveFile> {
        self.active
            .as_mut()
            .ok_or_else(|| anyhow!("store is closed for writes; reopen required"))
    }

    /// fsync активного файла (durability по запросу вызывающего кода).
    pub fn sync(&mut self) -> Result<()> {
        if let Some(active) = self.active.as_ref() {
            active
                .file
                .sync_all()
                .with_context(|| format!("fsync active data file {}", active.id))?;
        }
        Ok(())
    }

    /// Закрыть хранилище: fsync и закрытие активного файла.
    pub fn close(mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            active
                .file
                .sync_all()
                .with_context(|| format!("fsync active data file {} on close", active.id))?;
        }
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // best-effort fsync, если close() не вызывали. Ошибки в Drop игнорируем.
        if let Some(active) = self.active.take() {
            let _ = active.file.sync_all();
        }
        // Дескриптор LOCK освободится в Drop поля _lock.
    }
}
