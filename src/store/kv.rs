//! store/kv — одиночные операции put/get/delete + обзорные list_keys/fold.
//!
//! Что внутри:
//! - put: кодирует запись с текущим timestamp, при необходимости ротирует
//!   активный файл, дописывает и обновляет keydir. Неудачная запись keydir
//!   не трогает.
//! - delete: дописывает tombstone (vsz = 0) — удаление переживает рестарт —
//!   и затирает локатор в keydir нулевой длиной.
//! - get: локатор из keydir, значение — позиционным чтением из data-файла.
//!   Отсутствие и tombstone — Ok(None).
//! - list_keys / fold: снимок живых ключей; fold читает значения обычным
//!   get-путём.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::Write;

use crate::files;
use crate::keydir::KeyDirEntry;
use crate::metrics::{record_del_tombstone, record_get_hit, record_get_miss, record_put};
use crate::record::{encode_data_record, read_value_at};
use crate::util::now_secs;

use super::core::Store;

// ----------------- публичные операции -----------------

impl Store {
    /// Записать ключ/значение.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(anyhow!("empty key"));
        }
        let timestamp = now_secs();
        let buf = encode_data_record(timestamp, key, value)?;
        let (file_id, value_pos) = self.append_record(&buf)?;
        self.keydir.upsert(
            key,
            KeyDirEntry {
                file_id,
                value_sz: value.len() as u32,
                value_pos,
                timestamp,
            },
        );
        record_put(buf.len() as u64);
        Ok(())
    }

    /// Получить значение по ключу. Отсутствие и tombstone — Ok(None).
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entry = match self.keydir.get(key) {
            Some(e) if e.value_sz > 0 => *e,
            _ => {
                record_get_miss();
                return Ok(None);
            }
        };

        let path = files::data_path(&self.root, entry.file_id);
        let mut f = OpenOptions::new()
            .read(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        let val = read_value_at(&mut f, entry.value_pos, key.len(), entry.value_sz)
            .with_context(|| format!("read value from {}", path.display()))?;
        record_get_hit();
        Ok(Some(val))
    }

    /// Удалить ключ — пишет tombstone. Возвращает, был ли ключ живым.
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let live = matches!(self.keydir.get(key), Some(e) if e.value_sz > 0);
        if !live {
            return Ok(false);
        }

        let timestamp = now_secs();
        let buf = encode_data_record(timestamp, key, &[])?;
        let (file_id, value_pos) = self.append_record(&buf)?;
        self.keydir.upsert(
            key,
            KeyDirEntry {
                file_id,
                value_sz: 0,
                value_pos,
                timestamp,
            },
        );
        record_del_tombstone();
        Ok(true)
    }

    /// Снимок всех живых ключей. Порядок не определён.
    pub fn list_keys(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        self.keydir.for_each(|k, e| {
            if e.value_sz > 0 {
                out.push(k.to_vec());
            }
        });
        out
    }

    /// Левая свёртка по всем живым парам (ключ, значение).
    pub fn fold<B, F>(&self, init: B, mut f: F) -> Result<B>
    where
        F: FnMut(B, &[u8], &[u8]) -> B,
    {
        let mut live: Vec<Vec<u8>> = Vec::new();
        self.keydir.for_each(|k, e| {
            if e.value_sz > 0 {
                live.push(k.to_vec());
            }
        });

        let mut acc = init;
        for key in live {
            if let Some(value) = self.get(&key)? {
                acc = f(acc, &key, &value);
            }
        }
        Ok(acc)
    }
}

// ----------------- приватные помощники -----------------

impl Store {
    /// Дописать закодированную запись в активный файл.
    ///
    /// Возвращает (file_id, позиция заголовка записи). Ротация выполняется
    /// до записи, если запись превысила бы max_file_size (впритык допустимо).
    /// После неудачного write_all реальная длина файла неизвестна — запись
    /// закрывается до переоткрытия хранилища.
    pub(crate) fn append_record(&mut self, buf: &[u8]) -> Result<(u32, u32)> {
        let n = buf.len() as u64;
        let max_file_size = self.cfg.max_file_size;
        let data_fsync = self.cfg.data_fsync;

        let need_rotate = {
            let active = self.active_mut()?;
            active.write_pos + n > max_file_size
        };
        if need_rotate {
            self.rotate_active()?;
        }

        let active = self.active_mut()?;
        let value_pos = active.write_pos;
        if value_pos > u32::MAX as u64 {
            return Err(anyhow!(
                "active file {} grew past u32 locator range",
                active.id
            ));
        }

        if let Err(e) = active.file.write_all(buf) {
            let id = active.id;
            self.active = None;
            return Err(e).context(format!("append record to data file {}", id));
        }
        let file_id = active.id;
        active.write_pos += n;

        if data_fsync {
            active
                .file
                .sync_all()
                .with_context(|| format!("fsync data file {}", file_id))?;
        }

        Ok((file_id, value_pos as u32))
    }
}
