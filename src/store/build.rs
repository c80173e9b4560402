//! store/build — построение keydir из файлов каталога при открытии.
//!
//! Алгоритм:
//! - Файлы обходятся по возрастанию id; внутри файла — по возрастанию
//!   смещения. Поздние записи затирают ранние, поэтому итоговый индекс
//!   отражает последнюю версию каждого ключа без дополнительных сравнений.
//! - Если у data-файла есть hint-сосед, читается hint: один короткий
//!   заголовок на ключ вместо перешагивания значений.
//! - Запись с vsz == 0 (tombstone, в data или hint) удаляет ключ из индекса.
//! - Оборванный хвост (заголовок или тело за EOF) завершает скан файла;
//!   hint-записи дополнительно валидируются по длине data-соседа, чтобы
//!   отбросить хвост недописанного merge.
//! - hint без data-соседа — устаревший артефакт, пропускается.

use anyhow::{anyhow, Context, Result};
use log::warn;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::consts::DATA_HDR_SIZE;
use crate::files::{self, FileKind};
use crate::keydir::{KeyDir, KeyDirEntry};
use crate::metrics::{record_index_file, record_index_records, record_index_torn_tail};
use crate::record::{read_data_head_at, read_hint_record_at};

pub(crate) struct BuildResult {
    pub keydir: KeyDir,
    /// Максимальный id среди всех файлов каталога (data и hint) — нижняя
    /// граница для аллокатора активного файла.
    pub max_file_id: u32,
}

pub(crate) fn build_keydir(root: &Path) -> Result<BuildResult> {
    let listing = files::scan_store_dir(root)?;

    let hint_ids: HashSet<u32> = listing
        .iter()
        .filter(|f| f.kind == FileKind::Hint)
        .map(|f| f.id)
        .collect();
    let data_ids: HashSet<u32> = listing
        .iter()
        .filter(|f| f.kind == FileKind::Data)
        .map(|f| f.id)
        .collect();

    let mut keydir = KeyDir::new();
    let mut max_file_id = 0u32;

    for f in &listing {
        max_file_id = max_file_id.max(f.id);
        match f.kind {
            FileKind::Hint => {
                if !data_ids.contains(&f.id) {
                    warn!("skipping stale hint file {} (no data sibling)", f.path.display());
                }
            }
            FileKind::Data => {
                let use_hint = hint_ids.contains(&f.id);
                record_index_file(use_hint);
                if use_hint {
                    replay_hint_file(root, f.id, &mut keydir)?;
                } else {
                    replay_data_file(root, f.id, &mut keydir)?;
                }
            }
        }
    }

    Ok(BuildResult {
        keydir,
        max_file_id,
    })
}

fn open_readonly(path: &Path) -> Result<(File, u64)> {
    let f = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    let len = f
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    Ok((f, len))
}

/// Последовательный скан data-файла с нулевого смещения.
fn replay_data_file(root: &Path, fid: u32, keydir: &mut KeyDir) -> Result<()> {
    let path = files::data_path(root, fid);
    let (mut f, file_len) = open_readonly(&path)?;

    let mut pos = 0u64;
    let mut records = 0u64;
    loop {
        match read_data_head_at(&mut f, pos, file_len)
            .with_context(|| format!("scan {}", path.display()))?
        {
            None => {
                if pos < file_len {
                    warn!(
                        "discarding torn tail of {} ({} of {} B scanned)",
                        path.display(),
                        pos,
                        file_len
                    );
                    record_index_torn_tail();
                }
                break;
            }
            Some((head, next_pos)) => {
                if head.value_sz == 0 {
                    keydir.remove(&head.key);
                } else {
                    if pos > u32::MAX as u64 {
                        return Err(anyhow!(
                            "record offset {} in {} exceeds u32 locator range",
                            pos,
                            path.display()
                        ));
                    }
                    keydir.upsert(
                        &head.key,
                        KeyDirEntry {
                            file_id: fid,
                            value_sz: head.value_sz,
                            value_pos: pos as u32,
                            timestamp: head.timestamp,
                        },
                    );
                }
                records += 1;
                pos = next_pos;
            }
        }
    }
    record_index_records(records);
    Ok(())
}

/// Чтение hint-файла вместо скана data-соседа.
fn replay_hint_file(root: &Path, fid: u32, keydir: &mut KeyDir) -> Result<()> {
    let dpath = files::data_path(root, fid);
    let data_len = std::fs::metadata(&dpath)
        .with_context(|| format!("stat {}", dpath.display()))?
        .len();

    let hpath = files::hint_path(root, fid);
    let (mut f, hint_len) = open_readonly(&hpath)?;

    let mut pos = 0u64;
    let mut records = 0u64;
    loop {
        match read_hint_record_at(&mut f, pos, hint_len)
            .with_context(|| format!("scan {}", hpath.display()))?
        {
            None => {
                if pos < hint_len {
                    warn!(
                        "discarding torn tail of {} ({} of {} B scanned)",
                        hpath.display(),
                        pos,
                        hint_len
                    );
                    record_index_torn_tail();
                }
                break;
            }
            Some((rec, next_pos)) => {
                pos = next_pos;
                records += 1;
                if rec.value_sz == 0 {
                    keydir.remove(&rec.key);
                    continue;
                }
                // Валидация по data-соседу: локатор за пределами файла —
                // хвост недописанного merge, запись отбрасывается.
                let end = rec.value_pos as u64
                    + DATA_HDR_SIZE as u64
                    + rec.key.len() as u64
                    + rec.value_sz as u64;
                if end > data_len {
                    warn!(
                        "discarding hint record at {} of {} (points past {} B of {})",
                        rec.pos,
                        hpath.display(),
                        data_len,
                        dpath.display()
                    );
                    record_index_torn_tail();
                    continue;
                }
                keydir.upsert(
                    &rec.key,
                    KeyDirEntry {
                        file_id: fid,
                        value_sz: rec.value_sz,
                        value_pos: rec.value_pos,
                        timestamp: rec.timestamp,
                    },
                );
            }
        }
    }
    record_index_records(records);
    Ok(())
}
