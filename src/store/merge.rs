//! store/merge — офлайн-компактация неактивных data-файлов.
//!
//! Протокол:
//! - Кандидаты M: все data-файлы, кроме активного и кроме уже имеющих
//!   hint-соседа (те компактны по построению). |M| <= 1 — делать нечего.
//! - Новый id строго больше активного и всех id в M (монотонный аллокатор).
//! - Для каждой живой записи keydir с file_id из M: запись копируется в
//!   <id>.data байт-в-байт (заголовок + ключ + значение), в <id>.hint
//!   дописывается hint-запись, локатор в keydir перенацеливается.
//! - Оба выходных файла fsync-аются ДО удаления исходников: упавший
//!   посередине merge оставляет каталог восстановимым (исходники целы,
//!   оборванный hint отбрасывается при следующем открытии по валидации длин).
//! - Ошибки всплывают как есть; частичный результат разбирает следующий open.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::consts::DATA_HDR_SIZE;
use crate::files::{self, FileKind};
use crate::keydir::KeyDirEntry;
use crate::metrics::record_merge;
use crate::record::encode_hint_record;
use crate::util::fsync_dir;

use super::core::Store;

#[derive(Debug, Default, Clone)]
pub struct MergeReport {
    pub source_files: u32,
    pub records_copied: u64,
    pub bytes_copied: u64,
    /// None, если кандидатов не набралось и файлы не трогались.
    pub merge_file_id: Option<u32>,
}

impl Store {
    /// Слить неактивные data-файлы без hint-соседей в одну пару data+hint
    /// и удалить исходники. Вызов без подходящих кандидатов — no-op.
    pub fn merge(&mut self) -> Result<MergeReport> {
        let mut rep = MergeReport::default();

        let listing = files::scan_store_dir(&self.root)?;
        let hint_ids: HashSet<u32> = listing
            .iter()
            .filter(|f| f.kind == FileKind::Hint)
            .map(|f| f.id)
            .collect();
        let active_id = self.active_file_id();

        let merge_set: HashSet<u32> = listing
            .iter()
            .filter(|f| f.kind == FileKind::Data)
            .filter(|f| Some(f.id) != active_id)
            .filter(|f| !hint_ids.contains(&f.id))
            .map(|f| f.id)
            .collect();
        if merge_set.len() <= 1 {
            return Ok(rep);
        }
        rep.source_files = merge_set.len() as u32;

        // Снимок переносимых записей: живые ключи, чья актуальная версия
        // лежит в одном из кандидатов.
        let mut victims: Vec<(Vec<u8>, KeyDirEntry)> = Vec::new();
        self.keydir.for_each(|k, e| {
            if e.value_sz > 0 && merge_set.contains(&e.file_id) {
                victims.push((k.to_vec(), *e));
            }
        });

        let merge_id = self.allocate_file_id()?;
        let dpath = files::data_path(&self.root, merge_id);
        let hpath = files::hint_path(&self.root, merge_id);
        let mut mergef = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&dpath)
            .with_context(|| format!("create merge data file {}", dpath.display()))?;
        let mut hintf = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&hpath)
            .with_context(|| format!("create merge hint file {}", hpath.display()))?;

        let mut sources: HashMap<u32, File> = HashMap::new();
        let mut write_pos: u64 = 0;

        for (key, entry) in victims {
            let rec_len = DATA_HDR_SIZE as u64 + key.len() as u64 + entry.value_sz as u64;
            if write_pos + rec_len > u32::MAX as u64 {
                return Err(anyhow!(
                    "merge file {} grew past u32 locator range",
                    merge_id
                ));
            }

            let src = match sources.entry(entry.file_id) {
                std::collections::hash_map::Entry::Occupied(o) => o.into_mut(),
                std::collections::hash_map::Entry::Vacant(v) => {
                    let path = files::data_path(&self.root, entry.file_id);
                    let f = OpenOptions::new()
                        .read(true)
                        .open(&path)
                        .with_context(|| format!("open merge source {}", path.display()))?;
                    v.insert(f)
                }
            };

            // Запись переносится байт-в-байт: заголовок + ключ + значение.
            src.seek(SeekFrom::Start(entry.value_pos as u64))?;
            let mut rec = vec![0u8; rec_len as usize];
            src.read_exact(&mut rec).with_context(|| {
                format!(
                    "read record of {} B at {} from data file {}",
                    rec_len, entry.value_pos, entry.file_id
                )
            })?;

            mergef
                .write_all(&rec)
                .with_context(|| format!("append to merge data file {}", dpath.display()))?;
            let hint = encode_hint_record(entry.timestamp, &key, entry.value_sz, write_pos as u32)?;
            hintf
                .write_all(&hint)
                .with_context(|| format!("append to merge hint file {}", hpath.display()))?;

            self.keydir.upsert(
                &key,
                KeyDirEntry {
                    file_id: merge_id,
                    value_sz: entry.value_sz,
                    value_pos: write_pos as u32,
                    timestamp: entry.timestamp,
                },
            );

            write_pos += rec_len;
            rep.records_copied += 1;
            rep.bytes_copied += rec_len;
        }

        // Выход на диск до удаления исходников.
        mergef
            .sync_all()
            .with_context(|| format!("fsync merge data file {}", dpath.display()))?;
        hintf
            .sync_all()
            .with_context(|| format!("fsync merge hint file {}", hpath.display()))?;

        for fid in &merge_set {
            let path = files::data_path(&self.root, *fid);
            fs::remove_file(&path)
                .with_context(|| format!("remove merged data file {}", path.display()))?;
        }
        let _ = fsync_dir(&self.root); // best-effort

        rep.merge_file_id = Some(merge_id);
        record_merge(rep.records_copied, rep.bytes_copied, merge_set.len() as u64);
        info!(
            "merged {} data files into {} ({} records, {} B)",
            rep.source_files, merge_id, rep.records_copied, rep.bytes_copied
        );
        Ok(rep)
    }
}
