//! files — раскладка каталога хранилища: имена файлов, перечисление, порядок.
//!
//! Правила:
//! - Валидные имена — строго <u32-десятичный>.data и <u32-десятичный>.hint;
//!   всё остальное (включая LOCK) при скане пропускается и merge не трогается.
//! - Отсутствующий каталог создаётся, скан возвращает пустой список.
//! - Результат отсортирован по id по возрастанию, стабильно.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::{DATA_EXT, HINT_EXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Data,
    Hint,
}

#[derive(Debug, Clone)]
pub struct StoreFile {
    pub id: u32,
    pub kind: FileKind,
    pub path: PathBuf,
}

#[inline]
pub fn data_path(root: &Path, id: u32) -> PathBuf {
    root.join(format!("{}.{}", id, DATA_EXT))
}

#[inline]
pub fn hint_path(root: &Path, id: u32) -> PathBuf {
    root.join(format!("{}.{}", id, HINT_EXT))
}

/// Разобрать имя файла как <id>.<kind>. Имена вне грамматики → None.
fn parse_name(name: &str) -> Option<(u32, FileKind)> {
    let (id_part, ext) = name.split_once('.')?;
    let kind = match ext {
        DATA_EXT => FileKind::Data,
        HINT_EXT => FileKind::Hint,
        _ => return None,
    };
    // u32::from_str принимает "+7" и ведущие нули; имена пишем только мы,
    // но чужие строки с '+' отфильтруем явно.
    if id_part.is_empty() || id_part.starts_with('+') {
        return None;
    }
    let id: u32 = id_part.parse().ok()?;
    Some((id, kind))
}

/// Перечислить файлы хранилища в каталоге root.
///
/// Создаёт каталог, если его нет. Подкаталоги и посторонние имена
/// пропускаются. Список отсортирован по id по возрастанию (стабильно:
/// data/hint одного id остаются в порядке перечисления ОС).
pub fn scan_store_dir(root: &Path) -> Result<Vec<StoreFile>> {
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("create store directory {}", root.display()))?;
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("read store directory {}", root.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some((id, kind)) = parse_name(name) {
            out.push(StoreFile {
                id,
                kind,
                path: entry.path(),
            });
        }
    }

    out.sort_by_key(|f| f.id);
    Ok(out)
}
