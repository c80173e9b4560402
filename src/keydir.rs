//! keydir — in-memory индекс: ключ → локатор записи на диске.
//!
//! Семантика:
//! - Ключи уникальны, последняя запись побеждает (upsert).
//! - value_sz == 0 — маркер удаления на уровне индекса; сам keydir
//!   его не интерпретирует, фильтрацию живых ключей делает движок.
//! - Порядок итерации не определён; персистентности нет — индекс
//!   перестраивается при каждом открытии.

use std::collections::HashMap;

/// Локатор записи: где на диске лежит актуальное значение ключа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDirEntry {
    pub file_id: u32,
    pub value_sz: u32,
    /// Смещение начала заголовка записи в <file_id>.data.
    pub value_pos: u32,
    pub timestamp: u32,
}

#[derive(Debug, Default)]
pub struct KeyDir {
    map: HashMap<Vec<u8>, KeyDirEntry>,
}

impl KeyDir {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &[u8]) -> Option<&KeyDirEntry> {
        self.map.get(key)
    }

    #[inline]
    pub fn upsert(&mut self, key: &[u8], entry: KeyDirEntry) {
        self.map.insert(key.to_vec(), entry);
    }

    #[inline]
    pub fn remove(&mut self, key: &[u8]) -> Option<KeyDirEntry> {
        self.map.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Снимок всех ключей индекса (включая tombstone-локаторы).
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.map.keys().cloned().collect()
    }

    /// Обойти все пары (ключ, локатор).
    #[inline]
    pub fn for_each<F: FnMut(&[u8], &KeyDirEntry)>(&self, mut f: F) {
        for (k, e) in self.map.iter() {
            f(k.as_slice(), e);
        }
    }
}
