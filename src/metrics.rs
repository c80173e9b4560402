//! Lightweight global metrics for CaskDB.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - put/get/delete
//! - Ротация активного файла
//! - Merge (скопированные записи/байты, удалённые файлы)
//! - Построение индекса (файлы, записи, использованные hint, оборванные хвосты)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- KV -----
static PUT_RECORDS: AtomicU64 = AtomicU64::new(0);
static PUT_BYTES: AtomicU64 = AtomicU64::new(0);
static GET_HITS: AtomicU64 = AtomicU64::new(0);
static GET_MISSES: AtomicU64 = AtomicU64::new(0);
static DEL_TOMBSTONES: AtomicU64 = AtomicU64::new(0);

// ----- Rotation -----
static ROTATIONS: AtomicU64 = AtomicU64::new(0);

// ----- Merge -----
static MERGE_RUNS: AtomicU64 = AtomicU64::new(0);
static MERGE_RECORDS_COPIED: AtomicU64 = AtomicU64::new(0);
static MERGE_BYTES_COPIED: AtomicU64 = AtomicU64::new(0);
static MERGE_FILES_REMOVED: AtomicU64 = AtomicU64::new(0);

// ----- Index build -----
static INDEX_FILES_SCANNED: AtomicU64 = AtomicU64::new(0);
static INDEX_HINTS_USED: AtomicU64 = AtomicU64::new(0);
static INDEX_RECORDS_SEEN: AtomicU64 = AtomicU64::new(0);
static INDEX_TORN_TAILS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub put_records: u64,
    pub put_bytes: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub del_tombstones: u64,

    pub rotations: u64,

    pub merge_runs: u64,
    pub merge_records_copied: u64,
    pub merge_bytes_copied: u64,
    pub merge_files_removed: u64,

    pub index_files_scanned: u64,
    pub index_hints_used: u64,
    pub index_records_seen: u64,
    pub index_torn_tails: u64,
}

// ----- record_* helpers -----

#[inline]
pub fn record_put(bytes: u64) {
    PUT_RECORDS.fetch_add(1, Ordering::Relaxed);
    PUT_BYTES.fetch_add(bytes, Ordering::Relaxed);
}

#[inline]
pub fn record_get_hit() {
    GET_HITS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_get_miss() {
    GET_MISSES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_del_tombstone() {
    DEL_TOMBSTONES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_rotation() {
    ROTATIONS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn record_merge(records: u64, bytes: u64, files_removed: u64) {
    MERGE_RUNS.fetch_add(1, Ordering::Relaxed);
    MERGE_RECORDS_COPIED.fetch_add(records, Ordering::Relaxed);
    MERGE_BYTES_COPIED.fetch_add(bytes, Ordering::Relaxed);
    MERGE_FILES_REMOVED.fetch_add(files_removed, Ordering::Relaxed);
}

#[inline]
pub fn record_index_file(hint_used: bool) {
    INDEX_FILES_SCANNED.fetch_add(1, Ordering::Relaxed);
    if hint_used {
        INDEX_HINTS_USED.fetch_add(1, Ordering::Relaxed);
    }
}

#[inline]
pub fn record_index_records(n: u64) {
    INDEX_RECORDS_SEEN.fetch_add(n, Ordering::Relaxed);
}

#[inline]
pub fn record_index_torn_tail() {
    INDEX_TORN_TAILS.fetch_add(1, Ordering::Relaxed);
}

/// Снять снапшот всех счётчиков.
pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        put_records: PUT_RECORDS.load(Ordering::Relaxed),
        put_bytes: PUT_BYTES.load(Ordering::Relaxed),
        get_hits: GET_HITS.load(Ordering::Relaxed),
        get_misses: GET_MISSES.load(Ordering::Relaxed),
        del_tombstones: DEL_TOMBSTONES.load(Ordering::Relaxed),

        rotations: ROTATIONS.load(Ordering::Relaxed),

        merge_runs: MERGE_RUNS.load(Ordering::Relaxed),
        merge_records_copied: MERGE_RECORDS_COPIED.load(Ordering::Relaxed),
        merge_bytes_copied: MERGE_BYTES_COPIED.load(Ordering::Relaxed),
        merge_files_removed: MERGE_FILES_REMOVED.load(Ordering::Relaxed),

        index_files_scanned: INDEX_FILES_SCANNED.load(Ordering::Relaxed),
        index_hints_used: INDEX_HINTS_USED.load(Ordering::Relaxed),
        index_records_seen: INDEX_RECORDS_SEEN.load(Ordering::Relaxed),
        index_torn_tails: INDEX_TORN_TAILS.load(Ordering::Relaxed),
    }
}

/// Сбросить все счётчики в ноль (для тестов и бенчей).
pub fn reset_metrics() {
    PUT_RECORDS.store(0, Ordering::Relaxed);
    PUT_BYTES.store(0, Ordering::Relaxed);
    GET_HITS.store(0, Ordering::Relaxed);
    GET_MISSES.store(0, Ordering::Relaxed);
    DEL_TOMBSTONES.store(0, Ordering::Relaxed);
    ROTATIONS.store(0, Ordering::Relaxed);
    MERGE_RUNS.store(0, Ordering::Relaxed);
    MERGE_RECORDS_COPIED.store(0, Ordering::Relaxed);
    MERGE_BYTES_COPIED.store(0, Ordering::Relaxed);
    MERGE_FILES_REMOVED.store(0, Ordering::Relaxed);
    INDEX_FILES_SCANNED.store(0, Ordering::Relaxed);
    INDEX_HINTS_USED.store(0, Ordering::Relaxed);
    INDEX_RECORDS_SEEN.store(0, Ordering::Relaxed);
    INDEX_TORN_TAILS.store(0, Ordering::Relaxed);
}
