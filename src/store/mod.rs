//! store — движок хранилища.
//!
//! Разделение по подмодулям:
//! - core.rs  — структура Store, активный файл, выделение id, ротация, close
//! - open.rs  — открытие (open / open_with_config), lock + построение индекса
//! - build.rs — построение keydir из файлов каталога (hint-предпочтительно)
//! - kv.rs    — одиночные операции (put/get/delete), list_keys/fold/sync
//! - merge.rs — офлайн-компактация неактивных data-файлов (+ hint)

pub mod build;
pub mod core;
pub mod kv;
pub mod merge;
pub mod open;

pub use self::core::Store;
pub use merge::MergeReport;
