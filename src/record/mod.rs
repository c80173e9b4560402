//! record — кодек записей data- и hint-файлов.
//!
//! Два формата записей (LE, без фрейминга сверх длин из заголовка):
//! - data: [timestamp u32][ksz u32][vsz u32][key ksz][value vsz] — заголовок 12 байт;
//! - hint: [timestamp u32][ksz u32][vsz u32][value_pos u32][key ksz] — заголовок 16 байт.
//!
//! Разделение по подмодулям:
//! - encode.rs — построение записи одним буфером точного размера;
//! - read.rs   — разбор заголовков и последовательное чтение из файла
//!   (частичный хвост → Ok(None), как EOF по трактовке).

mod encode;
mod read;

pub use encode::{encode_data_record, encode_hint_record};
pub use read::{
    decode_data_header, decode_hint_header, read_data_head_at, read_hint_record_at, read_value_at,
    DataRecordHead, HintRecord,
};
