//! Общие константы формата хранилища (data/hint файлы, каталог).

// -------- Имена файлов --------
// В каталоге хранилища живут только <u32>.data, <u32>.hint и служебный LOCK.
pub const DATA_EXT: &str = "data";
pub const HINT_EXT: &str = "hint";
pub const LOCK_FILE: &str = "LOCK";

// -------- Data-файл --------
// Формат записи (LE, без magic и контрольных сумм):
// [timestamp u32][ksz u32][vsz u32][key ksz][value vsz]
//
// Total header size = 4 + 4 + 4 = 12 bytes.
pub const DATA_HDR_SIZE: usize = 12;

// Offsets inside record header
pub const DATA_OFF_TS: usize = 0;
pub const DATA_OFF_KSZ: usize = 4;
pub const DATA_OFF_VSZ: usize = 8;

// -------- Hint-файл --------
// Формат записи (LE):
// [timestamp u32][ksz u32][vsz u32][value_pos u32][key ksz]
//
// value_pos указывает на начало заголовка записи в одноимённом data-файле.
// Total header size = 4 + 4 + 4 + 4 = 16 bytes.
pub const HINT_HDR_SIZE: usize = 16;

pub const HINT_OFF_TS: usize = 0;
pub const HINT_OFF_KSZ: usize = 4;
pub const HINT_OFF_VSZ: usize = 8;
pub const HINT_OFF_VPOS: usize = 12;

// -------- Ротация --------
// Порог размера активного файла по умолчанию; put, который превысил бы порог,
// сначала выполняет ротацию (запись впритык допустима).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 32 * 1024 * 1024;
