//! record/read — разбор заголовков и последовательное чтение записей из файла.
//!
//! Поведение (как у любого append-only лога без контрольных сумм):
//! - Частичный хвост (неполный заголовок либо тело короче заявленных длин)
//!   → Ok(None); решение "чистый EOF или обрыв" принимает вызывающий код,
//!   сравнивая позицию с длиной файла.
//! - ksz == 0 в разобранном заголовке легальный энкодер не выдаёт —
//!   это повреждение, возвращается Err.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::consts::{
    DATA_HDR_SIZE, DATA_OFF_KSZ, DATA_OFF_TS, DATA_OFF_VSZ, HINT_HDR_SIZE, HINT_OFF_KSZ,
    HINT_OFF_TS, HINT_OFF_VPOS, HINT_OFF_VSZ,
};

/// Заголовок и ключ одной data-записи (без байтов значения — скан индекса
/// значения не читает, только перешагивает).
#[derive(Debug)]
pub struct DataRecordHead {
    pub timestamp: u32,
    pub key: Vec<u8>,
    pub value_sz: u32,
    /// Позиция начала заголовка записи в файле.
    pub pos: u64,
    /// Общий размер записи (заголовок + ключ + значение).
    pub len_total: u64,
}

/// Одна hint-запись, считанная с диска.
#[derive(Debug)]
pub struct HintRecord {
    pub timestamp: u32,
    pub key: Vec<u8>,
    pub value_sz: u32,
    pub value_pos: u32,
    pub pos: u64,
    pub len_total: u64,
}

/// Разобрать заголовок data-записи. Буфер короче 12 байт отвергается.
pub fn decode_data_header(buf: &[u8]) -> Result<(u32, u32, u32)> {
    if buf.len() < DATA_HDR_SIZE {
        return Err(anyhow!(
            "data record header needs {} bytes, got {}",
            DATA_HDR_SIZE,
            buf.len()
        ));
    }
    let ts = LittleEndian::read_u32(&buf[DATA_OFF_TS..DATA_OFF_TS + 4]);
    let ksz = LittleEndian::read_u32(&buf[DATA_OFF_KSZ..DATA_OFF_KSZ + 4]);
    let vsz = LittleEndian::read_u32(&buf[DATA_OFF_VSZ..DATA_OFF_VSZ + 4]);
    Ok((ts, ksz, vsz))
}

/// Разобрать заголовок hint-записи. Буфер короче 16 байт отвергается.
pub fn decode_hint_header(buf: &[u8]) -> Result<(u32, u32, u32, u32)> {
    if buf.len() < HINT_HDR_SIZE {
        return Err(anyhow!(
            "hint record header needs {} bytes, got {}",
            HINT_HDR_SIZE,
            buf.len()
        ));
    }
    let ts = LittleEndian::read_u32(&buf[HINT_OFF_TS..HINT_OFF_TS + 4]);
    let ksz = LittleEndian::read_u32(&buf[HINT_OFF_KSZ..HINT_OFF_KSZ + 4]);
    let vsz = LittleEndian::read_u32(&buf[HINT_OFF_VSZ..HINT_OFF_VSZ + 4]);
    let vpos = LittleEndian::read_u32(&buf[HINT_OFF_VPOS..HINT_OFF_VPOS + 4]);
    Ok((ts, ksz, vsz, vpos))
}

/// Считать заголовок и ключ data-записи с позиции pos; значение перешагнуть.
///
/// Возвращает:
/// - Ok(Some((head, next_pos))) — запись прочитана;
/// - Ok(None) — частичный хвост (EOF по трактовке);
/// - Err(e) — I/O или ksz == 0 (повреждение).
pub fn read_data_head_at(
    f: &mut File,
    pos: u64,
    file_len: u64,
) -> Result<Option<(DataRecordHead, u64)>> {
    if pos + (DATA_HDR_SIZE as u64) > file_len {
        return Ok(None);
    }

    f.seek(SeekFrom::Start(pos))?;
    let mut hdr = [0u8; DATA_HDR_SIZE];
    if let Err(e) = f.read_exact(&mut hdr) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("data record header read at {}: {}", pos, e));
    }

    let (timestamp, ksz, vsz) = decode_data_header(&hdr)?;
    if ksz == 0 {
        return Err(anyhow!("corrupt data record at {}: ksz == 0", pos));
    }

    let len_total = DATA_HDR_SIZE as u64 + ksz as u64 + vsz as u64;
    let next_pos = pos + len_total;
    if next_pos > file_len {
        // Тело короче заявленных длин — обрыв.
        return Ok(None);
    }

    let mut key = vec![0u8; ksz as usize];
    if let Err(e) = f.read_exact(&mut key) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("data record key read at {}: {}", pos, e));
    }

    Ok(Some((
        DataRecordHead {
            timestamp,
            key,
            value_sz: vsz,
            pos,
            len_total,
        },
        next_pos,
    )))
}

/// Считать одну hint-запись с позиции pos.
///
/// Возвращает Ok(None) на частичном хвосте, Err при ksz == 0 или I/O.
pub fn read_hint_record_at(
    f: &mut File,
    pos: u64,
    file_len: u64,
) -> Result<Option<(HintRecord, u64)>> {
    if pos + (HINT_HDR_SIZE as u64) > file_len {
        return Ok(None);
    }

    f.seek(SeekFrom::Start(pos))?;
    let mut hdr = [0u8; HINT_HDR_SIZE];
    if let Err(e) = f.read_exact(&mut hdr) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("hint record header read at {}: {}", pos, e));
    }

    let (timestamp, ksz, vsz, vpos) = decode_hint_header(&hdr)?;
    if ksz == 0 {
        return Err(anyhow!("corrupt hint record at {}: ksz == 0", pos));
    }

    let len_total = HINT_HDR_SIZE as u64 + ksz as u64;
    let next_pos = pos + len_total;
    if next_pos > file_len {
        return Ok(None);
    }

    let mut key = vec![0u8; ksz as usize];
    if let Err(e) = f.read_exact(&mut key) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("hint record key read at {}: {}", pos, e));
    }

    Ok(Some((
        HintRecord {
            timestamp,
            key,
            value_sz: vsz,
            value_pos: vpos,
            pos,
            len_total,
        },
        next_pos,
    )))
}

/// Прочитать ровно value_sz байт значения записи, чей заголовок начинается
/// в value_pos (значение лежит после заголовка и ключа).
pub fn read_value_at(f: &mut File, value_pos: u32, ksz: usize, value_sz: u32) -> Result<Vec<u8>> {
    let off = value_pos as u64 + DATA_HDR_SIZE as u64 + ksz as u64;
    f.seek(SeekFrom::Start(off))?;
    let mut val = vec![0u8; value_sz as usize];
    f.read_exact(&mut val)
        .map_err(|e| anyhow!("value read at {}: {}", off, e))?;
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{encode_data_record, encode_hint_record};
    use std::io::Write;

    fn tmp_file(name: &str, bytes: &[u8]) -> (std::path::PathBuf, File) {
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("caskdb-rec-{}-{}-{}", name, pid, t));
        let mut f = std::fs::OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        f.write_all(bytes).unwrap();
        (path, f)
    }

    #[test]
    fn short_buffers_refused() {
        assert!(decode_data_header(&[0u8; 11]).is_err());
        assert!(decode_hint_header(&[0u8; 15]).is_err());
        assert!(decode_data_header(&[0u8; 12]).is_ok());
    }

    #[test]
    fn data_scan_walks_records_and_stops_at_eof() {
        let mut bytes = encode_data_record(1, b"a", b"one").unwrap();
        bytes.extend(encode_data_record(2, b"bb", b"two").unwrap());
        let (path, mut f) = tmp_file("walk", &bytes);
        let len = bytes.len() as u64;

        let (r1, p1) = read_data_head_at(&mut f, 0, len).unwrap().unwrap();
        assert_eq!(r1.key, b"a");
        assert_eq!(r1.value_sz, 3);
        assert_eq!(r1.pos, 0);

        let (r2, p2) = read_data_head_at(&mut f, p1, len).unwrap().unwrap();
        assert_eq!(r2.key, b"bb");
        assert_eq!(r2.timestamp, 2);

        assert!(read_data_head_at(&mut f, p2, len).unwrap().is_none());
        assert_eq!(p2, len);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn torn_tail_is_none_not_err() {
        let mut bytes = encode_data_record(1, b"key", b"value").unwrap();
        bytes.truncate(bytes.len() - 3);
        let (path, mut f) = tmp_file("torn", &bytes);
        let got = read_data_head_at(&mut f, 0, bytes.len() as u64).unwrap();
        assert!(got.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn zero_ksz_is_corruption() {
        let (path, mut f) = tmp_file("zeroksz", &[0u8; 12]);
        assert!(read_data_head_at(&mut f, 0, 12).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn value_read_skips_header_and_key() {
        let bytes = encode_data_record(1, b"kk", b"payload").unwrap();
        let (path, mut f) = tmp_file("val", &bytes);
        let v = read_value_at(&mut f, 0, 2, 7).unwrap();
        assert_eq!(v, b"payload");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn hint_roundtrip_via_file() {
        let bytes = encode_hint_record(5, b"alpha", 10, 300).unwrap();
        let (path, mut f) = tmp_file("hint", &bytes);
        let (h, next) = read_hint_record_at(&mut f, 0, bytes.len() as u64)
            .unwrap()
            .unwrap();
        assert_eq!(h.key, b"alpha");
        assert_eq!(h.value_sz, 10);
        assert_eq!(h.value_pos, 300);
        assert_eq!(next, bytes.len() as u64);
        let _ = std::fs::remove_file(path);
    }
}
