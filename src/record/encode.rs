//! record/encode — построение записей data/hint одним буфером точного размера.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{
    DATA_HDR_SIZE, DATA_OFF_KSZ, DATA_OFF_TS, DATA_OFF_VSZ, HINT_HDR_SIZE, HINT_OFF_KSZ,
    HINT_OFF_TS, HINT_OFF_VPOS, HINT_OFF_VSZ,
};

/// Закодировать data-запись: [timestamp][ksz][vsz][key][value].
///
/// Пустой ключ запрещён форматом; tombstone — это запись с пустым value.
pub fn encode_data_record(timestamp: u32, key: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(anyhow!("empty key is not encodable"));
    }
    if key.len() > u32::MAX as usize {
        return Err(anyhow!("key too long for record format: {} bytes", key.len()));
    }
    if value.len() > u32::MAX as usize {
        return Err(anyhow!(
            "value too long for record format: {} bytes",
            value.len()
        ));
    }

    let mut buf = vec![0u8; DATA_HDR_SIZE + key.len() + value.len()];
    LittleEndian::write_u32(&mut buf[DATA_OFF_TS..DATA_OFF_TS + 4], timestamp);
    LittleEndian::write_u32(&mut buf[DATA_OFF_KSZ..DATA_OFF_KSZ + 4], key.len() as u32);
    LittleEndian::write_u32(&mut buf[DATA_OFF_VSZ..DATA_OFF_VSZ + 4], value.len() as u32);
    buf[DATA_HDR_SIZE..DATA_HDR_SIZE + key.len()].copy_from_slice(key);
    buf[DATA_HDR_SIZE + key.len()..].copy_from_slice(value);
    Ok(buf)
}

/// Закодировать hint-запись: [timestamp][ksz][vsz][value_pos][key].
///
/// value_sz здесь — длина значения в data-файле; сами байты значения
/// в hint не попадают.
pub fn encode_hint_record(
    timestamp: u32,
    key: &[u8],
    value_sz: u32,
    value_pos: u32,
) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(anyhow!("empty key is not encodable"));
    }
    if key.len() > u32::MAX as usize {
        return Err(anyhow!("key too long for record format: {} bytes", key.len()));
    }

    let mut buf = vec![0u8; HINT_HDR_SIZE + key.len()];
    LittleEndian::write_u32(&mut buf[HINT_OFF_TS..HINT_OFF_TS + 4], timestamp);
    LittleEndian::write_u32(&mut buf[HINT_OFF_KSZ..HINT_OFF_KSZ + 4], key.len() as u32);
    LittleEndian::write_u32(&mut buf[HINT_OFF_VSZ..HINT_OFF_VSZ + 4], value_sz);
    LittleEndian::write_u32(&mut buf[HINT_OFF_VPOS..HINT_OFF_VPOS + 4], value_pos);
    buf[HINT_HDR_SIZE..].copy_from_slice(key);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{decode_data_header, decode_hint_header};

    #[test]
    fn data_record_layout() {
        let buf = encode_data_record(7, b"alpha", b"12").unwrap();
        assert_eq!(buf.len(), DATA_HDR_SIZE + 5 + 2);
        let (ts, ksz, vsz) = decode_data_header(&buf).unwrap();
        assert_eq!((ts, ksz, vsz), (7, 5, 2));
        assert_eq!(&buf[12..17], b"alpha");
        assert_eq!(&buf[17..], b"12");
    }

    #[test]
    fn data_tombstone_has_no_value_bytes() {
        let buf = encode_data_record(1, b"k", &[]).unwrap();
        assert_eq!(buf.len(), DATA_HDR_SIZE + 1);
        let (_, _, vsz) = decode_data_header(&buf).unwrap();
        assert_eq!(vsz, 0);
    }

    #[test]
    fn hint_record_layout() {
        let buf = encode_hint_record(9, b"key", 44, 1024).unwrap();
        assert_eq!(buf.len(), HINT_HDR_SIZE + 3);
        let (ts, ksz, vsz, vpos) = decode_hint_header(&buf).unwrap();
        assert_eq!((ts, ksz, vsz, vpos), (9, 3, 44, 1024));
        assert_eq!(&buf[16..], b"key");
    }

    #[test]
    fn empty_key_rejected() {
        assert!(encode_data_record(1, b"", b"v").is_err());
        assert!(encode_hint_record(1, b"", 1, 0).is_err());
    }
}
