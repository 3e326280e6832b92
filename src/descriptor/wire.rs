//! Wire codec for descriptor-set blobs.
//!
//! A descriptor-set blob is a sequence of length-delimited file descriptors under
//! field 1. The codec stays shallow on purpose: each file descriptor is kept as raw
//! bytes and only its name (field 1 of the nested message) is decoded, which is all
//! that aggregation needs for dedup and ignore filtering. Re-emission writes the raw
//! bytes back untouched, so merged output is byte-faithful to what the compiler
//! produced.

use std::io::Write;

/// One file descriptor from a descriptor-set blob: its file name plus the raw
/// encoded message bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub data: Vec<u8>,
}

const WIRE_VARINT: u64 = 0;
const WIRE_FIXED64: u64 = 1;
const WIRE_LEN: u64 = 2;
const WIRE_FIXED32: u64 = 5;

/// Field number of the repeated file-descriptor entry in a descriptor set, and of
/// the name string within each entry.
const FIELD_FILE: u64 = 1;
const FIELD_NAME: u64 = 1;

/// Parse a descriptor-set blob into its file entries, in blob order.
/// Unknown top-level fields are skipped; truncated input is an error.
pub fn parse_set(blob: &[u8]) -> Result<Vec<FileEntry>, String> {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos < blob.len() {
        let (key, next) = read_varint(blob, pos)?;
        pos = next;
        let field = key >> 3;
        let wire_type = key & 0x7;

        if field == FIELD_FILE && wire_type == WIRE_LEN {
            let (data, next) = read_len_delimited(blob, pos)?;
            pos = next;
            let name = file_name(data)?;
            entries.push(FileEntry {
                name,
                data: data.to_vec(),
            });
        } else {
            pos = skip_field(blob, pos, wire_type)?;
        }
    }

    Ok(entries)
}

/// Serialize file entries back into descriptor-set wire form.
pub fn write_set<W: Write>(entries: &[FileEntry], writer: &mut W) -> Result<(), String> {
    for entry in entries {
        let mut buf = Vec::with_capacity(entry.data.len() + 11);
        write_varint(&mut buf, (FIELD_FILE << 3) | WIRE_LEN);
        write_varint(&mut buf, entry.data.len() as u64);
        buf.extend_from_slice(&entry.data);
        writer
            .write_all(&buf)
            .map_err(|e| format!("descriptor write error: {}", e))?;
    }
    Ok(())
}

/// Build a minimal file entry carrying only a name. Used for the synthetic
/// schema-description entry a merged set always carries.
pub fn name_only_entry(name: &str) -> FileEntry {
    let mut data = Vec::with_capacity(name.len() + 2);
    write_varint(&mut data, (FIELD_NAME << 3) | WIRE_LEN);
    write_varint(&mut data, name.len() as u64);
    data.extend_from_slice(name.as_bytes());
    FileEntry {
        name: name.to_string(),
        data,
    }
}

/// Extract the file name (nested field 1, length-delimited) from a raw file
/// descriptor message.
fn file_name(data: &[u8]) -> Result<String, String> {
    let mut pos = 0usize;
    while pos < data.len() {
        let (key, next) = read_varint(data, pos)?;
        pos = next;
        let field = key >> 3;
        let wire_type = key & 0x7;

        if field == FIELD_NAME && wire_type == WIRE_LEN {
            let (bytes, _) = read_len_delimited(data, pos)?;
            return String::from_utf8(bytes.to_vec())
                .map_err(|e| format!("file descriptor name is not UTF-8: {}", e));
        }
        pos = skip_field(data, pos, wire_type)?;
    }
    Err("file descriptor has no name field".to_string())
}

fn read_varint(buf: &[u8], mut pos: usize) -> Result<(u64, usize), String> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = *buf
            .get(pos)
            .ok_or_else(|| "truncated varint in descriptor blob".to_string())?;
        pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
        shift += 7;
        if shift >= 64 {
            return Err("varint overflow in descriptor blob".to_string());
        }
    }
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn read_len_delimited(buf: &[u8], pos: usize) -> Result<(&[u8], usize), String> {
    let (len, pos) = read_varint(buf, pos)?;
    let len = usize::try_from(len).map_err(|_| "length overflow in descriptor blob".to_string())?;
    let end = pos
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| "truncated length-delimited field in descriptor blob".to_string())?;
    Ok((&buf[pos..end], end))
}

fn skip_field(buf: &[u8], pos: usize, wire_type: u64) -> Result<usize, String> {
    match wire_type {
        WIRE_VARINT => {
            let (_, pos) = read_varint(buf, pos)?;
            Ok(pos)
        }
        WIRE_FIXED64 => skip_bytes(buf, pos, 8),
        WIRE_LEN => {
            let (_, pos) = read_len_delimited(buf, pos)?;
            Ok(pos)
        }
        WIRE_FIXED32 => skip_bytes(buf, pos, 4),
        other => Err(format!("unsupported wire type {} in descriptor blob", other)),
    }
}

fn skip_bytes(buf: &[u8], pos: usize, count: usize) -> Result<usize, String> {
    pos.checked_add(count)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| "truncated fixed-width field in descriptor blob".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a blob holding the given entries, the way a compiler would.
    fn encode_set(entries: &[FileEntry]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_set(entries, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_parse_empty_blob() {
        assert!(parse_set(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_order_and_bytes() {
        let entries = vec![
            name_only_entry("a.proto"),
            name_only_entry("sub/b.proto"),
            name_only_entry("c.proto"),
        ];
        let blob = encode_set(&entries);
        let parsed = parse_set(&blob).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_name_extraction_skips_leading_fields() {
        // Entry with an unknown varint field 9 before the name.
        let mut data = Vec::new();
        write_varint(&mut data, (9 << 3) | WIRE_VARINT);
        write_varint(&mut data, 300);
        let stub = name_only_entry("x.proto");
        data.extend_from_slice(&stub.data);

        let mut blob = Vec::new();
        write_varint(&mut blob, (FIELD_FILE << 3) | WIRE_LEN);
        write_varint(&mut blob, data.len() as u64);
        blob.extend_from_slice(&data);

        let parsed = parse_set(&blob).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "x.proto");
    }

    #[test]
    fn test_unknown_top_level_fields_skipped() {
        let mut blob = Vec::new();
        // field 7, fixed32
        write_varint(&mut blob, (7 << 3) | WIRE_FIXED32);
        blob.extend_from_slice(&[1, 2, 3, 4]);
        let entry = name_only_entry("y.proto");
        let mut rest = Vec::new();
        write_set(std::slice::from_ref(&entry), &mut rest).unwrap();
        blob.extend_from_slice(&rest);

        let parsed = parse_set(&blob).unwrap();
        assert_eq!(parsed, vec![entry]);
    }

    #[test]
    fn test_truncated_blob_is_error() {
        let blob = encode_set(&[name_only_entry("z.proto")]);
        let err = parse_set(&blob[..blob.len() - 1]).unwrap_err();
        assert!(err.contains("truncated"), "unexpected error: {}", err);
    }

    #[test]
    fn test_missing_name_is_error() {
        // Entry whose only field is an unknown varint: no name to key on.
        let mut data = Vec::new();
        write_varint(&mut data, (4 << 3) | WIRE_VARINT);
        write_varint(&mut data, 1);
        let mut blob = Vec::new();
        write_varint(&mut blob, (FIELD_FILE << 3) | WIRE_LEN);
        write_varint(&mut blob, data.len() as u64);
        blob.extend_from_slice(&data);

        assert!(parse_set(&blob).is_err());
    }

    #[test]
    fn test_group_wire_type_rejected() {
        let mut blob = Vec::new();
        write_varint(&mut blob, (2 << 3) | 3); // start-group
        assert!(parse_set(&blob).is_err());
    }

    #[test]
    fn test_large_varint_roundtrip() {
        let mut buf = Vec::new();
        write_varint(&mut buf, u64::MAX);
        let (value, pos) = read_varint(&buf, 0).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(pos, buf.len());
    }
}
