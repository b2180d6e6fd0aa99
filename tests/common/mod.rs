//! Shared helpers for integration tests.
//!
//! Contains a minimal central-directory parser so tests can re-open
//! what they wrote and assert on the records a real ZIP reader would
//! see.

#![allow(dead_code)]

use std::io::Read;

/// ZIP UTF-8 name flag (general-purpose bit 11).
pub const FLAG_UTF8: u16 = 0x0800;

/// ZIP streamed-entry flag (general-purpose bit 3).
pub const FLAG_STREAMED: u16 = 0x0008;

/// A central directory file header as read back from archive bytes.
pub struct CentralEntry {
    pub name: Vec<u8>,
    pub flags: u16,
    pub method: u16,
    pub dos_time: u16,
    pub dos_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub external_attrs: u32,
    pub local_header_offset: u32,
}

impl CentralEntry {
    pub fn name_str(&self) -> &str {
        std::str::from_utf8(&self.name).expect("entry name is not UTF-8")
    }

    pub fn is_dir(&self) -> bool {
        self.name.ends_with(b"/")
    }

    pub fn has_utf8_flag(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }
}

/// The parsed tail of an archive: every central directory record plus
/// the EOCD bookkeeping fields.
pub struct ParsedArchive {
    pub entries: Vec<CentralEntry>,
    pub cd_offset: u32,
    pub cd_size: u32,
}

impl ParsedArchive {
    pub fn find(&self, name: &str) -> &CentralEntry {
        self.entries
            .iter()
            .find(|entry| entry.name_str() == name)
            .unwrap_or_else(|| {
                let names: Vec<&str> = self.entries.iter().map(|e| e.name_str()).collect();
                panic!("no entry named {name:?}; archive has {names:?}")
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name_str() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.name_str().to_string())
            .collect()
    }
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap())
}

/// Parses the central directory out of finished archive bytes.
///
/// Panics on any structural violation; tests treat a malformed tail as
/// a failure, not a condition to report.
pub fn parse_archive(data: &[u8]) -> ParsedArchive {
    assert!(data.len() >= 22, "too short to hold an EOCD record");

    // No archive comment is ever written, so the EOCD is the last 22
    // bytes.
    let eocd = data.len() - 22;
    assert_eq!(&data[eocd..eocd + 4], b"PK\x05\x06", "missing EOCD signature");
    let count = read_u16(data, eocd + 8) as usize;
    assert_eq!(
        count,
        read_u16(data, eocd + 10) as usize,
        "disk and total entry counts disagree"
    );
    let cd_size = read_u32(data, eocd + 12);
    let cd_offset = read_u32(data, eocd + 16);

    let mut entries = Vec::with_capacity(count);
    let mut pos = cd_offset as usize;
    for _ in 0..count {
        assert_eq!(
            &data[pos..pos + 4],
            b"PK\x01\x02",
            "missing central directory header signature"
        );
        let name_len = read_u16(data, pos + 28) as usize;
        let extra_len = read_u16(data, pos + 30) as usize;
        let comment_len = read_u16(data, pos + 32) as usize;

        entries.push(CentralEntry {
            flags: read_u16(data, pos + 8),
            method: read_u16(data, pos + 10),
            dos_time: read_u16(data, pos + 12),
            dos_date: read_u16(data, pos + 14),
            crc32: read_u32(data, pos + 16),
            compressed_size: read_u32(data, pos + 20),
            uncompressed_size: read_u32(data, pos + 24),
            external_attrs: read_u32(data, pos + 38),
            local_header_offset: read_u32(data, pos + 42),
            name: data[pos + 46..pos + 46 + name_len].to_vec(),
        });
        pos += 46 + name_len + extra_len + comment_len;
    }

    assert_eq!(
        pos,
        (cd_offset + cd_size) as usize,
        "central directory size does not cover its records"
    );
    ParsedArchive {
        entries,
        cd_offset,
        cd_size,
    }
}

/// Extracts and decompresses one entry's data by following its central
/// directory record back to the local header.
pub fn entry_data(data: &[u8], entry: &CentralEntry) -> Vec<u8> {
    let pos = entry.local_header_offset as usize;
    assert_eq!(
        &data[pos..pos + 4],
        b"PK\x03\x04",
        "central directory offset does not point at a local header"
    );
    let name_len = read_u16(data, pos + 26) as usize;
    let extra_len = read_u16(data, pos + 28) as usize;

    let start = pos + 30 + name_len + extra_len;
    let compressed = &data[start..start + entry.compressed_size as usize];

    if entry.method == 0 {
        return compressed.to_vec();
    }
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(compressed)
        .read_to_end(&mut out)
        .expect("entry data is not a valid deflate stream");
    out
}

/// CRC-32 of a byte slice, for comparing against archived values.
pub fn crc32_of(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
