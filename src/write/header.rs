//! ZIP record encoding.
//!
//! Byte-level encoding of the four record types a streamed archive
//! carries: local file headers, data descriptors, central directory
//! file headers, and the end-of-central-directory record. All fields
//! are little-endian; sizes and counts clamp at the ZIP32 limits
//! (there is no ZIP64 support).

use super::PendingEntry;

/// Local file header signature, `PK\x03\x04`.
pub(crate) const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4B50;

/// Data descriptor signature, `PK\x07\x08`.
pub(crate) const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4B50;

/// Central directory file header signature, `PK\x01\x02`.
pub(crate) const CENTRAL_DIR_HEADER_SIG: u32 = 0x0201_4B50;

/// End of central directory signature, `PK\x05\x06`.
pub(crate) const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4B50;

/// Version needed to extract: 2.0 (deflate, directory entries).
pub(crate) const VERSION_NEEDED: u16 = 20;

/// Version made by: host system Unix (3), tool version 3.0.
pub(crate) const VERSION_MADE_BY: u16 = 0x031E;

/// General-purpose flag bit 3: sizes and CRC follow in a descriptor.
pub(crate) const FLAG_STREAMED: u16 = 0x0008;

/// General-purpose flag bit 11: the entry name is UTF-8.
pub(crate) const FLAG_UTF8: u16 = 0x0800;

/// Saturates a 64-bit count into a ZIP32 field.
fn clamp_u32(value: u64) -> u32 {
    value.try_into().unwrap_or(u32::MAX)
}

fn clamp_u16(value: u64) -> u16 {
    value.try_into().unwrap_or(u16::MAX)
}

/// Encodes a local file header.
///
/// Streamed entries (flag bit 3) carry zero CRC and sizes here; the
/// real values follow in the data descriptor. Directory entries carry
/// their (zero) values directly and have no descriptor.
pub(crate) fn local_file_header(entry: &PendingEntry) -> Vec<u8> {
    let mut header = Vec::with_capacity(30 + entry.name.len());

    header.extend_from_slice(&LOCAL_FILE_HEADER_SIG.to_le_bytes());
    header.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
    header.extend_from_slice(&entry.flags.to_le_bytes());
    header.extend_from_slice(&entry.method.to_le_bytes());
    header.extend_from_slice(&entry.mtime.time.to_le_bytes());
    header.extend_from_slice(&entry.mtime.date.to_le_bytes());

    if entry.flags & FLAG_STREAMED != 0 {
        // CRC, compressed size, uncompressed size deferred to the
        // descriptor.
        header.extend_from_slice(&[0u8; 12]);
    } else {
        header.extend_from_slice(&entry.crc32.to_le_bytes());
        header.extend_from_slice(&clamp_u32(entry.compressed_size).to_le_bytes());
        header.extend_from_slice(&clamp_u32(entry.uncompressed_size).to_le_bytes());
    }

    header.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
    header.extend_from_slice(&0u16.to_le_bytes()); // extra field length
    header.extend_from_slice(&entry.name);

    header
}

/// Encodes a data descriptor with the signature form.
///
/// The signature is optional per the format but universally written by
/// modern tools, and readers scanning forward rely on it.
pub(crate) fn data_descriptor(entry: &PendingEntry) -> Vec<u8> {
    let mut record = Vec::with_capacity(16);
    record.extend_from_slice(&DATA_DESCRIPTOR_SIG.to_le_bytes());
    record.extend_from_slice(&entry.crc32.to_le_bytes());
    record.extend_from_slice(&clamp_u32(entry.compressed_size).to_le_bytes());
    record.extend_from_slice(&clamp_u32(entry.uncompressed_size).to_le_bytes());
    record
}

/// Encodes a central directory file header.
pub(crate) fn central_directory_header(entry: &PendingEntry) -> Vec<u8> {
    let mut header = Vec::with_capacity(46 + entry.name.len());

    header.extend_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
    header.extend_from_slice(&VERSION_MADE_BY.to_le_bytes());
    header.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
    header.extend_from_slice(&entry.flags.to_le_bytes());
    header.extend_from_slice(&entry.method.to_le_bytes());
    header.extend_from_slice(&entry.mtime.time.to_le_bytes());
    header.extend_from_slice(&entry.mtime.date.to_le_bytes());
    header.extend_from_slice(&entry.crc32.to_le_bytes());
    header.extend_from_slice(&clamp_u32(entry.compressed_size).to_le_bytes());
    header.extend_from_slice(&clamp_u32(entry.uncompressed_size).to_le_bytes());
    header.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
    header.extend_from_slice(&0u16.to_le_bytes()); // extra field length
    header.extend_from_slice(&0u16.to_le_bytes()); // comment length
    header.extend_from_slice(&0u16.to_le_bytes()); // disk number start
    header.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
    header.extend_from_slice(&entry.external_attrs.to_le_bytes());
    header.extend_from_slice(&clamp_u32(entry.local_header_offset).to_le_bytes());
    header.extend_from_slice(&entry.name);

    header
}

/// Encodes the end-of-central-directory record.
pub(crate) fn end_of_central_directory(
    entry_count: u64,
    cd_size: u64,
    cd_offset: u64,
) -> Vec<u8> {
    let mut record = Vec::with_capacity(22);

    record.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
    record.extend_from_slice(&0u16.to_le_bytes()); // this disk
    record.extend_from_slice(&0u16.to_le_bytes()); // disk with CD start
    record.extend_from_slice(&clamp_u16(entry_count).to_le_bytes());
    record.extend_from_slice(&clamp_u16(entry_count).to_le_bytes());
    record.extend_from_slice(&clamp_u32(cd_size).to_le_bytes());
    record.extend_from_slice(&clamp_u32(cd_offset).to_le_bytes());
    record.extend_from_slice(&0u16.to_le_bytes()); // comment length

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::method;
    use crate::timestamp::DosDateTime;

    fn file_entry() -> PendingEntry {
        PendingEntry {
            name: b"dir/file.txt".to_vec(),
            flags: FLAG_STREAMED,
            method: method::DEFLATE,
            mtime: DosDateTime {
                date: 0x58CF,
                time: 0x6472,
            },
            crc32: 0xDEAD_BEEF,
            compressed_size: 42,
            uncompressed_size: 100,
            local_header_offset: 0x1234,
            external_attrs: 0o644 << 16,
        }
    }

    #[test]
    fn test_local_header_streamed_defers_sizes() {
        let header = local_file_header(&file_entry());

        assert_eq!(&header[0..4], b"PK\x03\x04");
        assert_eq!(u16::from_le_bytes([header[4], header[5]]), VERSION_NEEDED);
        assert_eq!(u16::from_le_bytes([header[6], header[7]]), FLAG_STREAMED);
        assert_eq!(
            u16::from_le_bytes([header[8], header[9]]),
            method::DEFLATE
        );
        // CRC and both sizes are zero in a streamed local header.
        assert_eq!(&header[14..26], &[0u8; 12]);
        assert_eq!(u16::from_le_bytes([header[26], header[27]]), 12);
        assert_eq!(&header[30..], b"dir/file.txt");
    }

    #[test]
    fn test_local_header_directory_writes_values_inline() {
        let entry = PendingEntry {
            name: b"docs/".to_vec(),
            flags: 0,
            method: method::STORED,
            mtime: DosDateTime { date: 0, time: 0 },
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            local_header_offset: 0,
            external_attrs: 0x10,
        };
        let header = local_file_header(&entry);

        assert_eq!(u16::from_le_bytes([header[8], header[9]]), method::STORED);
        assert_eq!(&header[14..26], &[0u8; 12]);
        assert_eq!(&header[30..], b"docs/");
        assert_eq!(header.len(), 30 + 5);
    }

    #[test]
    fn test_data_descriptor_layout() {
        let record = data_descriptor(&file_entry());

        assert_eq!(record.len(), 16);
        assert_eq!(&record[0..4], b"PK\x07\x08");
        assert_eq!(
            u32::from_le_bytes(record[4..8].try_into().unwrap()),
            0xDEAD_BEEF
        );
        assert_eq!(u32::from_le_bytes(record[8..12].try_into().unwrap()), 42);
        assert_eq!(u32::from_le_bytes(record[12..16].try_into().unwrap()), 100);
    }

    #[test]
    fn test_central_directory_header_layout() {
        let header = central_directory_header(&file_entry());

        assert_eq!(&header[0..4], b"PK\x01\x02");
        assert_eq!(u16::from_le_bytes([header[4], header[5]]), VERSION_MADE_BY);
        assert_eq!(
            u32::from_le_bytes(header[16..20].try_into().unwrap()),
            0xDEAD_BEEF
        );
        assert_eq!(u32::from_le_bytes(header[20..24].try_into().unwrap()), 42);
        assert_eq!(u32::from_le_bytes(header[24..28].try_into().unwrap()), 100);
        assert_eq!(
            u32::from_le_bytes(header[38..42].try_into().unwrap()),
            0o644 << 16
        );
        assert_eq!(
            u32::from_le_bytes(header[42..46].try_into().unwrap()),
            0x1234
        );
        assert_eq!(&header[46..], b"dir/file.txt");
    }

    #[test]
    fn test_eocd_layout() {
        let record = end_of_central_directory(3, 200, 1000);

        assert_eq!(record.len(), 22);
        assert_eq!(&record[0..4], b"PK\x05\x06");
        assert_eq!(u16::from_le_bytes([record[8], record[9]]), 3);
        assert_eq!(u16::from_le_bytes([record[10], record[11]]), 3);
        assert_eq!(u32::from_le_bytes(record[12..16].try_into().unwrap()), 200);
        assert_eq!(u32::from_le_bytes(record[16..20].try_into().unwrap()), 1000);
    }

    #[test]
    fn test_counts_clamp_at_zip32_limits() {
        let record = end_of_central_directory(100_000, u64::from(u32::MAX) + 1, 0);
        assert_eq!(u16::from_le_bytes([record[8], record[9]]), u16::MAX);
        assert_eq!(
            u32::from_le_bytes(record[12..16].try_into().unwrap()),
            u32::MAX
        );
    }
}
