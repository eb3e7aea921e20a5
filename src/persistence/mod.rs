//! Persistence layer for saving and loading range-forge indexes.
//!
//! An index file is a fixed 24-byte header followed by a bincode-encoded
//! payload. The header carries magic bytes, a format version, the index
//! type, and a CRC32 checksum of the payload, so foreign and corrupted
//! files are rejected before deserialization is attempted.
//!
//! # File Format
//!
//! ```text
//! [MAGIC 8B "RANGEFG\0"][VERSION u32][INDEX_TYPE u32][RESERVED u32][CHECKSUM u32]
//! [PAYLOAD bincode]
//! ```
//!
//! Vectors are not part of the file; the search side re-attaches the vector
//! data and cross-checks point count and dimension against the payload.

mod format;

pub use format::{FileHeader, IndexType, FORMAT_VERSION, MAGIC};

use crate::error::{RangeForgeError, Result};
use std::io::Write;
use std::path::Path;

/// Write header and payload to file.
pub(crate) fn write_with_header(
    path: impl AsRef<Path>,
    index_type: IndexType,
    payload: &[u8],
) -> Result<()> {
    let checksum = crc32fast::hash(payload);
    let header = FileHeader::new(index_type, checksum);

    let mut file = std::fs::File::create(path)?;
    file.write_all(&header.to_bytes())?;
    file.write_all(payload)?;
    file.sync_all()?;

    Ok(())
}

/// Read a file, verify its header and checksum, and return the payload.
pub(crate) fn read_verified(
    path: impl AsRef<Path>,
    expected_type: IndexType,
) -> Result<Vec<u8>> {
    let data = std::fs::read(path)?;
    if data.len() < FileHeader::SIZE {
        return Err(RangeForgeError::invalid_format("file too small for header"));
    }

    let header = FileHeader::from_bytes(&data[..FileHeader::SIZE])?;
    header.verify(expected_type)?;

    let payload = &data[FileHeader::SIZE..];
    if crc32fast::hash(payload) != header.checksum {
        return Err(RangeForgeError::ChecksumMismatch);
    }

    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.rfg");

        let payload = b"some serialized payload";
        write_with_header(&path, IndexType::RangeGraph, payload).unwrap();
        let read = read_verified(&path, IndexType::RangeGraph).unwrap();
        assert_eq!(read, payload);
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.rfg");

        write_with_header(&path, IndexType::RangeGraph, b"payload").unwrap();
        let mut data = std::fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        std::fs::write(&path, &data).unwrap();

        assert!(matches!(
            read_verified(&path, IndexType::RangeGraph),
            Err(RangeForgeError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.rfg");
        std::fs::write(&path, b"short").unwrap();

        assert!(matches!(
            read_verified(&path, IndexType::RangeGraph),
            Err(RangeForgeError::InvalidFormat(_))
        ));
    }
}
