//! File format definitions for range-forge persistence.

use crate::error::{RangeForgeError, Result};

/// Magic bytes identifying a range-forge file: "RANGEFG\0"
pub const MAGIC: [u8; 8] = *b"RANGEFG\0";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Index type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IndexType {
    /// Range-partitioned proximity-graph index
    RangeGraph = 1,
}

impl IndexType {
    /// Convert from u32.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::RangeGraph),
            _ => None,
        }
    }
}

/// File header structure.
///
/// Total size: 24 bytes
/// ```text
/// [MAGIC 8B][VERSION u32][INDEX_TYPE u32][RESERVED u32][CHECKSUM u32]
/// ```
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// Magic bytes (must be MAGIC)
    pub magic: [u8; 8],
    /// Format version
    pub version: u32,
    /// Index type
    pub index_type: IndexType,
    /// Reserved for future flags; written as zero.
    pub reserved: u32,
    /// CRC32 checksum of the data section (everything after header)
    pub checksum: u32,
}

impl FileHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 24;

    /// Create a new header.
    pub fn new(index_type: IndexType, checksum: u32) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            index_type,
            reserved: 0,
            checksum,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..12].copy_from_slice(&self.version.to_le_bytes());
        bytes[12..16].copy_from_slice(&(self.index_type as u32).to_le_bytes());
        bytes[16..20].copy_from_slice(&self.reserved.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(RangeForgeError::invalid_format("header too small"));
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);

        if magic != MAGIC {
            return Err(RangeForgeError::invalid_format("invalid magic bytes"));
        }

        let version = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let index_type_raw = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        let reserved = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
        let checksum = u32::from_le_bytes(bytes[20..24].try_into().unwrap());

        let index_type = IndexType::from_u32(index_type_raw)
            .ok_or_else(|| RangeForgeError::invalid_format("unknown index type"))?;

        Ok(Self {
            magic,
            version,
            index_type,
            reserved,
            checksum,
        })
    }

    /// Verify the header is valid and matches expected type.
    pub fn verify(&self, expected_type: IndexType) -> Result<()> {
        if self.magic != MAGIC {
            return Err(RangeForgeError::invalid_format("invalid magic bytes"));
        }

        if self.version > FORMAT_VERSION {
            return Err(RangeForgeError::invalid_format(format!(
                "unsupported version {} (max supported: {})",
                self.version, FORMAT_VERSION
            )));
        }

        if self.index_type != expected_type {
            return Err(RangeForgeError::invalid_format(format!(
                "index type mismatch: expected {:?}, got {:?}",
                expected_type, self.index_type
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = FileHeader::new(IndexType::RangeGraph, 0x12345678);
        let bytes = header.to_bytes();
        let parsed = FileHeader::from_bytes(&bytes).unwrap();

        assert_eq!(parsed.magic, MAGIC);
        assert_eq!(parsed.version, FORMAT_VERSION);
        assert_eq!(parsed.index_type, IndexType::RangeGraph);
        assert_eq!(parsed.checksum, 0x12345678);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = [0u8; FileHeader::SIZE];
        bytes[0..8].copy_from_slice(b"INVALID\0");

        let result = FileHeader::from_bytes(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_index_type() {
        let mut bytes = FileHeader::new(IndexType::RangeGraph, 0).to_bytes();
        bytes[12..16].copy_from_slice(&99u32.to_le_bytes());
        assert!(FileHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_index_type_from_u32() {
        assert_eq!(IndexType::from_u32(1), Some(IndexType::RangeGraph));
        assert_eq!(IndexType::from_u32(99), None);
    }
}
