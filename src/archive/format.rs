use crate::error::{PackError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Magic number at offset 0 of every pack file
pub const MAGIC: [u8; 4] = *b"PACK";

/// Current format version
pub const VERSION_MAJOR: u8 = 0;
pub const VERSION_MINOR: u8 = 0;
pub const VERSION_PATCH: u8 = 1;

/// Header size in bytes (magic + version + endianness flag)
pub const HEADER_SIZE: usize = 8;

/// Item count size in bytes
pub const ITEM_COUNT_SIZE: usize = 8;

/// Offset of the first item record
pub const DIRECTORY_OFFSET: u64 = (HEADER_SIZE + ITEM_COUNT_SIZE) as u64;

/// Item info record size in bytes (packed, no padding)
pub const ITEM_INFO_SIZE: usize = 17;

/// Maximum path length in bytes; the length is stored in one byte
pub const MAX_PATH_SIZE: usize = u8::MAX as usize;

/// Maximum uncompressed item size in bytes
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64;

/// Byte order of the integers in a pack file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the running target
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    /// Endianness flag byte stored at header offset 7
    pub fn flag(self) -> u8 {
        match self {
            Self::Little => 1,
            Self::Big => 0,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Self::Little),
            0 => Some(Self::Big),
            _ => None,
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    fn u64_bytes(self, value: u64) -> [u8; 8] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    fn read_u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            Self::Little => u64::from_le_bytes(bytes),
            Self::Big => u64::from_be_bytes(bytes),
        }
    }
}

/// Format version triple. Only major and minor take part in compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const CURRENT: Version = Version {
        major: VERSION_MAJOR,
        minor: VERSION_MINOR,
        patch: VERSION_PATCH,
    };

    pub fn is_compatible(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Decoded pack header.
///
/// `byte_order` is `None` when the flag byte holds neither 0 nor 1; such a
/// header is only ever produced by [`PackHeader::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub version: Version,
    pub byte_order: Option<ByteOrder>,
    pub endianness_flag: u8,
}

impl PackHeader {
    /// Decode a header checking the magic only
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        if bytes[..4] != MAGIC {
            return Err(PackError::BadMagic);
        }

        Ok(Self {
            version: Version {
                major: bytes[4],
                minor: bytes[5],
                patch: bytes[6],
            },
            byte_order: ByteOrder::from_flag(bytes[7]),
            endianness_flag: bytes[7],
        })
    }
}

/// Encode the fixed 8-byte header
pub fn encode_header(version: Version, order: ByteOrder) -> [u8; HEADER_SIZE] {
    [
        MAGIC[0],
        MAGIC[1],
        MAGIC[2],
        MAGIC[3],
        version.major,
        version.minor,
        version.patch,
        order.flag(),
    ]
}

/// Decode and validate a header against this library's version and the
/// native byte order. Checks run magic, version, endianness, in that order.
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> Result<PackHeader> {
    let header = PackHeader::parse(bytes)?;

    if !header.version.is_compatible(&Version::CURRENT) {
        return Err(PackError::BadVersion {
            major: header.version.major,
            minor: header.version.minor,
            supported_major: VERSION_MAJOR,
            supported_minor: VERSION_MINOR,
        });
    }

    if header.byte_order != Some(ByteOrder::native()) {
        return Err(PackError::BadEndianness(header.endianness_flag));
    }

    Ok(header)
}

pub fn encode_item_count(count: u64, order: ByteOrder) -> [u8; ITEM_COUNT_SIZE] {
    order.u64_bytes(count)
}

pub fn decode_item_count(bytes: [u8; ITEM_COUNT_SIZE], order: ByteOrder) -> u64 {
    order.read_u64(bytes)
}

/// Fixed-size metadata record preceding each item's path and payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemInfo {
    /// Compressed payload size; 0 means the payload is stored raw
    pub zip_size: u32,
    /// Uncompressed size, always > 0
    pub data_size: u32,
    /// Absolute offset of this record in the pack file
    pub file_offset: u64,
    /// Path length in bytes, always > 0
    pub path_size: u8,
}

impl ItemInfo {
    pub fn is_compressed(&self) -> bool {
        self.zip_size > 0
    }

    /// Number of payload bytes following the path
    pub fn stored_size(&self) -> u32 {
        if self.is_compressed() {
            self.zip_size
        } else {
            self.data_size
        }
    }

    /// Absolute offset of the payload
    pub fn payload_offset(&self) -> u64 {
        self.file_offset + ITEM_INFO_SIZE as u64 + u64::from(self.path_size)
    }
}

/// Encode an item info record
///
/// Layout: zip_size u32 | data_size u32 | file_offset u64 | path_size u8
pub fn encode_item_info(info: &ItemInfo, order: ByteOrder) -> [u8; ITEM_INFO_SIZE] {
    let mut out = [0u8; ITEM_INFO_SIZE];
    out[0..4].copy_from_slice(&order.u32_bytes(info.zip_size));
    out[4..8].copy_from_slice(&order.u32_bytes(info.data_size));
    out[8..16].copy_from_slice(&order.u64_bytes(info.file_offset));
    out[16] = info.path_size;
    out
}

pub fn decode_item_info(bytes: &[u8; ITEM_INFO_SIZE], order: ByteOrder) -> ItemInfo {
    let mut zip = [0u8; 4];
    let mut data = [0u8; 4];
    let mut offset = [0u8; 8];
    zip.copy_from_slice(&bytes[0..4]);
    data.copy_from_slice(&bytes[4..8]);
    offset.copy_from_slice(&bytes[8..16]);

    ItemInfo {
        zip_size: order.read_u32(zip),
        data_size: order.read_u32(data),
        file_offset: order.read_u64(offset),
        path_size: bytes[16],
    }
}

/// Item ordering shared by the writer's sort and the reader's binary search:
/// shorter paths first, equal lengths compared bytewise.
///
/// This is a format rule. It is not the natural `str` ordering.
pub fn compare_paths(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = encode_header(Version::CURRENT, ByteOrder::Little);
        assert_eq!(&bytes[..4], b"PACK");
        assert_eq!(bytes[4], VERSION_MAJOR);
        assert_eq!(bytes[5], VERSION_MINOR);
        assert_eq!(bytes[6], VERSION_PATCH);
        assert_eq!(bytes[7], 1);

        let big = encode_header(Version::CURRENT, ByteOrder::Big);
        assert_eq!(big[7], 0);
    }

    #[test]
    fn test_decode_native_header() {
        let bytes = encode_header(Version::CURRENT, ByteOrder::native());
        let header = decode_header(&bytes).unwrap();
        assert_eq!(header.version, Version::CURRENT);
        assert_eq!(header.byte_order, Some(ByteOrder::native()));
    }

    #[test]
    fn test_decode_header_rejections() {
        let mut bad_magic = encode_header(Version::CURRENT, ByteOrder::native());
        bad_magic[0] = b'Z';
        assert!(matches!(decode_header(&bad_magic), Err(PackError::BadMagic)));

        let newer = Version { major: 1, minor: 0, patch: 0 };
        let bad_version = encode_header(newer, ByteOrder::native());
        assert!(matches!(
            decode_header(&bad_version),
            Err(PackError::BadVersion { major: 1, minor: 0, .. })
        ));

        let foreign = match ByteOrder::native() {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        };
        let bad_order = encode_header(Version::CURRENT, foreign);
        assert!(matches!(
            decode_header(&bad_order),
            Err(PackError::BadEndianness(_))
        ));

        let mut garbage_flag = encode_header(Version::CURRENT, ByteOrder::native());
        garbage_flag[7] = 7;
        assert!(matches!(
            decode_header(&garbage_flag),
            Err(PackError::BadEndianness(7))
        ));
    }

    #[test]
    fn test_patch_version_is_informational() {
        let patched = Version {
            patch: VERSION_PATCH.wrapping_add(9),
            ..Version::CURRENT
        };
        let bytes = encode_header(patched, ByteOrder::native());
        assert_eq!(decode_header(&bytes).unwrap().version, patched);
    }

    #[test]
    fn test_item_info_layout() {
        let info = ItemInfo {
            zip_size: 0x0102_0304,
            data_size: 0x0A0B_0C0D,
            file_offset: 0x1122_3344_5566_7788,
            path_size: 42,
        };

        let le = encode_item_info(&info, ByteOrder::Little);
        assert_eq!(&le[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&le[4..8], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(le[8], 0x88);
        assert_eq!(le[16], 42);
        assert_eq!(decode_item_info(&le, ByteOrder::Little), info);

        let be = encode_item_info(&info, ByteOrder::Big);
        assert_eq!(&be[0..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decode_item_info(&be, ByteOrder::Big), info);
    }

    #[test]
    fn test_payload_offset() {
        let info = ItemInfo {
            zip_size: 0,
            data_size: 5,
            file_offset: DIRECTORY_OFFSET,
            path_size: 5,
        };
        assert_eq!(info.payload_offset(), 16 + 17 + 5);
        assert_eq!(info.stored_size(), 5);
        assert!(!info.is_compressed());
    }

    #[test]
    fn test_compare_paths_length_first() {
        assert_eq!(compare_paths(b"zz", b"aaa"), Ordering::Less);
        assert_eq!(compare_paths(b"abc", b"abd"), Ordering::Less);
        assert_eq!(compare_paths(b"b.bin", b"a.txt"), Ordering::Greater);
        assert_eq!(compare_paths(b"same", b"same"), Ordering::Equal);

        // Natural string order would put "aaa" first
        assert_eq!("zz".cmp("aaa"), Ordering::Greater);
    }
}
