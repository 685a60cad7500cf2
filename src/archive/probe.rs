use crate::archive::format::{
    decode_item_count, ByteOrder, PackHeader, Version, HEADER_SIZE, ITEM_COUNT_SIZE,
};
use crate::error::{PackError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header summary of a pack file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackInfo {
    pub version: Version,
    pub little_endian: bool,
    pub item_count: u64,
}

/// Version of the format this library writes
pub fn library_version() -> Version {
    Version::CURRENT
}

/// Read a pack's header and item count without scanning its directory.
///
/// Only the magic is enforced; version and byte order are reported as found
/// so foreign or newer archives can still be identified. The item count is
/// decoded in the byte order the header declares.
pub fn probe<P: AsRef<Path>>(archive_path: P) -> Result<PackInfo> {
    let path = archive_path.as_ref();
    let mut file = File::open(path).map_err(|source| PackError::FileOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut header = [0u8; HEADER_SIZE];
    file.read_exact(&mut header).map_err(PackError::FileReadFailed)?;
    let header = PackHeader::parse(&header)?;

    let mut count = [0u8; ITEM_COUNT_SIZE];
    file.read_exact(&mut count).map_err(PackError::FileReadFailed)?;

    let order = header
        .byte_order
        .ok_or(PackError::BadEndianness(header.endianness_flag))?;

    Ok(PackInfo {
        version: header.version,
        little_endian: order == ByteOrder::Little,
        item_count: decode_item_count(count, order),
    })
}
