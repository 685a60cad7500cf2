use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Unified error type for all pack operations
#[derive(Debug, Error)]
pub enum PackError {
    // Resource errors
    #[error("Failed to allocate {requested} bytes: {source}")]
    AllocationFailed {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Failed to get resource directory: {0}")]
    ResourceDirectoryUnavailable(String),

    // File errors
    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open file {path}: {source}")]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file: {0}")]
    FileWriteFailed(#[source] io::Error),

    #[error("Failed to read file: {0}")]
    FileReadFailed(#[source] io::Error),

    #[error("Failed to seek file: {0}")]
    FileSeekFailed(#[source] io::Error),

    // Item errors
    #[error("Failed to decompress item: {0}")]
    DecompressionFailed(DecompressFailure),

    #[error("Item not found in pack: {0}")]
    ItemNotFound(String),

    #[error("Bad data size: {0}")]
    InvalidDataSize(SizeViolation),

    #[error("Item path is not valid UTF-8 at index {index}")]
    InvalidPath { index: u64 },

    #[error("Corrupt item directory at index {index}: {reason}")]
    CorruptDirectory { index: u64, reason: String },

    #[error("Item {item} would overwrite {path}")]
    UnpackConflict { item: String, path: PathBuf },

    // Header errors
    #[error("Bad file type: missing PACK magic")]
    BadMagic,

    #[error("Bad file version: {major}.{minor} (supported {supported_major}.{supported_minor})")]
    BadVersion {
        major: u8,
        minor: u8,
        supported_major: u8,
        supported_minor: u8,
    },

    #[error("Bad file endianness flag: {0}")]
    BadEndianness(u8),

    // Configuration errors
    #[error("Invalid pack manifest: {0}")]
    InvalidManifest(String),
}

/// Why an LZ4 payload could not be restored.
///
/// Both reasons surface as [`PackError::DecompressionFailed`]; they are kept
/// apart so callers and logs can tell a mangled stream from a size mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompressFailure {
    /// The decoder rejected the stream.
    #[error("corrupt LZ4 block: {0}")]
    Corrupt(String),
    /// The stream decoded cleanly but produced the wrong number of bytes.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: u32, actual: usize },
}

/// Which size constraint an item or archive violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeViolation {
    #[error("item {0} is empty")]
    EmptyItem(String),

    #[error("item {path} is {size} bytes (max {max})", max = u32::MAX)]
    ItemTooLarge { path: String, size: u64 },

    #[error("item path is empty")]
    EmptyPath,

    #[error("path {path} is {len} bytes (max {max})", max = u8::MAX)]
    PathTooLong { path: String, len: usize },

    #[error("pack contains no items")]
    EmptyArchive,

    #[error("item record {index} has zero data or path size")]
    EmptyRecord { index: u64 },
}

impl PackError {
    pub(crate) fn allocation(requested: usize, source: TryReserveError) -> Self {
        PackError::AllocationFailed { requested, source }
    }
}

impl From<toml::de::Error> for PackError {
    fn from(err: toml::de::Error) -> Self {
        PackError::InvalidManifest(err.to_string())
    }
}
