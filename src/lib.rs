//! pack-rs: single-file asset packs with per-item LZ4 compression
//!
//! A pack stores many named blobs (textures, scripts, shaders) back to back
//! in one file. Each item is compressed with LZ4 when that makes it smaller
//! and stored raw otherwise. Items are kept sorted by path length, then path
//! bytes, so a reader finds any item with a binary search over a directory
//! it scans once at open.
//!
//! # Example
//!
//! ```no_run
//! use pack_rs::{pack, PackReader};
//!
//! // Create a pack; the source paths double as item paths
//! pack("assets.pack", &["shaders/blit.frag", "textures/atlas.png"])?;
//!
//! // Read from the pack
//! let mut reader = PackReader::open("assets.pack")?;
//! let shader = reader.read_item_by_path("shaders/blit.frag")?;
//! println!("{} bytes", shader.len());
//! # Ok::<(), pack_rs::error::PackError>(())
//! ```

// Core modules
pub mod archive;
pub mod config;
pub mod error;
pub mod unpack;

// Re-export commonly used types
pub use archive::{
    compare_paths, library_version, pack, pack_files, probe, ByteOrder, ExecutableDir, ItemInfo,
    ItemRecord, PackInfo, PackOptions, PackReader, PackSummary, PackWriter, ReaderOptions,
    ResourceDir, ResourceLocator, Version, HEADER_SIZE, ITEM_INFO_SIZE, MAGIC, MAX_PATH_SIZE,
};
pub use config::PackManifest;
pub use error::{DecompressFailure, PackError, Result, SizeViolation};
pub use unpack::{flatten_item_path, unpack_all, unpack_into, UnpackSummary};
