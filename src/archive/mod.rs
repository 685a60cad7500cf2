mod buffer;
mod format;
mod probe;
mod reader;
mod resource;
mod writer;

pub use buffer::StagingBuffer;
pub use format::{
    compare_paths, decode_header, decode_item_count, decode_item_info, encode_header,
    encode_item_count, encode_item_info, ByteOrder, ItemInfo, PackHeader, Version,
    DIRECTORY_OFFSET, HEADER_SIZE, ITEM_COUNT_SIZE, ITEM_INFO_SIZE, MAGIC, MAX_DATA_SIZE,
    MAX_PATH_SIZE, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH,
};
pub use probe::{library_version, probe, PackInfo};
pub use reader::{ItemRecord, PackReader, ReaderOptions};
pub use resource::{ExecutableDir, ResourceDir, ResourceLocator};
pub use writer::{pack, pack_files, PackOptions, PackSummary, PackWriter};
