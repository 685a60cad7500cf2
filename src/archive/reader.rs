use crate::archive::buffer::StagingBuffer;
use crate::archive::format::{
    compare_paths, decode_header, decode_item_count, decode_item_info, ByteOrder, ItemInfo,
    Version, DIRECTORY_OFFSET, HEADER_SIZE, ITEM_COUNT_SIZE, ITEM_INFO_SIZE,
};
use crate::archive::resource::ResourceLocator;
use crate::error::{DecompressFailure, PackError, Result, SizeViolation};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Upper bound on records reserved up front; the item count is not trusted
/// until the directory scan has actually read that many records.
const MAX_PREALLOCATED_ITEMS: u64 = 4096;

/// One directory entry: the on-disk record plus its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub info: ItemInfo,
    pub path: String,
}

/// Options for [`PackReader::open_with`]
#[derive(Clone, Copy, Default)]
pub struct ReaderOptions<'a> {
    data_buffer_capacity: usize,
    locator: Option<&'a dyn ResourceLocator>,
}

impl<'a> ReaderOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate the payload staging buffer
    pub fn data_buffer_capacity(mut self, capacity: usize) -> Self {
        self.data_buffer_capacity = capacity;
        self
    }

    /// Resolve the archive path through a resource locator before opening
    pub fn resource_locator(mut self, locator: &'a dyn ResourceLocator) -> Self {
        self.locator = Some(locator);
        self
    }
}

/// Random-access reader over a pack file.
///
/// The item directory is scanned once at open and kept in memory, sorted by
/// `(path length, path bytes)`. Payloads are read on demand into staging
/// buffers owned by the reader, so each returned slice is only valid until
/// the next read.
pub struct PackReader {
    file: BufReader<File>,
    version: Version,
    items: Vec<ItemRecord>,
    data: StagingBuffer,
    zip: StagingBuffer,
}

impl PackReader {
    /// Open a pack file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ReaderOptions::default())
    }

    /// Open a pack file with explicit options
    pub fn open_with<P: AsRef<Path>>(path: P, options: ReaderOptions<'_>) -> Result<Self> {
        let path = match options.locator {
            Some(locator) => locator.resolve(path.as_ref())?,
            None => path.as_ref().to_path_buf(),
        };

        let file = File::open(&path).map_err(|source| PackError::FileOpenFailed {
            path: path.clone(),
            source,
        })?;
        let file_len = file.metadata().map_err(PackError::FileReadFailed)?.len();
        let mut file = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header).map_err(PackError::FileReadFailed)?;
        let header = decode_header(&header)?;
        let order = ByteOrder::native();

        let mut count = [0u8; ITEM_COUNT_SIZE];
        file.read_exact(&mut count).map_err(PackError::FileReadFailed)?;
        let item_count = decode_item_count(count, order);
        if item_count == 0 {
            return Err(PackError::InvalidDataSize(SizeViolation::EmptyArchive));
        }

        let items = scan_directory(&mut file, item_count, file_len, order)?;
        let data = StagingBuffer::with_capacity(options.data_buffer_capacity)?;

        debug!(
            path = %path.display(),
            items = items.len(),
            version = %header.version,
            "Opened pack"
        );

        Ok(Self {
            file,
            version: header.version,
            items,
            data,
            zip: StagingBuffer::new(),
        })
    }

    /// Format version recorded in the archive header
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn item_count(&self) -> u64 {
        self.items.len() as u64
    }

    /// All directory entries in on-disk order
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ItemRecord> {
        self.items.get(index)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn item_path(&self, index: usize) -> &str {
        &self.items[index].path
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn item_data_size(&self, index: usize) -> u32 {
        self.items[index].info.data_size
    }

    /// Binary-search the directory for `path`
    pub fn find_index(&self, path: &str) -> Option<usize> {
        self.items
            .binary_search_by(|item| compare_paths(item.path.as_bytes(), path.as_bytes()))
            .ok()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find_index(path).is_some()
    }

    /// Read and, when needed, decompress the item at `index`.
    ///
    /// The returned slice borrows the reader's staging buffer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn read_item(&mut self, index: usize) -> Result<&[u8]> {
        let info = self.items[index].info;
        let data_size = info.data_size as usize;

        self.data.ensure_capacity(data_size)?;
        self.file
            .seek(SeekFrom::Start(info.payload_offset()))
            .map_err(PackError::FileSeekFailed)?;

        if info.is_compressed() {
            let zip_size = info.zip_size as usize;
            let compressed = self.zip.ensure_capacity(zip_size)?;
            self.file
                .read_exact(compressed)
                .map_err(PackError::FileReadFailed)?;

            let output = self.data.ensure_capacity(data_size)?;
            let written = lz4_flex::block::decompress_into(self.zip.as_slice(zip_size), output)
                .map_err(|e| {
                    PackError::DecompressionFailed(DecompressFailure::Corrupt(e.to_string()))
                })?;

            if written != data_size {
                return Err(PackError::DecompressionFailed(
                    DecompressFailure::SizeMismatch {
                        expected: info.data_size,
                        actual: written,
                    },
                ));
            }
        } else {
            let output = self.data.ensure_capacity(data_size)?;
            self.file
                .read_exact(output)
                .map_err(PackError::FileReadFailed)?;
        }

        Ok(self.data.as_slice(data_size))
    }

    /// Look up `path` and read its item
    pub fn read_item_by_path(&mut self, path: &str) -> Result<&[u8]> {
        let index = self
            .find_index(path)
            .ok_or_else(|| PackError::ItemNotFound(path.to_string()))?;
        self.read_item(index)
    }

    /// Current size of the payload staging buffer
    pub fn data_buffer_capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Release both staging buffers; the directory stays loaded
    pub fn free_buffers(&mut self) {
        self.data.release();
        self.zip.release();
    }

    /// Close the reader, releasing the file and all buffers
    pub fn close(self) {}
}

/// Walk the item directory front to back, reading each record and path and
/// skipping its payload.
fn scan_directory<R: Read + Seek>(
    reader: &mut BufReader<R>,
    item_count: u64,
    file_len: u64,
    order: ByteOrder,
) -> Result<Vec<ItemRecord>> {
    let mut items: Vec<ItemRecord> =
        Vec::with_capacity(item_count.min(MAX_PREALLOCATED_ITEMS) as usize);
    let mut position = DIRECTORY_OFFSET;

    for index in 0..item_count {
        let mut record = [0u8; ITEM_INFO_SIZE];
        reader
            .read_exact(&mut record)
            .map_err(PackError::FileReadFailed)?;
        let info = decode_item_info(&record, order);

        if info.data_size == 0 || info.path_size == 0 {
            return Err(PackError::InvalidDataSize(SizeViolation::EmptyRecord {
                index,
            }));
        }
        if info.file_offset != position {
            return Err(PackError::CorruptDirectory {
                index,
                reason: format!(
                    "record claims offset {} but sits at {}",
                    info.file_offset, position
                ),
            });
        }

        let mut path = vec![0u8; usize::from(info.path_size)];
        reader
            .read_exact(&mut path)
            .map_err(PackError::FileReadFailed)?;
        let path = String::from_utf8(path).map_err(|_| PackError::InvalidPath { index })?;

        if let Some(previous) = items.last() {
            if compare_paths(previous.path.as_bytes(), path.as_bytes()) != Ordering::Less {
                return Err(PackError::CorruptDirectory {
                    index,
                    reason: format!("{} is out of order after {}", path, previous.path),
                });
            }
        }

        let stored = info.stored_size();
        position = info.payload_offset() + u64::from(stored);
        if position > file_len {
            return Err(PackError::CorruptDirectory {
                index,
                reason: format!("payload ends at {} past end of file {}", position, file_len),
            });
        }
        reader
            .seek_relative(i64::from(stored))
            .map_err(PackError::FileSeekFailed)?;

        items.push(ItemRecord { info, path });
    }

    Ok(items)
}
