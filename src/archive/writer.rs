use crate::archive::buffer::StagingBuffer;
use crate::archive::format::{
    compare_paths, encode_header, encode_item_count, encode_item_info, ByteOrder, ItemInfo,
    Version, DIRECTORY_OFFSET, MAX_DATA_SIZE, MAX_PATH_SIZE,
};
use crate::error::{PackError, Result, SizeViolation};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for a pack run
#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Print one line per item and a totals line to stdout
    pub print_progress: bool,
    /// Try LZ4 on every item larger than one byte
    pub compress: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            print_progress: false,
            compress: true,
        }
    }
}

impl PackOptions {
    pub fn with_progress(mut self, print_progress: bool) -> Self {
        self.print_progress = print_progress;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Totals reported after a successful pack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackSummary {
    pub item_count: u64,
    /// Sum of uncompressed item sizes
    pub raw_bytes: u64,
    /// Sum of payload bytes actually written
    pub stored_bytes: u64,
}

impl PackSummary {
    /// Percentage of payload bytes saved by compression
    pub fn saved_percent(&self) -> f64 {
        if self.raw_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.stored_bytes as f64 / self.raw_bytes as f64) * 100.0
    }
}

/// Pack `source_paths` into a new archive at `archive_path` with default options
pub fn pack<P, S>(archive_path: P, source_paths: &[S]) -> Result<PackSummary>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    pack_files(archive_path, source_paths, &PackOptions::default())
}

/// Pack `source_paths` into a new archive at `archive_path`.
///
/// Each source path is both the file that is read and the key the item is
/// stored under. On failure no archive is left at `archive_path`.
pub fn pack_files<P, S>(archive_path: P, source_paths: &[S], options: &PackOptions) -> Result<PackSummary>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut writer = PackWriter::new(source_paths, *options);
    writer.write_to_file(archive_path.as_ref())
}

/// State for a single pack run: the canonical item list plus two staging
/// buffers reused across items.
pub struct PackWriter {
    paths: Vec<String>,
    raw: StagingBuffer,
    zip: StagingBuffer,
    options: PackOptions,
}

impl PackWriter {
    /// Deduplicate (first occurrence wins) and sort the item paths
    pub fn new<S: AsRef<str>>(source_paths: &[S], options: PackOptions) -> Self {
        let mut seen: HashSet<&str> = HashSet::with_capacity(source_paths.len());
        let mut paths: Vec<String> = Vec::with_capacity(source_paths.len());
        for path in source_paths {
            let path = path.as_ref();
            if seen.insert(path) {
                paths.push(path.to_string());
            }
        }
        paths.sort_by(|a, b| compare_paths(a.as_bytes(), b.as_bytes()));

        Self {
            paths,
            raw: StagingBuffer::new(),
            zip: StagingBuffer::new(),
            options,
        }
    }

    /// Item paths in on-disk order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Create the archive file and write every item into it
    pub fn write_to_file(&mut self, archive_path: &Path) -> Result<PackSummary> {
        if self.paths.is_empty() {
            return Err(PackError::InvalidDataSize(SizeViolation::EmptyArchive));
        }

        let file = File::create(archive_path).map_err(|source| PackError::FileCreateFailed {
            path: archive_path.to_path_buf(),
            source,
        })?;
        let mut guard = PartialFile::new(archive_path);
        let mut out = BufWriter::new(file);

        let summary = self.write_items(&mut out)?;

        let file = out
            .into_inner()
            .map_err(|e| PackError::FileWriteFailed(e.into_error()))?;
        file.sync_all().map_err(PackError::FileWriteFailed)?;
        drop(file);

        guard.commit();

        info!(
            path = %archive_path.display(),
            items = summary.item_count,
            raw_bytes = summary.raw_bytes,
            stored_bytes = summary.stored_bytes,
            "Pack written"
        );
        Ok(summary)
    }

    /// Serialize the header and every item to `out`
    pub fn write_items<W: Write>(&mut self, out: &mut W) -> Result<PackSummary> {
        let order = ByteOrder::native();
        let item_count = self.paths.len() as u64;

        write_all(out, &encode_header(Version::CURRENT, order))?;
        write_all(out, &encode_item_count(item_count, order))?;

        let mut current_offset = DIRECTORY_OFFSET;
        let mut summary = PackSummary {
            item_count,
            ..PackSummary::default()
        };

        for index in 0..self.paths.len() {
            let path = self.paths[index].clone();

            if self.options.print_progress {
                print!("Packing \"{}\" file. ", path);
                flush_stdout();
            }

            let info = match self.write_item(out, &path, current_offset, order) {
                Ok(info) => info,
                Err(e) => {
                    if self.options.print_progress {
                        println!();
                    }
                    warn!(item = %path, error = %e, "Failed to pack item");
                    return Err(e);
                }
            };

            let stored = u64::from(info.stored_size());
            current_offset = info.payload_offset() + stored;
            summary.raw_bytes += u64::from(info.data_size);
            summary.stored_bytes += stored;

            debug!(
                item = %path,
                data_size = info.data_size,
                zip_size = info.zip_size,
                offset = info.file_offset,
                "Packed item"
            );

            if self.options.print_progress {
                let progress = ((index + 1) as f64 / item_count as f64 * 100.0) as u32;
                println!("({}/{} bytes) [{}%]", stored, info.data_size, progress);
                flush_stdout();
            }
        }

        if self.options.print_progress {
            println!(
                "Packed {} files. ({}/{} bytes, {}% saved)",
                summary.item_count,
                summary.stored_bytes,
                summary.raw_bytes,
                summary.saved_percent() as i64
            );
        }

        Ok(summary)
    }

    fn write_item<W: Write>(
        &mut self,
        out: &mut W,
        path: &str,
        file_offset: u64,
        order: ByteOrder,
    ) -> Result<ItemInfo> {
        let path_size = path.len();
        if path_size == 0 {
            return Err(PackError::InvalidDataSize(SizeViolation::EmptyPath));
        }
        if path_size > MAX_PATH_SIZE {
            return Err(PackError::InvalidDataSize(SizeViolation::PathTooLong {
                path: path.to_string(),
                len: path_size,
            }));
        }

        let data_size = self.load_source(path)?;
        let zip_size = self.compress_staged(data_size)?;

        let info = ItemInfo {
            zip_size,
            data_size,
            file_offset,
            path_size: path_size as u8,
        };

        write_all(out, &encode_item_info(&info, order))?;
        write_all(out, path.as_bytes())?;
        if info.is_compressed() {
            write_all(out, self.zip.as_slice(zip_size as usize))?;
        } else {
            write_all(out, self.raw.as_slice(data_size as usize))?;
        }

        Ok(info)
    }

    /// Read the whole source file into the raw staging buffer
    fn load_source(&mut self, path: &str) -> Result<u32> {
        let mut file = File::open(path).map_err(|source| PackError::FileOpenFailed {
            path: path.into(),
            source,
        })?;

        let size = file.seek(SeekFrom::End(0)).map_err(PackError::FileSeekFailed)?;
        if size == 0 {
            return Err(PackError::InvalidDataSize(SizeViolation::EmptyItem(
                path.to_string(),
            )));
        }
        if size > MAX_DATA_SIZE {
            return Err(PackError::InvalidDataSize(SizeViolation::ItemTooLarge {
                path: path.to_string(),
                size,
            }));
        }
        file.seek(SeekFrom::Start(0)).map_err(PackError::FileSeekFailed)?;

        let staged = self.raw.ensure_capacity(size as usize)?;
        file.read_exact(staged).map_err(PackError::FileReadFailed)?;

        Ok(size as u32)
    }

    /// Compress the staged item and return its `zip_size`, or 0 when the
    /// item should be stored raw.
    fn compress_staged(&mut self, data_size: u32) -> Result<u32> {
        let size = data_size as usize;
        if !self.options.compress || size <= 1 {
            return Ok(0);
        }

        let bound = lz4_flex::block::get_maximum_output_size(size);
        let input = self.raw.as_slice(size);
        let output = self.zip.ensure_capacity(bound)?;

        match lz4_flex::block::compress_into(input, output) {
            Ok(zip_size) if zip_size > 0 && zip_size < size => Ok(zip_size as u32),
            Ok(_) => Ok(0),
            Err(e) => {
                debug!(error = %e, "LZ4 compression failed, storing raw");
                Ok(0)
            }
        }
    }
}

fn write_all<W: Write>(out: &mut W, bytes: &[u8]) -> Result<()> {
    out.write_all(bytes).map_err(PackError::FileWriteFailed)
}

fn flush_stdout() {
    let _ = io::stdout().flush();
}

/// Removes the file at `path` on drop unless committed
struct PartialFile<'a> {
    path: &'a Path,
    committed: bool,
}

impl<'a> PartialFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(self.path) {
            Ok(()) => warn!(path = %self.path.display(), "Removed partially written pack"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove partially written pack"
            ),
        }
    }
}
