//! Whole-archive extraction
//!
//! Every item is written as a flat file whose name is the item path with
//! `/` and `\` replaced by `-`. Extraction is all-or-nothing: when any item
//! fails, the files already written by the same call are removed again.
//! Two items that flatten to the same name, or an item that would land on
//! the archive itself, fail the unpack instead of overwriting.

use crate::archive::PackReader;
use crate::error::{PackError, Result};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Totals reported after a successful unpack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    pub item_count: u64,
    pub raw_bytes: u64,
    pub stored_bytes: u64,
}

/// File name an item is extracted to
pub fn flatten_item_path(path: &str) -> String {
    path.replace(['/', '\\'], "-")
}

/// Unpack every item into the directory containing the archive
pub fn unpack_all<P: AsRef<Path>>(archive_path: P, print_progress: bool) -> Result<UnpackSummary> {
    let archive_path = archive_path.as_ref();
    let out_dir = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    unpack_into(archive_path, out_dir, print_progress)
}

/// Unpack every item into `out_dir`
pub fn unpack_into<P, D>(archive_path: P, out_dir: D, print_progress: bool) -> Result<UnpackSummary>
where
    P: AsRef<Path>,
    D: AsRef<Path>,
{
    let mut reader = PackReader::open(archive_path.as_ref())?;
    let archive = fs::canonicalize(archive_path.as_ref()).map_err(|source| {
        PackError::FileOpenFailed {
            path: archive_path.as_ref().to_path_buf(),
            source,
        }
    })?;
    let mut written = Vec::new();

    let result = extract_items(
        &mut reader,
        &archive,
        out_dir.as_ref(),
        print_progress,
        &mut written,
    );
    match result {
        Ok(summary) => {
            info!(
                archive = %archive_path.as_ref().display(),
                items = summary.item_count,
                raw_bytes = summary.raw_bytes,
                "Pack unpacked"
            );
            Ok(summary)
        }
        Err(e) => {
            remove_written(&written);
            Err(e)
        }
    }
}

fn extract_items(
    reader: &mut PackReader,
    archive: &Path,
    out_dir: &Path,
    print_progress: bool,
    written: &mut Vec<PathBuf>,
) -> Result<UnpackSummary> {
    let item_count = reader.item_count();
    let mut summary = UnpackSummary {
        item_count,
        ..UnpackSummary::default()
    };
    let mut targets: HashSet<PathBuf> = HashSet::new();

    for index in 0..reader.items().len() {
        let record = reader.items()[index].clone();

        if print_progress {
            print!("Unpacking \"{}\" file. ", record.path);
            let _ = io::stdout().flush();
        }

        let target = out_dir.join(flatten_item_path(&record.path));
        let result = check_target(archive, &target, &mut targets, &record.path)
            .and_then(|()| extract_item(reader, index, &target, written));
        if let Err(e) = result {
            if print_progress {
                println!();
            }
            warn!(item = %record.path, error = %e, "Failed to unpack item");
            return Err(e);
        }

        let raw = u64::from(record.info.data_size);
        let stored = u64::from(record.info.stored_size());
        summary.raw_bytes += raw;
        summary.stored_bytes += stored;

        debug!(item = %record.path, target = %target.display(), "Unpacked item");

        if print_progress {
            let progress = ((index + 1) as f64 / item_count as f64 * 100.0) as u32;
            println!("({}/{} bytes) [{}%]", raw, stored, progress);
            let _ = io::stdout().flush();
        }
    }

    if print_progress {
        println!(
            "Unpacked {} files. ({}/{} bytes)",
            summary.item_count, summary.raw_bytes, summary.stored_bytes
        );
    }

    Ok(summary)
}

/// Refuse a target already written by this unpack or resolving to the archive
fn check_target(
    archive: &Path,
    target: &Path,
    targets: &mut HashSet<PathBuf>,
    item: &str,
) -> Result<()> {
    let conflict = || PackError::UnpackConflict {
        item: item.to_string(),
        path: target.to_path_buf(),
    };

    if !targets.insert(target.to_path_buf()) {
        return Err(conflict());
    }
    match fs::canonicalize(target) {
        Ok(resolved) if resolved == archive => Err(conflict()),
        _ => Ok(()),
    }
}

fn extract_item(
    reader: &mut PackReader,
    index: usize,
    target: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let data = reader.read_item(index)?;

    let mut file = File::create(target).map_err(|source| PackError::FileCreateFailed {
        path: target.to_path_buf(),
        source,
    })?;
    written.push(target.to_path_buf());

    file.write_all(data).map_err(PackError::FileWriteFailed)?;
    file.flush().map_err(PackError::FileWriteFailed)
}

fn remove_written(written: &[PathBuf]) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove unpacked file");
        }
    }
    if !written.is_empty() {
        warn!(files = written.len(), "Removed files from failed unpack");
    }
}
