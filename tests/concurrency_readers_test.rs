//! Multi-reader tests
//!
//! A `PackReader` is not shared between threads; each thread opens its own
//! handle on the same file.

use pack_rs::{pack, PackReader};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tempfile::{tempdir, TempDir};

/// Helper: Create a pack with N small items. Returns (dir, archive, item paths).
fn create_pack_with_files(file_count: usize) -> (TempDir, PathBuf, Vec<String>) {
    let dir = tempdir().unwrap();
    let mut paths = Vec::with_capacity(file_count);

    for i in 0..file_count {
        let path = dir.path().join(format!("file{}.txt", i));
        fs::write(&path, format!("data{}", i).repeat(i + 1)).unwrap();
        paths.push(path.to_str().unwrap().to_string());
    }

    let archive = dir.path().join("shared.pack");
    pack(&archive, &paths).unwrap();
    (dir, archive, paths)
}

fn expected_data(i: usize) -> Vec<u8> {
    format!("data{}", i).repeat(i + 1).into_bytes()
}

#[test]
fn test_concurrent_readers() {
    let (_dir, archive, paths) = create_pack_with_files(50);
    let paths = Arc::new(paths);

    let handles: Vec<_> = (0..16)
        .map(|thread_id| {
            let archive = archive.clone();
            let paths = Arc::clone(&paths);
            thread::spawn(move || {
                let mut reader = PackReader::open(&archive).unwrap();
                for step in 0..50 {
                    let i = (thread_id * 7 + step) % paths.len();
                    let data = reader.read_item_by_path(&paths[i]).unwrap();
                    assert_eq!(data, expected_data(i).as_slice());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_reader_moves_between_threads() {
    let (_dir, archive, paths) = create_pack_with_files(5);
    let mut reader = PackReader::open(&archive).unwrap();
    assert_eq!(reader.read_item_by_path(&paths[0]).unwrap(), b"data0");

    let paths_for_thread = paths.clone();
    let handle = thread::spawn(move || {
        let data = reader.read_item_by_path(&paths_for_thread[4]).unwrap().to_vec();
        (reader, data)
    });

    let (mut reader, data) = handle.join().unwrap();
    assert_eq!(data, expected_data(4));
    assert_eq!(reader.read_item_by_path(&paths[2]).unwrap(), expected_data(2).as_slice());
}

#[test]
fn test_readers_outlive_each_other() {
    let (_dir, archive, paths) = create_pack_with_files(3);
    let first = PackReader::open(&archive).unwrap();
    let mut second = PackReader::open(&archive).unwrap();
    drop(first);

    assert_eq!(second.read_item_by_path(&paths[1]).unwrap(), b"data1data1");
}
