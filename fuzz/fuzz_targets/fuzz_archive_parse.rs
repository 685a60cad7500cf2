#![no_main]

use libfuzzer_sys::fuzz_target;
use pack_rs::{probe, PackReader, HEADER_SIZE};
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Header plus item count
    if data.len() < HEADER_SIZE + 8 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() {
        return;
    }

    if temp_file.flush().is_err() {
        return;
    }

    let path = temp_file.path();

    // Probe only looks at the header - should never panic
    let _ = probe(path);

    // Open scans the whole directory - should never panic
    let mut reader = match PackReader::open(path) {
        Ok(r) => r,
        Err(_) => return, // Expected for invalid data
    };

    // Every recorded item must be found again by its own path
    let paths: Vec<String> = reader.items().iter().map(|item| item.path.clone()).collect();
    for (index, item_path) in paths.iter().enumerate() {
        assert_eq!(reader.find_index(item_path), Some(index));
        let _ = reader.read_item(index);
    }

    let _ = reader.item_count();
    let _ = reader.contains("");
    let _ = reader.contains("../../../etc/passwd");
    reader.free_buffers();
});
