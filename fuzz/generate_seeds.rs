//! Generate seed corpus for fuzzing

use pack_rs::pack;
use std::fs;
use std::path::Path;

/// Pack `items` (name, contents) from a scratch directory into `out`
fn seed(out: &str, items: &[(&str, &[u8])]) -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let mut paths = Vec::with_capacity(items.len());

    for (name, data) in items {
        let source = scratch.path().join(name);
        fs::write(&source, data)?;
        paths.push(source.to_string_lossy().into_owned());
    }

    pack(Path::new(out), &paths)?;
    println!("✓ Generated: {}", out);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_archive_parse";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Single small item
    seed(
        &format!("{}/seed_single_small.pack", corpus_dir),
        &[("test.txt", &b"Hello, World!"[..])],
    )?;

    // Seed 2: Multiple items, mixed path lengths
    seed(
        &format!("{}/seed_multi.pack", corpus_dir),
        &[
            ("a", &b"First item"[..]),
            ("bb.txt", &b"Second item"[..]),
            ("ccccc.lua", &b"print('third item')"[..]),
        ],
    )?;

    // Seed 3: Compressed item
    let large_data = b"This is test data for compression. ".repeat(1000);
    seed(
        &format!("{}/seed_large.pack", corpus_dir),
        &[("large.txt", large_data.as_slice())],
    )?;

    // Seed 4: Binary data, stored raw
    let binary_data: Vec<u8> = (0..=255).collect();
    seed(
        &format!("{}/seed_binary.pack", corpus_dir),
        &[("binary.bin", binary_data.as_slice())],
    )?;

    // Seed 5: One-byte item
    seed(
        &format!("{}/seed_one_byte.pack", corpus_dir),
        &[("x", &b"x"[..]), ("y", &b"y"[..])],
    )?;

    println!("\nGenerated 5 seed files in {}", corpus_dir);
    Ok(())
}
