use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pack_rs::{
    library_version, pack_files, probe, unpack_all, unpack_into, PackManifest, PackOptions,
    PackReader,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packer", about = "Build, inspect and extract asset pack files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files into a new archive
    Pack {
        /// Archive to create (omit when using --manifest)
        archive: Option<PathBuf>,
        /// Files to pack; each path is also the item path
        files: Vec<String>,
        /// Read the archive path and file list from a TOML manifest
        #[arg(short, long, conflicts_with_all = ["archive", "files"])]
        manifest: Option<PathBuf>,
        /// Do not print per-item progress
        #[arg(short, long)]
        quiet: bool,
        /// Store every item uncompressed
        #[arg(long)]
        store: bool,
    },
    /// Extract every item as a flat file
    Unpack {
        archive: PathBuf,
        /// Output directory (defaults to the archive's directory)
        #[arg(short = 'C', long)]
        output_dir: Option<PathBuf>,
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show archive header and item listing
    Info {
        archive: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the pack format version this tool writes
    Version,
}

#[derive(Serialize)]
struct ItemListing {
    path: String,
    size: u32,
    stored_size: u32,
    compressed: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse().command) {
        eprintln!("\nError: {:#}.", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { archive, files, manifest, quiet, store } => {
            if let Some(manifest_path) = manifest {
                let mut manifest = PackManifest::load(&manifest_path)
                    .with_context(|| format!("loading {}", manifest_path.display()))?;
                if quiet {
                    manifest.progress = false;
                }
                if store {
                    manifest.compress = false;
                }
                manifest
                    .run()
                    .with_context(|| format!("packing {}", manifest.output.display()))?;
                return Ok(());
            }

            let Some(archive) = archive else {
                bail!("Incorrect parameters: an archive path or --manifest is required");
            };
            if files.is_empty() {
                bail!("Incorrect parameters: no files to pack");
            }

            let options = PackOptions::default()
                .with_progress(!quiet)
                .with_compression(!store);
            pack_files(&archive, &files, &options)
                .with_context(|| format!("packing {}", archive.display()))?;
        }

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { archive, output_dir, quiet } => {
            let result = match output_dir {
                Some(dir) => unpack_into(&archive, dir, !quiet),
                None => unpack_all(&archive, !quiet),
            };
            result.with_context(|| format!("unpacking {}", archive.display()))?;
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { archive, json } => {
            let stdout = io::stdout();
            write_info(&archive, json, &mut stdout.lock())?;
        }

        // ── Version ──────────────────────────────────────────────────────────
        Commands::Version => {
            println!("{}", library_version());
        }
    }

    Ok(())
}

/// Print the header block, then the item listing.
///
/// The header comes from `probe`, so it is printed even for packs this
/// version cannot open; the open error is reported after it.
fn write_info<W: Write>(archive: &Path, json: bool, out: &mut W) -> Result<()> {
    let info = probe(archive).with_context(|| format!("probing {}", archive.display()))?;

    if !json {
        writeln!(
            out,
            "Pack [v{}]\nPack information:\n Version: {}.\n Little endian: {}.\n Item count: {}.\n",
            library_version(),
            info.version,
            info.little_endian,
            info.item_count
        )?;
    }

    let reader = match PackReader::open(archive) {
        Ok(reader) => reader,
        Err(e) => {
            if json {
                let out_json = serde_json::json!({ "pack": info });
                writeln!(out, "{}", serde_json::to_string_pretty(&out_json)?)?;
            }
            out.flush()?;
            return Err(e).with_context(|| format!("opening {}", archive.display()));
        }
    };

    let items: Vec<ItemListing> = reader
        .items()
        .iter()
        .map(|item| ItemListing {
            path: item.path.clone(),
            size: item.info.data_size,
            stored_size: item.info.stored_size(),
            compressed: item.info.is_compressed(),
        })
        .collect();

    if json {
        let out_json = serde_json::json!({ "pack": info, "items": items });
        writeln!(out, "{}", serde_json::to_string_pretty(&out_json)?)?;
        return Ok(());
    }

    for (index, item) in items.iter().enumerate() {
        writeln!(
            out,
            "Item {}:\n Path: {}.\n Size: {}.\n Stored: {}{}.",
            index,
            item.path,
            item.size,
            item.stored_size,
            if item.compressed { " (lz4)" } else { "" }
        )?;
    }
    Ok(())
}
