//! Pack job manifests
//!
//! A manifest is a small TOML file naming the archive to produce and the
//! files to put in it, so asset builds can be checked in and rerun:
//!
//! ```toml
//! output = "assets.pack"
//! progress = true
//! files = [
//!     "shaders/blit.frag",
//!     "textures/atlas.png",
//! ]
//! ```
//!
//! File entries are used verbatim as item paths, so they are resolved
//! against the current directory, not the manifest's.

use crate::archive::{pack_files, PackOptions, PackSummary};
use crate::error::{PackError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_compress() -> bool {
    true
}

/// A pack job read from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    /// Archive to create
    pub output: PathBuf,

    /// Print per-item progress
    #[serde(default)]
    pub progress: bool,

    /// Attempt LZ4 compression
    #[serde(default = "default_compress")]
    pub compress: bool,

    /// Source files, also the item paths
    pub files: Vec<String>,
}

impl PackManifest {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let manifest: PackManifest = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PackError::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(PackError::InvalidManifest(
                "manifest lists no files".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(PackError::InvalidManifest(
                "manifest output path is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> PackOptions {
        PackOptions::default()
            .with_progress(self.progress)
            .with_compression(self.compress)
    }

    /// Build the archive the manifest describes
    pub fn run(&self) -> Result<PackSummary> {
        pack_files(&self.output, &self.files, &self.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_defaults() {
        let manifest = PackManifest::from_toml_str(
            r#"
            output = "assets.pack"
            files = ["a.txt", "b.bin"]
            "#,
        )
        .unwrap();

        assert_eq!(manifest.output, PathBuf::from("assets.pack"));
        assert_eq!(manifest.files, vec!["a.txt", "b.bin"]);
        assert!(!manifest.progress);
        assert!(manifest.compress);

        let options = manifest.options();
        assert!(!options.print_progress);
        assert!(options.compress);
    }

    #[test]
    fn test_parse_manifest_flags() {
        let manifest = PackManifest::from_toml_str(
            r#"
            output = "raw.pack"
            progress = true
            compress = false
            files = ["x"]
            "#,
        )
        .unwrap();

        let options = manifest.options();
        assert!(options.print_progress);
        assert!(!options.compress);
    }

    #[test]
    fn test_empty_file_list_is_rejected() {
        let result = PackManifest::from_toml_str("output = \"a.pack\"\nfiles = []\n");
        assert!(matches!(result, Err(PackError::InvalidManifest(_))));
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let result = PackManifest::from_toml_str("output = ");
        assert!(matches!(result, Err(PackError::InvalidManifest(_))));

        let missing = PackManifest::from_toml_str("files = [\"a\"]");
        assert!(matches!(missing, Err(PackError::InvalidManifest(_))));
    }
}
