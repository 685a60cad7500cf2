//! Resolution of archive paths against a platform resource directory.
//!
//! Packaged games usually ship their packs next to the executable, or inside
//! the app bundle on macOS. The reader stays platform-agnostic and asks a
//! [`ResourceLocator`] to turn a raw archive path into an openable one.

use crate::error::{PackError, Result};
use std::path::{Path, PathBuf};

/// Maps a raw archive path to the path that is actually opened
pub trait ResourceLocator {
    fn resolve(&self, raw: &Path) -> Result<PathBuf>;
}

/// Resolves paths relative to a fixed directory
#[derive(Debug, Clone)]
pub struct ResourceDir(pub PathBuf);

impl ResourceLocator for ResourceDir {
    fn resolve(&self, raw: &Path) -> Result<PathBuf> {
        if !self.0.is_dir() {
            return Err(PackError::ResourceDirectoryUnavailable(format!(
                "{} is not a directory",
                self.0.display()
            )));
        }
        Ok(self.0.join(raw))
    }
}

/// Resolves paths relative to the running executable's resource directory:
/// the executable's own directory, or `Contents/Resources` inside a macOS
/// app bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutableDir;

impl ExecutableDir {
    pub fn directory(&self) -> Result<PathBuf> {
        let exe = std::env::current_exe()
            .map_err(|e| PackError::ResourceDirectoryUnavailable(e.to_string()))?;
        let dir = exe.parent().ok_or_else(|| {
            PackError::ResourceDirectoryUnavailable(format!(
                "{} has no parent directory",
                exe.display()
            ))
        })?;

        Ok(bundle_resources(dir))
    }
}

#[cfg(target_os = "macos")]
fn bundle_resources(exe_dir: &Path) -> PathBuf {
    // <App>.app/Contents/MacOS/<exe> -> <App>.app/Contents/Resources
    match exe_dir.parent() {
        Some(contents) if exe_dir.ends_with("Contents/MacOS") => contents.join("Resources"),
        _ => exe_dir.to_path_buf(),
    }
}

#[cfg(not(target_os = "macos"))]
fn bundle_resources(exe_dir: &Path) -> PathBuf {
    exe_dir.to_path_buf()
}

impl ResourceLocator for ExecutableDir {
    fn resolve(&self, raw: &Path) -> Result<PathBuf> {
        Ok(self.directory()?.join(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_dir_joins() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ResourceDir(dir.path().to_path_buf());
        let resolved = locator.resolve(Path::new("assets.pack")).unwrap();
        assert_eq!(resolved, dir.path().join("assets.pack"));
    }

    #[test]
    fn test_missing_resource_dir() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ResourceDir(dir.path().join("does-not-exist"));
        assert!(matches!(
            locator.resolve(Path::new("assets.pack")),
            Err(PackError::ResourceDirectoryUnavailable(_))
        ));
    }

    #[test]
    fn test_executable_dir_resolves() {
        let resolved = ExecutableDir.resolve(Path::new("assets.pack")).unwrap();
        assert!(resolved.ends_with("assets.pack"));
        assert!(resolved.is_absolute());
    }
}
