// src/layout.rs

//! On-disk layout of a mirrored repository
//!
//! ```text
//! <repo>/
//!   manifest.json
//!   pool/
//!   dists/<distribution>/main/binary-<arch>/
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the manifest file at the repository root
pub const MANIFEST_FILE: &str = "manifest.json";

/// Only component this tool publishes
pub const COMPONENT: &str = "main";

/// Paths of one repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn pool_dir(&self) -> PathBuf {
        self.root.join("pool")
    }

    pub fn dists_dir(&self) -> PathBuf {
        self.root.join("dists")
    }

    /// `dists/<dist>`
    pub fn dist_dir(&self, distribution: &str) -> PathBuf {
        self.dists_dir().join(distribution)
    }

    /// `dists/<dist>/main/binary-<arch>`
    pub fn binary_dir(&self, distribution: &str, architecture: &str) -> PathBuf {
        self.dist_dir(distribution)
            .join(COMPONENT)
            .join(format!("binary-{}", architecture))
    }

    /// Create the root, pool, and index directories if missing
    pub fn ensure(&self, distribution: &str, architecture: &str) -> io::Result<()> {
        for dir in [
            self.root.clone(),
            self.pool_dir(),
            self.binary_dir(distribution, architecture),
        ] {
            fs::create_dir_all(&dir)?;
        }
        debug!("Repository layout ready at {}", self.root.display());
        Ok(())
    }
}

/// Index path relative to `dists/<dist>`, as listed in Release files
pub fn binary_index_relpath(architecture: &str, file: &str) -> String {
    format!("{}/binary-{}/{}", COMPONENT, architecture, file)
}

/// Write a file so readers never observe partial content
///
/// Content goes to a sibling `.tmp` file which is synced and then renamed
/// over the destination.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = RepoLayout::new("/srv/repo");
        assert_eq!(layout.manifest_path(), PathBuf::from("/srv/repo/manifest.json"));
        assert_eq!(layout.pool_dir(), PathBuf::from("/srv/repo/pool"));
        assert_eq!(
            layout.binary_dir("focal", "amd64"),
            PathBuf::from("/srv/repo/dists/focal/main/binary-amd64")
        );
        assert_eq!(binary_index_relpath("arm64", "Packages"), "main/binary-arm64/Packages");
    }

    #[test]
    fn test_ensure_creates_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RepoLayout::new(temp_dir.path().join("repo"));
        layout.ensure("jammy", "arm64").unwrap();

        assert!(layout.pool_dir().is_dir());
        assert!(layout.binary_dir("jammy", "arm64").is_dir());
        // Idempotent
        layout.ensure("jammy", "arm64").unwrap();
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("file.txt");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_dir.path().join("nested").join("file.txt.tmp").exists());
    }
}
