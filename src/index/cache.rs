// src/index/cache.rs

//! Pool digest cache
//!
//! Built once when a repository is loaded for serving and never mutated
//! afterwards. A cached digest is only used while the pool file's length and
//! modification time still match what was hashed; anything else is hashed
//! again from disk.

use crate::hash::{FileDigests, digest_file};
use crate::manifest::Manifest;
use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{info, warn};

/// Identity of a pool file at hashing time
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(metadata: &Metadata) -> Self {
        Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }
}

/// Digests of pool files keyed by pool-relative filename
#[derive(Debug, Clone, Default)]
pub struct DigestCache {
    entries: HashMap<String, (FileStamp, FileDigests)>,
}

impl DigestCache {
    /// Hash every downloaded artifact currently present in the pool
    pub fn build(manifest: &Manifest, pool_dir: &Path) -> Self {
        let mut entries = HashMap::new();

        for package in manifest.downloaded() {
            if package.filename.is_empty() {
                continue;
            }
            let path = pool_dir.join(&package.filename);
            let metadata = match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            match digest_file(&path) {
                Ok(digests) => {
                    entries.insert(package.filename.clone(), (FileStamp::of(&metadata), digests));
                }
                Err(e) => warn!("Cannot hash {}: {}", path.display(), e),
            }
        }

        info!("Cached digests for {} pool artifacts", entries.len());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached digests for `filename` if `metadata` still matches
    fn lookup(&self, filename: &str, metadata: &Metadata) -> Option<&FileDigests> {
        self.entries
            .get(filename)
            .filter(|(stamp, _)| *stamp == FileStamp::of(metadata))
            .map(|(_, digests)| digests)
    }

    /// Digests of the pool file at `path`, or `None` if it is not a file
    pub fn digest(&self, path: &Path, filename: &str) -> io::Result<Option<FileDigests>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        match self.lookup(filename, &metadata) {
            Some(digests) => Ok(Some(digests.clone())),
            None => digest_file(path).map(Some),
        }
    }
}
