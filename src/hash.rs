// src/hash.rs

//! File digests for repository indices
//!
//! APT verifies every artifact against the checksums listed in the Packages
//! index, and every index against the checksums in the Release file. Both
//! MD5 and SHA-256 are computed in a single streaming pass.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size and checksums of one file or document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigests {
    pub size: u64,
    pub md5: String,
    pub sha256: String,
}

/// Incremental MD5 + SHA-256 hasher
#[derive(Default)]
pub struct DigestHasher {
    md5: Md5,
    sha256: Sha256,
    size: u64,
}

impl DigestHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.md5.update(data);
        self.sha256.update(data);
        self.size += data.len() as u64;
    }

    pub fn finalize(self) -> FileDigests {
        FileDigests {
            size: self.size,
            md5: format!("{:x}", self.md5.finalize()),
            sha256: format!("{:x}", self.sha256.finalize()),
        }
    }
}

/// Digest an in-memory document
pub fn digest_bytes(data: &[u8]) -> FileDigests {
    let mut hasher = DigestHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Digest data from a reader
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<FileDigests> {
    let mut hasher = DigestHasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Digest a file without loading it into memory
pub fn digest_file(path: &Path) -> io::Result<FileDigests> {
    let mut file = File::open(path)?;
    digest_reader(&mut file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_values() {
        let digests = digest_bytes(b"hello world");
        assert_eq!(digests.size, 11);
        assert_eq!(digests.md5, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(
            digests.sha256,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_digest_empty() {
        let digests = digest_bytes(b"");
        assert_eq!(digests.size, 0);
        assert_eq!(digests.md5, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_digest_file_matches_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("artifact.deb");
        let content = vec![7u8; 200_000];
        std::fs::write(&path, &content).unwrap();

        assert_eq!(digest_file(&path).unwrap(), digest_bytes(&content));
    }

    #[test]
    fn test_digest_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = digest_file(&temp_dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
