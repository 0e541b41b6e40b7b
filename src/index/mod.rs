// src/index/mod.rs

//! Repository index synthesis
//!
//! Index documents are a pure function of a manifest and the current pool
//! contents. The builder persists them under `dists/`; the server computes
//! them per request against a [`DigestCache`]. Both go through
//! [`IndexSet::synthesize_with`].

mod cache;
mod packages;
mod release;

pub use cache::DigestCache;
pub use packages::{MIRRORED_DESCRIPTION, PackageEntry, collect_entries, render_packages};
pub use release::{RELEASE_DATE_FORMAT, ReleaseFields, format_release_date, render_release};

use crate::error::{Error, Result};
use crate::hash::digest_bytes;
use crate::layout::{RepoLayout, binary_index_relpath, write_atomic};
use crate::manifest::Manifest;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub const PACKAGES_FILE: &str = "Packages";
pub const PACKAGES_GZ_FILE: &str = "Packages.gz";
pub const RELEASE_FILE: &str = "Release";

/// Default `Origin:`/`Label:` for Release documents
pub const DEFAULT_ORIGIN: &str = "aptvault";

/// One consistent snapshot of the index documents for a distribution
#[derive(Debug, Clone)]
pub struct IndexSet {
    pub distribution: String,
    pub architecture: String,
    /// Number of stanzas in the Packages index
    pub package_count: usize,
    pub packages: String,
    pub packages_gz: Vec<u8>,
    pub release: String,
}

impl IndexSet {
    /// Synthesize the Packages, Packages.gz, and Release documents, hashing
    /// every pool file
    pub fn synthesize(
        manifest: &Manifest,
        pool_dir: &Path,
        origin: &str,
        date: DateTime<Utc>,
    ) -> io::Result<Self> {
        Self::synthesize_with(manifest, pool_dir, &DigestCache::default(), origin, date)
    }

    /// Synthesize reusing digests of pool files unchanged since `cache` was built
    pub fn synthesize_with(
        manifest: &Manifest,
        pool_dir: &Path,
        cache: &DigestCache,
        origin: &str,
        date: DateTime<Utc>,
    ) -> io::Result<Self> {
        let entries = collect_entries(manifest, pool_dir, cache);
        let packages = render_packages(&entries);
        let packages_gz = gzip(packages.as_bytes())?;

        let architecture = manifest.architecture.as_str();
        let release = render_release(&ReleaseFields {
            origin,
            distribution: &manifest.distribution,
            architecture,
            date,
            files: vec![
                (
                    binary_index_relpath(architecture, PACKAGES_FILE),
                    digest_bytes(packages.as_bytes()),
                ),
                (
                    binary_index_relpath(architecture, PACKAGES_GZ_FILE),
                    digest_bytes(&packages_gz),
                ),
            ],
        });

        Ok(Self {
            distribution: manifest.distribution.clone(),
            architecture: manifest.architecture.clone(),
            package_count: entries.len(),
            packages,
            packages_gz,
            release,
        })
    }

    /// Persist the documents under `dists/<dist>/`
    pub fn write(&self, layout: &RepoLayout) -> Result<()> {
        let binary_dir = layout.binary_dir(&self.distribution, &self.architecture);
        let documents = [
            (binary_dir.join(PACKAGES_FILE), self.packages.as_bytes()),
            (binary_dir.join(PACKAGES_GZ_FILE), self.packages_gz.as_slice()),
            (
                layout.dist_dir(&self.distribution).join(RELEASE_FILE),
                self.release.as_bytes(),
            ),
        ];

        for (path, content) in documents {
            write_atomic(&path, content).map_err(|source| Error::Index { path, source })?;
        }
        Ok(())
    }
}

/// Synthesize and persist indices for a manifest
pub fn generate_indices(manifest: &Manifest, layout: &RepoLayout, origin: &str) -> Result<IndexSet> {
    let pool_dir = layout.pool_dir();
    let indices = IndexSet::synthesize(manifest, &pool_dir, origin, Utc::now()).map_err(|source| {
        Error::Index {
            path: layout.binary_dir(&manifest.distribution, &manifest.architecture),
            source,
        }
    })?;
    indices.write(layout)?;

    info!(
        "Wrote indices for {}/{} ({} packages)",
        indices.distribution, indices.architecture, indices.package_count
    );
    Ok(indices)
}

/// Gzip a document at the default compression level
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
