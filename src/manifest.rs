// src/manifest.rs

//! Repository manifest
//!
//! The manifest is the single source of truth for what a mirrored repository
//! claims to contain. It is written once per build and loaded read-only by the
//! server. Package order is processing order.

use crate::error::{Error, Result};
use crate::layout::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// State of one package in the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    /// Empty unless downloaded
    #[serde(default)]
    pub version: String,
    pub architecture: String,
    /// File name inside `pool/`, empty unless downloaded
    #[serde(default)]
    pub filename: String,
    /// Artifact size in bytes
    #[serde(default, rename = "size")]
    pub size_bytes: u64,
    pub downloaded: bool,
}

impl PackageInfo {
    /// A package that was resolved but could not be fetched
    pub fn failed(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            architecture: architecture.into(),
            filename: String::new(),
            size_bytes: 0,
            downloaded: false,
        }
    }
}

/// Persisted record of one repository build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub created_at: DateTime<Utc>,
    pub architecture: String,
    pub distribution: String,
    #[serde(default)]
    pub packages: Vec<PackageInfo>,
}

impl Manifest {
    pub fn new(architecture: impl Into<String>, distribution: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            architecture: architecture.into(),
            distribution: distribution.into(),
            packages: Vec::new(),
        }
    }

    /// Append a package, replacing any earlier record with the same name
    ///
    /// The replaced record keeps its position so order stays deterministic.
    pub fn record(&mut self, info: PackageInfo) {
        match self.packages.iter_mut().find(|p| p.name == info.name) {
            Some(existing) => *existing = info,
            None => self.packages.push(info),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PackageInfo> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn total_count(&self) -> usize {
        self.packages.len()
    }

    pub fn downloaded_count(&self) -> usize {
        self.downloaded().count()
    }

    /// Packages whose artifacts were fetched
    pub fn downloaded(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.iter().filter(|p| p.downloaded)
    }

    /// Load a manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read(path)?;
        let manifest: Manifest =
            serde_json::from_slice(&content).map_err(|source| Error::ManifestFormat {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            "Loaded manifest {} ({} packages)",
            path.display(),
            manifest.packages.len()
        );
        Ok(manifest)
    }

    /// Persist the manifest with an atomic replace
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| Error::ManifestFormat {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, &json).map_err(|source| Error::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote manifest {}", path.display());
        Ok(())
    }
}
