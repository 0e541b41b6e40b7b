// src/acquire/mod.rs

//! Artifact acquisition
//!
//! Drives the external fetch mechanism for one package at a time and turns
//! the outcome into a [`PackageInfo`]. Acquisition never fails a build: any
//! error becomes a `downloaded = false` record and a warning.
//!
//! Fetched files follow the pool naming convention
//! `name_version_arch.deb`, with `:` in the version encoded as `%3a`.

mod apt_get;

pub use apt_get::AptGetFetcher;

use crate::manifest::PackageInfo;
use crate::version::DebVersion;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version recorded when a filename does not have the expected shape
pub const UNKNOWN_VERSION: &str = "unknown";

/// Architecture field of packages installable on every architecture
pub const ARCH_ALL: &str = "all";

/// Why a single package could not be acquired
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("fetch exited with {status}, output: {output}")]
    Failed { status: String, output: String },

    #[error("no artifact matching {pattern} after fetch")]
    NoArtifact { pattern: String },

    #[error("invalid pool pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Mechanism that places a package artifact into a directory
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `name` into `working_dir`
    ///
    /// On success exactly one artifact named by convention is expected there.
    fn fetch(&self, name: &str, architecture: &str, working_dir: &Path) -> Result<(), FetchError>;
}

/// Fields encoded in a pool filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub name: String,
    pub version: String,
    pub architecture: String,
}

impl ArtifactName {
    /// Parse `name_version_arch.deb`
    ///
    /// Returns `None` unless the stem has exactly three `_`-separated fields.
    pub fn parse(filename: &str) -> Option<Self> {
        let stem = filename
            .strip_suffix(".deb")
            .or_else(|| filename.strip_suffix(".udeb"))
            .unwrap_or(filename);

        let mut fields = stem.split('_');
        let name = fields.next()?;
        let version = fields.next()?;
        let architecture = fields.next()?;
        if fields.next().is_some() || name.is_empty() || version.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            version: decode_version(version),
            architecture: architecture.to_string(),
        })
    }
}

/// Version field of a pool filename, or [`UNKNOWN_VERSION`]
pub fn version_from_filename(filename: &str) -> String {
    ArtifactName::parse(filename)
        .map(|artifact| artifact.version)
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

/// Undo the `%3a` escaping dpkg applies to epochs in filenames
fn decode_version(raw: &str) -> String {
    raw.replace("%3a", ":").replace("%3A", ":")
}

/// Order candidate files: highest parsed version, then lexically last name
fn compare_candidates(a: &str, b: &str) -> Ordering {
    let version = |f: &str| ArtifactName::parse(f).and_then(|n| DebVersion::parse(&n.version));
    match (version(a), version(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

/// Pick the artifact to record from several matching pool files
pub fn select_artifact<'a>(candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(String::as_str)
        .max_by(|a, b| compare_candidates(a, b))
}

/// Drives an [`ArtifactFetcher`] against one pool directory
pub struct Acquirer<'a> {
    fetcher: &'a dyn ArtifactFetcher,
    pool_dir: PathBuf,
    architecture: String,
}

impl<'a> Acquirer<'a> {
    pub fn new(
        fetcher: &'a dyn ArtifactFetcher,
        pool_dir: impl Into<PathBuf>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            pool_dir: pool_dir.into(),
            architecture: architecture.into(),
        }
    }

    /// Fetch one package; failures are recorded, never returned
    pub fn fetch(&self, name: &str) -> PackageInfo {
        match self.try_fetch(name) {
            Ok(info) => {
                info!("Downloaded {} ({} bytes)", info.filename, info.size_bytes);
                info
            }
            Err(e) => {
                warn!("Failed to download {}: {}", name, e);
                PackageInfo::failed(name, &self.architecture)
            }
        }
    }

    fn try_fetch(&self, name: &str) -> Result<PackageInfo, FetchError> {
        self.fetcher.fetch(name, &self.architecture, &self.pool_dir)?;

        let candidates: Vec<String> = self
            .find_candidates(name)?
            .into_iter()
            .filter(|f| self.accepts_architecture(f))
            .collect();
        let filename = select_artifact(&candidates).ok_or_else(|| FetchError::NoArtifact {
            pattern: format!("{}_*.deb", name),
        })?;
        if candidates.len() > 1 {
            debug!(
                "{} candidates for {}, selected {}",
                candidates.len(),
                name,
                filename
            );
        }

        let size_bytes = fs::metadata(self.pool_dir.join(filename))?.len();
        let (version, architecture) = match ArtifactName::parse(filename) {
            Some(artifact) => (artifact.version, artifact.architecture),
            None => (UNKNOWN_VERSION.to_string(), self.architecture.clone()),
        };

        Ok(PackageInfo {
            name: name.to_string(),
            version,
            architecture,
            filename: filename.to_string(),
            size_bytes,
            downloaded: true,
        })
    }

    /// Whether a pool file can serve the target architecture
    ///
    /// Names without a parseable architecture field are kept; they only win
    /// when nothing parseable exists.
    fn accepts_architecture(&self, filename: &str) -> bool {
        match ArtifactName::parse(filename) {
            Some(artifact) => {
                artifact.architecture == self.architecture || artifact.architecture == ARCH_ALL
            }
            None => true,
        }
    }

    /// File names in the pool matching `name_*.deb`
    fn find_candidates(&self, name: &str) -> Result<Vec<String>, FetchError> {
        let pattern = format!(
            "{}/{}_*.deb",
            glob::Pattern::escape(&self.pool_dir.to_string_lossy()),
            glob::Pattern::escape(name)
        );

        let paths = glob::glob(&pattern).map_err(|e| FetchError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut candidates = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| FetchError::Io(e.into_error()))?;
            if !path.is_file() {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|f| f.to_str()) {
                candidates.push(file_name.to_string());
            }
        }
        Ok(candidates)
    }
}
