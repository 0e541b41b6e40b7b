// src/lib.rs

//! aptvault: offline APT repository mirroring
//!
//! Builds a self-contained Debian repository for a set of requested packages
//! and their full hard-dependency closure, then serves it to air-gapped
//! clients.
//!
//! # Architecture
//!
//! - Resolution: `apt-cache depends --recurse` output parsed into a closure
//! - Acquisition: `apt-get download` into a flat `pool/`, failures recorded
//! - Manifest: `manifest.json` is the single source of truth for the pool
//! - Indices: Packages, Packages.gz and Release derived from manifest + pool
//! - Server: read-only HTTP facade that re-derives indices per request

pub mod acquire;
pub mod builder;
pub mod config;
mod error;
pub mod hash;
pub mod index;
pub mod layout;
pub mod manifest;
pub mod resolver;
pub mod version;

#[cfg(feature = "server")]
pub mod server;

pub use acquire::{AptGetFetcher, ArtifactFetcher, FetchError};
pub use builder::{BuildOptions, RepositoryBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use index::{IndexSet, generate_indices};
pub use layout::RepoLayout;
pub use manifest::{Manifest, PackageInfo};
pub use resolver::{AptCacheOracle, DependencyOracle, OracleError, resolve_closure};
pub use version::DebVersion;
