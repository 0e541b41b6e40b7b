// src/error.rs

//! Crate-wide error type
//!
//! Only failures at orchestration boundaries surface here: dependency
//! resolution, persistence, index storage, configuration, and server startup.
//! Per-package fetch failures never become an [`Error`]; the acquirer folds
//! them into the manifest instead.

use crate::resolver::OracleError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the build and serve entry points
#[derive(Error, Debug)]
pub enum Error {
    /// The dependency oracle failed for a requested package
    #[error("failed to resolve dependencies for '{package}': {source}")]
    Resolution {
        package: String,
        #[source]
        source: OracleError,
    },

    /// The manifest or a repository file could not be written
    #[error("failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest exists but is not a valid document
    #[error("invalid manifest {}: {source}", path.display())]
    ManifestFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Index documents could not be written
    #[error("failed to write index {}: {source}", path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The repository cannot be served
    #[error("cannot start repository server: {0}")]
    ServerStartup(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
