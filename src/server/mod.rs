// src/server/mod.rs
//! Repository server
//!
//! A read-only HTTP facade over one mirrored repository:
//! - Serves pool artifacts and static index documents
//! - Synthesizes the Packages index (and its Release) per request from the
//!   loaded manifest and the live pool contents
//! - Reports health and repository information as JSON
//!
//! The manifest is loaded once at startup and never mutated, so handlers
//! share it without locking. Each [`ServerState`] owns its own router; any
//! number of servers can coexist in one process.

mod handlers;
mod routes;
pub mod security;

pub use routes::create_router;
pub use security::{PathRejected, resolve_contained};

use crate::error::{Error, Result};
use crate::index::{DEFAULT_ORIGIN, DigestCache};
use crate::layout::{COMPONENT, RepoLayout, binary_index_relpath};
use crate::manifest::{Manifest, PackageInfo};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Repository root containing manifest.json, pool/ and dists/
    pub repo_root: PathBuf,
    /// Origin and Label for synthesized Release documents
    pub origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            repo_root: PathBuf::from("./repository"),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

/// Shared, immutable server state
#[derive(Debug)]
pub struct ServerState {
    pub config: ServerConfig,
    /// Layout rooted at the absolute repository path
    pub layout: RepoLayout,
    pub manifest: Manifest,
    /// Pool digests taken at load; stale entries are rehashed per request
    pub digests: DigestCache,
}

impl ServerState {
    /// Load the repository for serving
    ///
    /// Fails if the root is missing or the manifest cannot be read or parsed.
    /// Missing pool files only produce warnings.
    pub fn load(config: ServerConfig) -> Result<Self> {
        if !config.repo_root.is_dir() {
            return Err(Error::ServerStartup(format!(
                "repository directory does not exist: {}",
                config.repo_root.display()
            )));
        }

        let layout = RepoLayout::new(security::absolute(&config.repo_root));
        let manifest = Manifest::load(&layout.manifest_path()).map_err(|e| {
            Error::ServerStartup(format!(
                "failed to load manifest {}: {}",
                layout.manifest_path().display(),
                e
            ))
        })?;

        let digests = DigestCache::build(&manifest, &layout.pool_dir());
        let state = Self {
            config,
            layout,
            manifest,
            digests,
        };

        let missing = state.missing_artifacts();
        for package in &missing {
            warn!("Package file missing: {}", package.filename);
        }
        if !missing.is_empty() {
            warn!("{} package files are missing from the repository", missing.len());
        }

        Ok(state)
    }

    /// Downloaded packages whose pool file is not present
    pub fn missing_artifacts(&self) -> Vec<&PackageInfo> {
        let pool_dir = self.layout.pool_dir();
        self.manifest
            .downloaded()
            .filter(|p| !pool_dir.join(&p.filename).is_file())
            .collect()
    }

    /// Path below `dists/` of the synthesized Packages index
    pub fn packages_route(&self) -> String {
        format!(
            "{}/{}",
            self.manifest.distribution,
            binary_index_relpath(&self.manifest.architecture, crate::index::PACKAGES_FILE)
        )
    }

    /// APT source line for clients reaching this server at `host`
    pub fn source_line(&self, host: &str) -> String {
        format!(
            "deb [trusted=yes] http://{}/ {} {}",
            host, self.manifest.distribution, COMPONENT
        )
    }

    /// Host used in instructions when the request carries none
    pub fn default_host(&self) -> String {
        format!("localhost:{}", self.config.bind_addr.port())
    }
}

/// Start the repository server and run until the listener fails
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let bind_addr = config.bind_addr;
    let state = Arc::new(ServerState::load(config)?);

    info!("Repository: {}", state.layout.root().display());
    info!(
        "Serving {} packages ({} downloaded) for {}/{}",
        state.manifest.total_count(),
        state.manifest.downloaded_count(),
        state.manifest.distribution,
        state.manifest.architecture
    );
    info!("Client source line: {}", state.source_line(&state.default_host()));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| Error::ServerStartup(format!("failed to bind {}: {}", bind_addr, e)))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
