// src/config.rs

//! Configuration file parsing
//!
//! Supports an optional TOML file with the following sections:
//! - [repository] - Root path, target architecture and distribution
//! - [server] - Bind address and port for serve mode
//! - [download] - Fetch concurrency
//! - [tools] - External programs used as dependency oracle and fetcher
//!
//! Every key has a default, so an empty file is valid. Command-line flags
//! override file values.

use crate::builder::BuildOptions;
use crate::error::{Error, Result};
use crate::index::DEFAULT_ORIGIN;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositorySection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub download: DownloadSection,

    #[serde(default)]
    pub tools: ToolsSection,
}

/// Repository configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    /// Repository root directory
    #[serde(default = "default_repo_path")]
    pub path: PathBuf,

    /// Target architecture (e.g. amd64, arm64)
    #[serde(default = "default_architecture")]
    pub architecture: String,

    /// Target distribution (e.g. focal, jammy)
    #[serde(default = "default_distribution")]
    pub distribution: String,

    /// Origin and Label written to Release
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            path: default_repo_path(),
            architecture: default_architecture(),
            distribution: default_distribution(),
            origin: default_origin(),
        }
    }
}

fn default_repo_path() -> PathBuf {
    PathBuf::from("./repository")
}

fn default_architecture() -> String {
    "amd64".to_string()
}

fn default_distribution() -> String {
    "focal".to_string()
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Download configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadSection {
    /// Concurrent fetches (1 = sequential)
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self { jobs: default_jobs() }
    }
}

fn default_jobs() -> usize {
    1
}

/// External tool configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    #[serde(default = "default_apt_cache")]
    pub apt_cache: String,

    #[serde(default = "default_apt_get")]
    pub apt_get: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            apt_cache: default_apt_cache(),
            apt_get: default_apt_get(),
        }
    }
}

fn default_apt_cache() -> String {
    "apt-cache".to_string()
}

fn default_apt_get() -> String {
    "apt-get".to_string()
}

/// Values given on the command line; `None` keeps the file/default value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repo: Option<PathBuf>,
    pub architecture: Option<String>,
    pub distribution: Option<String>,
    pub port: Option<u16>,
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(repo) = overrides.repo {
            self.repository.path = repo;
        }
        if let Some(architecture) = overrides.architecture {
            self.repository.architecture = architecture;
        }
        if let Some(distribution) = overrides.distribution {
            self.repository.distribution = distribution;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(jobs) = overrides.jobs {
            self.download.jobs = jobs;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_path_component("repository.architecture", &self.repository.architecture)?;
        validate_path_component("repository.distribution", &self.repository.distribution)?;

        if self.repository.origin.trim().is_empty() || self.repository.origin.contains('\n') {
            return Err(Error::Config(
                "repository.origin must be a non-empty single line".to_string(),
            ));
        }

        if self.download.jobs == 0 {
            return Err(Error::Config("download.jobs must be at least 1".to_string()));
        }

        self.server
            .bind
            .parse::<IpAddr>()
            .map_err(|e| Error::Config(format!("invalid server.bind '{}': {}", self.server.bind, e)))?;

        Ok(())
    }

    /// Socket address for serve mode
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|e| Error::Config(format!("invalid server.bind '{}': {}", self.server.bind, e)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Build options derived from this configuration
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            architecture: self.repository.architecture.clone(),
            distribution: self.repository.distribution.clone(),
            origin: self.repository.origin.clone(),
            jobs: self.download.jobs,
        }
    }
}

/// Architecture and distribution become directory names under `dists/`
fn validate_path_component(key: &str, value: &str) -> Result<()> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.chars().any(char::is_whitespace)
    {
        return Err(Error::Config(format!(
            "{} must be a single path component, got '{}'",
            key, value
        )));
    }
    Ok(())
}
