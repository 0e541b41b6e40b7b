// src/acquire/apt_get.rs

//! Artifact fetcher backed by `apt-get download`

use super::{ArtifactFetcher, FetchError};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs `apt-get download <name>` inside the pool directory
#[derive(Debug, Clone)]
pub struct AptGetFetcher {
    program: String,
}

impl AptGetFetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, name: &str, architecture: &str, working_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("download")
            .arg("-o")
            .arg(format!("APT::Architecture={}", architecture))
            .arg(name)
            .current_dir(working_dir);
        cmd
    }
}

impl Default for AptGetFetcher {
    fn default() -> Self {
        Self::new("apt-get")
    }
}

impl ArtifactFetcher for AptGetFetcher {
    fn fetch(&self, name: &str, architecture: &str, working_dir: &Path) -> Result<(), FetchError> {
        debug!("Running {} download {} in {}", self.program, name, working_dir.display());

        let output = self
            .command(name, architecture, working_dir)
            .output()
            .map_err(|source| FetchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(FetchError::Failed {
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(())
    }
}
