// src/resolver/apt_cache.rs

//! Dependency oracle backed by the host's `apt-cache`

use super::{DependencyOracle, OracleError};
use std::process::Command;
use tracing::debug;

/// Relation kinds excluded from the recursive listing
const EXCLUDED_RELATIONS: &[&str] = &[
    "--no-recommends",
    "--no-suggests",
    "--no-conflicts",
    "--no-breaks",
    "--no-replaces",
    "--no-enhances",
];

/// Runs `apt-cache depends --recurse` for each query
#[derive(Debug, Clone)]
pub struct AptCacheOracle {
    program: String,
}

impl AptCacheOracle {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, name: &str, architecture: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("depends")
            .arg("--recurse")
            .args(EXCLUDED_RELATIONS)
            .arg("-o")
            .arg(format!("APT::Architecture={}", architecture))
            .arg(name);
        cmd
    }
}

impl Default for AptCacheOracle {
    fn default() -> Self {
        Self::new("apt-cache")
    }
}

impl DependencyOracle for AptCacheOracle {
    fn query(&self, name: &str, architecture: &str) -> Result<String, OracleError> {
        debug!("Querying {} for {} ({})", self.program, name, architecture);

        let output = self
            .command(name, architecture)
            .output()
            .map_err(|source| OracleError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OracleError::Failed {
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
