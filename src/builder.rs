// src/builder.rs

//! Repository build orchestration
//!
//! resolve closure → acquire each package → persist manifest → write indices.
//!
//! Only resolution and persistence failures abort a build. A build in which
//! every fetch failed still produces a manifest and (empty) indices.

use crate::acquire::{Acquirer, ArtifactFetcher};
use crate::error::{Error, Result};
use crate::index::{DEFAULT_ORIGIN, generate_indices};
use crate::layout::RepoLayout;
use crate::manifest::{Manifest, PackageInfo};
use crate::resolver::{DependencyOracle, resolve_closure};
use rayon::prelude::*;
use tracing::{info, warn};

/// Target and tuning of one build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub architecture: String,
    pub distribution: String,
    /// `Origin:`/`Label:` written to the Release file
    pub origin: String,
    /// Concurrent fetches; 1 keeps acquisition strictly sequential
    pub jobs: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            architecture: "amd64".to_string(),
            distribution: "focal".to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            jobs: 1,
        }
    }
}

/// Builds a mirrored repository under one root
pub struct RepositoryBuilder {
    oracle: Box<dyn DependencyOracle>,
    fetcher: Box<dyn ArtifactFetcher>,
    layout: RepoLayout,
    options: BuildOptions,
}

impl RepositoryBuilder {
    pub fn new(
        oracle: Box<dyn DependencyOracle>,
        fetcher: Box<dyn ArtifactFetcher>,
        layout: RepoLayout,
        options: BuildOptions,
    ) -> Self {
        Self {
            oracle,
            fetcher,
            layout,
            options,
        }
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    /// Build the repository for `requested` and return the persisted manifest
    pub fn build(&self, requested: &[String]) -> Result<Manifest> {
        let BuildOptions {
            architecture,
            distribution,
            ..
        } = &self.options;

        self.layout
            .ensure(distribution, architecture)
            .map_err(|source| Error::Persistence {
                path: self.layout.root().to_path_buf(),
                source,
            })?;

        info!("Resolving dependencies for {} packages", requested.len());
        let closure = resolve_closure(self.oracle.as_ref(), requested, architecture)?;
        info!("Found {} packages to download (including dependencies)", closure.len());

        let mut manifest = Manifest::new(architecture.as_str(), distribution.as_str());
        for package in self.acquire_all(&closure) {
            manifest.record(package);
        }

        let failed = manifest.total_count() - manifest.downloaded_count();
        if failed > 0 {
            warn!("{} of {} packages could not be downloaded", failed, manifest.total_count());
        }

        manifest.save(&self.layout.manifest_path())?;
        generate_indices(&manifest, &self.layout, &self.options.origin)?;

        info!(
            "Processed {} packages ({} downloaded)",
            manifest.total_count(),
            manifest.downloaded_count()
        );
        Ok(manifest)
    }

    /// Fetch every package; results come back in closure order
    fn acquire_all(&self, closure: &[String]) -> Vec<PackageInfo> {
        let acquirer = Acquirer::new(
            self.fetcher.as_ref(),
            self.layout.pool_dir(),
            self.options.architecture.as_str(),
        );
        let total = closure.len();

        if self.options.jobs > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
            {
                Ok(pool) => {
                    info!("Fetching with {} workers", self.options.jobs);
                    return pool.install(|| {
                        closure
                            .par_iter()
                            .map(|name| acquirer.fetch(name))
                            .collect()
                    });
                }
                Err(e) => warn!("Cannot start fetch workers, fetching sequentially: {}", e),
            }
        }

        closure
            .iter()
            .enumerate()
            .map(|(i, name)| {
                info!("[{}/{}] Processing {}", i + 1, total, name);
                acquirer.fetch(name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::FetchError;
    use crate::resolver::OracleError;
    use std::fs;
    use std::path::Path;

    struct StaticOracle;

    impl DependencyOracle for StaticOracle {
        fn query(&self, name: &str, _architecture: &str) -> std::result::Result<String, OracleError> {
            match name {
                "curl" => Ok("curl\n  Depends: libc6\n  Depends: broken\n".to_string()),
                _ => Err(OracleError::Failed {
                    status: "exit status: 100".to_string(),
                    output: String::new(),
                }),
            }
        }
    }

    struct PoolFetcher;

    impl ArtifactFetcher for PoolFetcher {
        fn fetch(&self, name: &str, architecture: &str, working_dir: &Path) -> std::result::Result<(), FetchError> {
            if name == "broken" {
                return Err(FetchError::Failed {
                    status: "exit status: 100".to_string(),
                    output: "E: Unable to locate package broken".to_string(),
                });
            }
            fs::write(working_dir.join(format!("{}_1.0_{}.deb", name, architecture)), name)?;
            Ok(())
        }
    }

    fn builder(root: &Path, jobs: usize) -> RepositoryBuilder {
        RepositoryBuilder::new(
            Box::new(StaticOracle),
            Box::new(PoolFetcher),
            RepoLayout::new(root),
            BuildOptions {
                jobs,
                ..BuildOptions::default()
            },
        )
    }

    #[test]
    fn test_build_absorbs_fetch_failures() {
        let temp_dir = tempfile::tempdir().unwrap();
        let builder = builder(temp_dir.path(), 1);

        let manifest = builder.build(&["curl".to_string()]).unwrap();
        let names: Vec<_> = manifest.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["curl", "libc6", "broken"]);
        assert_eq!(manifest.downloaded_count(), 2);
        assert!(!manifest.get("broken").unwrap().downloaded);

        let loaded = Manifest::load(&builder.layout().manifest_path()).unwrap();
        assert_eq!(loaded, manifest);
        assert!(builder.layout().dist_dir("focal").join("Release").is_file());
    }

    #[test]
    fn test_parallel_build_keeps_closure_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manifest = builder(temp_dir.path(), 4).build(&["curl".to_string()]).unwrap();
        let names: Vec<_> = manifest.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["curl", "libc6", "broken"]);
    }

    #[test]
    fn test_resolution_failure_aborts_before_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let builder = builder(temp_dir.path(), 1);

        let err = builder.build(&["curl".to_string(), "ghost".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
        assert!(!builder.layout().manifest_path().exists());
    }
}
