// tests/common/mod.rs

//! Shared test doubles for integration tests.
//!
//! The oracle and fetcher stand in for apt-cache and apt-get so builds run
//! against canned package data.

#![allow(dead_code)]

use aptvault::acquire::{ArtifactFetcher, FetchError};
use aptvault::builder::{BuildOptions, RepositoryBuilder};
use aptvault::layout::RepoLayout;
use aptvault::resolver::{DependencyOracle, OracleError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Dependency oracle answering from canned `apt-cache depends` output
#[derive(Default)]
pub struct FakeOracle {
    outputs: HashMap<String, String>,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, output: &str) -> Self {
        self.outputs.insert(name.to_string(), output.to_string());
        self
    }
}

impl DependencyOracle for FakeOracle {
    fn query(&self, name: &str, _architecture: &str) -> Result<String, OracleError> {
        self.outputs.get(name).cloned().ok_or_else(|| OracleError::Failed {
            status: "exit status: 100".to_string(),
            output: format!("E: No packages found: {}", name),
        })
    }
}

/// Fetcher writing canned artifacts; unknown packages fail
#[derive(Default)]
pub struct FakeFetcher {
    artifacts: HashMap<String, Vec<(String, Vec<u8>)>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` fetches into a single file with the given contents
    pub fn with(self, name: &str, filename: &str, content: &[u8]) -> Self {
        self.with_files(name, &[(filename, content)])
    }

    /// `name` fetches into several files at once
    pub fn with_files(mut self, name: &str, files: &[(&str, &[u8])]) -> Self {
        self.artifacts.insert(
            name.to_string(),
            files
                .iter()
                .map(|(filename, content)| (filename.to_string(), content.to_vec()))
                .collect(),
        );
        self
    }
}

impl ArtifactFetcher for FakeFetcher {
    fn fetch(&self, name: &str, _architecture: &str, working_dir: &Path) -> Result<(), FetchError> {
        let files = self.artifacts.get(name).ok_or_else(|| FetchError::Failed {
            status: "exit status: 100".to_string(),
            output: format!("E: Unable to locate package {}", name),
        })?;
        for (filename, content) in files {
            fs::write(working_dir.join(filename), content)?;
        }
        Ok(())
    }
}

/// `apt-cache depends --recurse` output for curl on focal
pub const CURL_DEPENDS: &str = "\
curl
  Depends: libc6
  Depends: libcurl4
 |Depends: libcurl3-alt
  Recommends: ca-certificates
  Suggests: curl-doc
  Depends: zlib1g
  PreDepends: <libc-dev>
libc6
  Depends: libgcc-s1
  Breaks: <libc6-old>
libcurl4
  Depends: libc6
  Depends: zlib1g
zlib1g
  Depends: libc6
libgcc-s1
  Depends: libc6
";

/// Oracle and fetcher for the curl closure with one unfetchable package
///
/// Five packages resolve; libcurl4 and libgcc-s1 fail to download.
pub fn curl_fixture() -> (FakeOracle, FakeFetcher) {
    let oracle = FakeOracle::new().with("curl", CURL_DEPENDS);
    let fetcher = FakeFetcher::new()
        .with("curl", "curl_7.68.0-1ubuntu2_amd64.deb", b"curl-artifact")
        .with("libc6", "libc6_2.31-0ubuntu9_amd64.deb", b"libc6-artifact")
        .with("zlib1g", "zlib1g_1%3a1.2.11.dfsg-2ubuntu1_amd64.deb", b"zlib-artifact");
    (oracle, fetcher)
}

/// Build the curl fixture into a fresh temporary repository
pub fn build_curl_repo() -> (TempDir, RepoLayout) {
    let temp_dir = tempfile::tempdir().unwrap();
    let layout = RepoLayout::new(temp_dir.path().join("repository"));
    let (oracle, fetcher) = curl_fixture();

    RepositoryBuilder::new(
        Box::new(oracle),
        Box::new(fetcher),
        layout.clone(),
        BuildOptions::default(),
    )
    .build(&["curl".to_string()])
    .unwrap();

    (temp_dir, layout)
}
