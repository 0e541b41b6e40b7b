// src/resolver/mod.rs

//! Dependency closure resolution
//!
//! The closure of a request is every requested name plus every hard
//! dependency the oracle reports for it, deduplicated across the whole batch.
//! Resolution is fail-fast: if the oracle fails for any requested name, no
//! partial closure is returned.

mod apt_cache;
mod parse;

pub use apt_cache::AptCacheOracle;
pub use parse::{parse_dependency_line, parse_dependency_output};

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::io;
use thiserror::Error;
use tracing::{debug, info};

/// Failure of a single oracle query
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("oracle exited with {status}: {output}")]
    Failed { status: String, output: String },
}

/// Source of recursive dependency listings
///
/// Implementations return raw listing text; filtering of soft relations,
/// alternatives, and virtual packages happens in [`parse_dependency_output`].
pub trait DependencyOracle: Send + Sync {
    fn query(&self, name: &str, architecture: &str) -> std::result::Result<String, OracleError>;
}

/// Dependency names the oracle reports for one package
pub fn resolve_dependencies(
    oracle: &dyn DependencyOracle,
    name: &str,
    architecture: &str,
) -> Result<Vec<String>> {
    let output = oracle
        .query(name, architecture)
        .map_err(|source| Error::Resolution {
            package: name.to_string(),
            source,
        })?;
    Ok(parse_dependency_output(&output))
}

/// Resolve the transitive closure of `requested`
///
/// Order is first occurrence: each requested name, followed by its newly
/// seen dependencies, in request order.
pub fn resolve_closure(
    oracle: &dyn DependencyOracle,
    requested: &[String],
    architecture: &str,
) -> Result<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut closure = Vec::new();

    for name in requested {
        let dependencies = resolve_dependencies(oracle, name, architecture)?;
        debug!("{} has {} hard dependencies", name, dependencies.len());

        for package in std::iter::once(name.clone()).chain(dependencies) {
            if seen.insert(package.clone()) {
                closure.push(package);
            }
        }
    }

    info!(
        "Resolved {} requested packages to {} packages",
        requested.len(),
        closure.len()
    );
    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Oracle answering from canned listings
    struct CannedOracle {
        listings: HashMap<&'static str, &'static str>,
    }

    impl DependencyOracle for CannedOracle {
        fn query(&self, name: &str, _architecture: &str) -> std::result::Result<String, OracleError> {
            self.listings
                .get(name)
                .map(|s| s.to_string())
                .ok_or_else(|| OracleError::Failed {
                    status: "exit status: 100".to_string(),
                    output: format!("E: No packages found: {}", name),
                })
        }
    }

    fn oracle() -> CannedOracle {
        CannedOracle {
            listings: HashMap::from([
                ("curl", "curl\n  Depends: libc6\n  Depends: libcurl4\nlibcurl4\n  Depends: zlib1g\n"),
                ("wget", "wget\n  Depends: libc6\n  Depends: libpcre2-8-0\n |Depends: libidn2-0\n"),
                ("tzdata", "tzdata\n  Depends: <debconf-2.0>\n"),
            ]),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_closure_contains_requested() {
        let requested = names(&["tzdata", "curl"]);
        let closure = resolve_closure(&oracle(), &requested, "amd64").unwrap();

        for name in &requested {
            assert!(closure.contains(name));
        }
        assert_eq!(closure, names(&["tzdata", "curl", "libc6", "libcurl4", "zlib1g"]));
    }

    #[test]
    fn test_shared_dependency_appears_once() {
        let closure = resolve_closure(&oracle(), &names(&["curl", "wget"]), "amd64").unwrap();
        assert_eq!(closure.iter().filter(|n| *n == "libc6").count(), 1);
        assert!(!closure.contains(&"libidn2-0".to_string()));
    }

    #[test]
    fn test_closure_is_idempotent() {
        let requested = names(&["wget", "curl"]);
        let first = resolve_closure(&oracle(), &requested, "amd64").unwrap();
        let second = resolve_closure(&oracle(), &requested, "amd64").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_oracle_failure_is_fatal() {
        let err = resolve_closure(&oracle(), &names(&["curl", "nosuchpkg"]), "amd64").unwrap_err();
        match err {
            Error::Resolution { package, .. } => assert_eq!(package, "nosuchpkg"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
