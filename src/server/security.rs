// src/server/security.rs
//! Path containment for file-serving routes
//!
//! Request paths are resolved lexically against an absolute base directory.
//! Nothing touches the filesystem until the result is known to stay inside
//! that base.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// A request path that would leave its serving directory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("path escapes {}: {request}", base.display())]
pub struct PathRejected {
    pub base: PathBuf,
    pub request: String,
}

/// Absolute form of `path` without resolving symlinks
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `request` below `base`, rejecting any escape
///
/// `base` must already be absolute. `..` segments are applied lexically and
/// may not climb above `base`; absolute request paths are rejected outright.
pub fn resolve_contained(base: &Path, request: &str) -> Result<PathBuf, PathRejected> {
    let reject = || PathRejected {
        base: base.to_path_buf(),
        request: request.to_string(),
    };

    let mut resolved = base.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(request).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(reject());
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(reject()),
        }
    }

    if !resolved.starts_with(base) {
        return Err(reject());
    }
    Ok(resolved)
}
