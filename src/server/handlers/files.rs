// src/server/handlers/files.rs
//! Pool and dists file serving
//!
//! Every request path is resolved against its route's directory before any
//! filesystem access. The Packages index, its gzip form, and the Release
//! document are synthesized per request from the manifest and the live pool;
//! everything else under `dists/` and `pool/` is served as stored.

use crate::index::{IndexSet, PACKAGES_GZ_FILE, RELEASE_FILE};
use crate::layout::binary_index_relpath;
use crate::server::ServerState;
use crate::server::security::resolve_contained;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

const DEB_CONTENT_TYPE: &str = "application/vnd.debian.binary-package";
const GZIP_CONTENT_TYPE: &str = "application/gzip";
const INDEX_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Index documents synthesized on request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Synthesized {
    Packages,
    PackagesGz,
    Release,
}

/// GET /pool/*path
pub async fn pool_file(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<String>,
) -> Response {
    serve_contained(&state.layout.pool_dir(), &path).await
}

/// GET /dists/*path
pub async fn dists_file(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<String>,
) -> Response {
    let dists_dir = state.layout.dists_dir();
    if let Err(e) = resolve_contained(&dists_dir, &path) {
        warn!("Rejected request: {}", e);
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    match synthesized_target(&state, &path) {
        Some(target) => serve_synthesized(state, target).await,
        None => serve_contained(&dists_dir, &path).await,
    }
}

/// Map a `dists/` request path onto a synthesized document
fn synthesized_target(state: &ServerState, path: &str) -> Option<Synthesized> {
    let manifest = &state.manifest;
    let packages = state.packages_route();
    let packages_gz = format!(
        "{}/{}",
        manifest.distribution,
        binary_index_relpath(&manifest.architecture, PACKAGES_GZ_FILE)
    );
    let release = format!("{}/{}", manifest.distribution, RELEASE_FILE);
    let request = path.trim_start_matches('/');

    if request == packages {
        Some(Synthesized::Packages)
    } else if request == packages_gz {
        Some(Synthesized::PackagesGz)
    } else if request == release {
        Some(Synthesized::Release)
    } else {
        None
    }
}

async fn serve_synthesized(state: Arc<ServerState>, target: Synthesized) -> Response {
    let indices = tokio::task::spawn_blocking(move || {
        IndexSet::synthesize_with(
            &state.manifest,
            &state.layout.pool_dir(),
            &state.digests,
            &state.config.origin,
            Utc::now(),
        )
    })
    .await;

    let indices = match indices {
        Ok(Ok(indices)) => indices,
        Ok(Err(e)) => {
            error!("Failed to synthesize indices: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Index generation failed").into_response();
        }
        Err(e) => {
            error!("Index synthesis task failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Index generation failed").into_response();
        }
    };

    debug!("Synthesized {:?} with {} packages", target, indices.package_count);

    match target {
        Synthesized::Packages => document(INDEX_CONTENT_TYPE, indices.packages.into_bytes()),
        Synthesized::PackagesGz => document(GZIP_CONTENT_TYPE, indices.packages_gz),
        Synthesized::Release => document(INDEX_CONTENT_TYPE, indices.release.into_bytes()),
    }
}

fn document(content_type: &'static str, content: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        content,
    )
        .into_response()
}

/// Stream a stored file from below `base`
async fn serve_contained(base: &FsPath, request: &str) -> Response {
    let path = match resolve_contained(base, request) {
        Ok(path) => path,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }
    };

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return (StatusCode::NOT_FOUND, "Not found").into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
    };

    let body = Body::from_stream(ReaderStream::new(file));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&path).to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response()
}

/// Content type by file name
fn content_type_for(path: &FsPath) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str());
    match extension {
        Some("deb") | Some("udeb") => DEB_CONTENT_TYPE,
        Some("gz") => GZIP_CONTENT_TYPE,
        _ => match path.file_name().and_then(|n| n.to_str()) {
            Some("Packages") | Some("Release") | Some("InRelease") | Some("Sources") => {
                INDEX_CONTENT_TYPE
            }
            _ => BINARY_CONTENT_TYPE,
        },
    }
}
