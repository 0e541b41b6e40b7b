// src/server/handlers/status.rs
//! Landing page, health, and repository information endpoints

use crate::manifest::PackageInfo;
use crate::server::ServerState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::Html,
};
use serde::Serialize;
use std::sync::Arc;

const HEALTH_OK: &str = "ok";

/// Client command that picks up the repository after it is added
const UPDATE_COMMAND: &str = "sudo apt update";

/// GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub packages_total: usize,
    pub packages_downloaded: usize,
    pub repository_path: String,
    pub distribution: String,
    pub architecture: String,
    /// RFC 3339 manifest creation time
    pub created_at: String,
}

/// GET /info
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub repository: RepositoryInfo,
    pub packages: Vec<PackageInfo>,
    pub usage: UsageInfo,
}

#[derive(Debug, Serialize)]
pub struct RepositoryInfo {
    pub path: String,
    pub distribution: String,
    pub architecture: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct UsageInfo {
    /// APT source line for this server
    pub add_repo: String,
    pub update: &'static str,
}

/// Host the client used to reach us, or the configured fallback
fn request_host(state: &ServerState, headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.default_host())
}

pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let manifest = &state.manifest;
    Json(HealthResponse {
        status: HEALTH_OK,
        packages_total: manifest.total_count(),
        packages_downloaded: manifest.downloaded_count(),
        repository_path: state.layout.root().display().to_string(),
        distribution: manifest.distribution.clone(),
        architecture: manifest.architecture.clone(),
        created_at: manifest.created_at.to_rfc3339(),
    })
}

pub async fn info(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Json<InfoResponse> {
    let manifest = &state.manifest;
    let host = request_host(&state, &headers);

    Json(InfoResponse {
        repository: RepositoryInfo {
            path: state.layout.root().display().to_string(),
            distribution: manifest.distribution.clone(),
            architecture: manifest.architecture.clone(),
            created_at: manifest.created_at.to_rfc3339(),
        },
        packages: manifest.packages.clone(),
        usage: UsageInfo {
            add_repo: state.source_line(&host),
            update: UPDATE_COMMAND,
        },
    })
}

/// GET /
pub async fn root(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Html<String> {
    let manifest = &state.manifest;
    let host = request_host(&state, &headers);

    let rows: String = manifest
        .packages
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&p.name),
                escape_html(&p.version),
                if p.downloaded { "yes" } else { "no" }
            )
        })
        .collect();

    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n<head><title>APT repository: {dist}/{arch}</title></head>\n<body>\n\
         <h1>APT repository: {dist}/{arch}</h1>\n\
         <p>{downloaded} of {total} packages available.</p>\n\
         <p>Add this line to <code>/etc/apt/sources.list</code>, then run <code>{update}</code>:</p>\n\
         <pre>{source}</pre>\n\
         <p>Status: <a href=\"/health\">/health</a>, <a href=\"/info\">/info</a></p>\n\
         <table>\n<tr><th>Package</th><th>Version</th><th>Downloaded</th></tr>\n{rows}</table>\n\
         </body>\n</html>\n",
        dist = escape_html(&manifest.distribution),
        arch = escape_html(&manifest.architecture),
        downloaded = manifest.downloaded_count(),
        total = manifest.total_count(),
        source = escape_html(&state.source_line(&host)),
        rows = rows,
        update = UPDATE_COMMAND,
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
