// tests/server.rs

//! Serving a built repository over HTTP.

#![cfg(feature = "server")]

mod common;

use aptvault::layout::RepoLayout;
use aptvault::server::{ServerConfig, ServerState, create_router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use common::build_curl_repo;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::sync::Arc;
use tower::ServiceExt;

fn app_for(layout: &RepoLayout) -> Router {
    let state = ServerState::load(ServerConfig {
        repo_root: layout.root().to_path_buf(),
        ..ServerConfig::default()
    })
    .unwrap();
    create_router(Arc::new(state))
}

async fn request(app: Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    request(app, Method::GET, uri).await
}

#[tokio::test]
async fn test_health_reports_counts() {
    let (_temp, layout) = build_curl_repo();
    let (status, body) = get(app_for(&layout), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["packages_total"], 5);
    assert_eq!(json["packages_downloaded"], 3);
    assert_eq!(json["architecture"], "amd64");
}

#[tokio::test]
async fn test_info_lists_packages_and_usage() {
    let (_temp, layout) = build_curl_repo();
    let (status, body) = get(app_for(&layout), "/info").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["repository"]["distribution"], "focal");
    assert_eq!(json["packages"].as_array().unwrap().len(), 5);
    assert_eq!(
        json["usage"]["add_repo"],
        "deb [trusted=yes] http://localhost:8080/ focal main"
    );
    assert_eq!(json["usage"]["update"], "sudo apt update");
}

#[tokio::test]
async fn test_pool_artifact_downloads() {
    let (_temp, layout) = build_curl_repo();
    let (status, body) = get(app_for(&layout), "/pool/curl_7.68.0-1ubuntu2_amd64.deb").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"curl-artifact");
}

#[tokio::test]
async fn test_traversal_is_forbidden() {
    let (_temp, layout) = build_curl_repo();
    fs::write(layout.root().join("secret.txt"), "secret").unwrap();
    let app = app_for(&layout);

    let (status, _) = get(app.clone(), "/pool/../../etc/passwd").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = get(app.clone(), "/pool/../secret.txt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!String::from_utf8_lossy(&body).contains("secret"));
    let (status, _) = get(app, "/dists/focal/../../manifest.json").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_absent_file_not_found() {
    let (_temp, layout) = build_curl_repo();
    let app = app_for(&layout);

    let (status, _) = get(app.clone(), "/pool/libcurl4_7.68.0_amd64.deb").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(app, "/dists/jammy/Release").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_packages_reflect_pool_at_request_time() {
    let (_temp, layout) = build_curl_repo();
    let app = app_for(&layout);
    let uri = "/dists/focal/main/binary-amd64/Packages";

    let (status, body) = get(app.clone(), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Package: zlib1g\n"));

    fs::remove_file(layout.pool_dir().join("zlib1g_1%3a1.2.11.dfsg-2ubuntu1_amd64.deb")).unwrap();

    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains("zlib1g"));
    assert_eq!(text.matches("Package: ").count(), 2);
}

#[tokio::test]
async fn test_replaced_artifact_is_rehashed() {
    let (_temp, layout) = build_curl_repo();
    let app = app_for(&layout);
    let uri = "/dists/focal/main/binary-amd64/Packages";
    let curl = layout.pool_dir().join("curl_7.68.0-1ubuntu2_amd64.deb");

    let (_, body) = get(app.clone(), uri).await;
    let original = aptvault::hash::digest_bytes(b"curl-artifact").sha256;
    assert!(String::from_utf8(body).unwrap().contains(&original));

    fs::write(&curl, b"curl-artifact, security rebuild").unwrap();

    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    let rebuilt = aptvault::hash::digest_bytes(b"curl-artifact, security rebuild");
    assert!(text.contains(&format!("SHA256: {}\n", rebuilt.sha256)));
    assert!(text.contains(&format!("Size: {}\n", rebuilt.size)));
    assert!(!text.contains(&original));
}

#[tokio::test]
async fn test_synthesized_documents_agree() {
    let (_temp, layout) = build_curl_repo();
    let app = app_for(&layout);

    let (_, packages) = get(app.clone(), "/dists/focal/main/binary-amd64/Packages").await;
    let (status, packages_gz) = get(app.clone(), "/dists/focal/main/binary-amd64/Packages.gz").await;
    assert_eq!(status, StatusCode::OK);

    let mut decoded = Vec::new();
    GzDecoder::new(packages_gz.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, packages);

    let (status, release) = get(app, "/dists/focal/Release").await;
    assert_eq!(status, StatusCode::OK);
    let release = String::from_utf8(release).unwrap();
    let packages_sha = aptvault::hash::digest_bytes(&packages).sha256;
    assert!(release.contains(&format!("{} ", packages_sha)));
}

#[tokio::test]
async fn test_head_and_method_handling() {
    let (_temp, layout) = build_curl_repo();
    let app = app_for(&layout);

    let (status, body) = request(app.clone(), Method::HEAD, "/pool/curl_7.68.0-1ubuntu2_amd64.deb").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, _) = request(app, Method::DELETE, "/pool/curl_7.68.0-1ubuntu2_amd64.deb").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_missing_repository_fails_startup() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = ServerState::load(ServerConfig {
        repo_root: temp_dir.path().join("absent"),
        ..ServerConfig::default()
    });
    assert!(matches!(result, Err(aptvault::Error::ServerStartup(_))));
}
