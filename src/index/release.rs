// src/index/release.rs

//! Release document

use crate::hash::FileDigests;
use crate::layout::COMPONENT;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// RFC 1123 with a numeric zone, as APT expects in `Date:`
pub const RELEASE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Inputs for one Release document
#[derive(Debug, Clone)]
pub struct ReleaseFields<'a> {
    pub origin: &'a str,
    pub distribution: &'a str,
    pub architecture: &'a str,
    pub date: DateTime<Utc>,
    /// Index files relative to `dists/<dist>`, with their digests
    pub files: Vec<(String, FileDigests)>,
}

/// Format a timestamp for a Release `Date:` field
pub fn format_release_date(date: &DateTime<Utc>) -> String {
    date.format(RELEASE_DATE_FORMAT).to_string()
}

/// Render a Release document
pub fn render_release(fields: &ReleaseFields<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Origin: {}", fields.origin);
    let _ = writeln!(out, "Label: {}", fields.origin);
    let _ = writeln!(out, "Suite: {}", fields.distribution);
    let _ = writeln!(out, "Codename: {}", fields.distribution);
    let _ = writeln!(out, "Date: {}", format_release_date(&fields.date));
    let _ = writeln!(out, "Architectures: {}", fields.architecture);
    let _ = writeln!(out, "Components: {}", COMPONENT);

    if !fields.files.is_empty() {
        out.push_str("MD5Sum:\n");
        for (path, digests) in &fields.files {
            let _ = writeln!(out, " {} {:>16} {}", digests.md5, digests.size, path);
        }
        out.push_str("SHA256:\n");
        for (path, digests) in &fields.files {
            let _ = writeln!(out, " {} {:>16} {}", digests.sha256, digests.size, path);
        }
    }

    out
}
