// src/index/packages.rs

//! Packages index stanzas

use super::DigestCache;
use crate::hash::FileDigests;
use crate::manifest::{Manifest, PackageInfo};
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// `Description:` carried by every stanza; artifacts are mirrored without
/// their control data
pub const MIRRORED_DESCRIPTION: &str = "Package mirrored by aptvault";

/// A downloaded package whose pool file is present, with its digests
#[derive(Debug, Clone)]
pub struct PackageEntry<'a> {
    pub info: &'a PackageInfo,
    pub digests: FileDigests,
}

impl PackageEntry<'_> {
    /// Write this entry as one stanza (no trailing blank line)
    fn write_stanza(&self, out: &mut String) {
        let _ = writeln!(out, "Package: {}", self.info.name);
        let _ = writeln!(out, "Version: {}", self.info.version);
        let _ = writeln!(out, "Architecture: {}", self.info.architecture);
        let _ = writeln!(out, "Filename: pool/{}", self.info.filename);
        let _ = writeln!(out, "Size: {}", self.digests.size);
        let _ = writeln!(out, "MD5sum: {}", self.digests.md5);
        let _ = writeln!(out, "SHA256: {}", self.digests.sha256);
        let _ = writeln!(out, "Description: {}", MIRRORED_DESCRIPTION);
    }
}

/// Collect entries for every downloaded package still present in the pool
///
/// Packages whose file is gone are skipped; a partial mirror still yields a
/// consistent index for what remains. Digests come from `cache` while the
/// pool file is unchanged.
pub fn collect_entries<'a>(
    manifest: &'a Manifest,
    pool_dir: &Path,
    cache: &DigestCache,
) -> Vec<PackageEntry<'a>> {
    let mut entries = Vec::new();

    for info in manifest.downloaded() {
        if info.filename.is_empty() {
            continue;
        }
        let path = pool_dir.join(&info.filename);

        match cache.digest(&path, &info.filename) {
            Ok(Some(digests)) => entries.push(PackageEntry { info, digests }),
            Ok(None) => debug!("Skipping {}: {} not in pool", info.name, info.filename),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping {}: {} vanished", info.name, info.filename);
            }
            Err(e) => warn!("Skipping {}: cannot read {}: {}", info.name, path.display(), e),
        }
    }

    entries
}

/// Render a Packages document; stanzas are separated by one blank line
pub fn render_packages(entries: &[PackageEntry<'_>]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        entry.write_stanza(&mut out);
    }
    out
}
