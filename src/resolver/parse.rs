// src/resolver/parse.rs

//! Parser for `apt-cache depends --recurse` style output
//!
//! The oracle prints package headers and indented relation lines:
//!
//! ```text
//! curl
//!   Depends: libc6
//!  |Depends: libcurl4
//!   Depends: <libssl-dev>
//!   Recommends: ca-certificates
//! libc6
//!   PreDepends: libgcc-s1
//! ```
//!
//! Only hard relations count toward the closure. Alternatives (`|`) are not
//! resolved, and virtual packages (`<name>`) are never fetchable.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Optional relation label, optional virtual marker, then the package token
static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?P<label>[A-Za-z][A-Za-z-]*):\s+)?(?P<virtual><)?(?P<name>[A-Za-z0-9][A-Za-z0-9+.\-]+)")
        .expect("dependency line pattern is valid")
});

/// Relation labels that must be satisfied for installability
const HARD_RELATIONS: &[&str] = &["Depends", "PreDepends"];

/// Soft relations that are skipped even when structurally valid
const SOFT_MARKERS: &[&str] = &["Recommends:", "Suggests:"];

const ALTERNATIVE_MARKER: char = '|';

/// Extract the package name a single output line contributes, if any
pub fn parse_dependency_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty()
        || line.contains(ALTERNATIVE_MARKER)
        || SOFT_MARKERS.iter().any(|marker| line.contains(marker))
    {
        return None;
    }

    let captures = DEPENDENCY_LINE.captures(line)?;

    if let Some(label) = captures.name("label") {
        if !HARD_RELATIONS.contains(&label.as_str()) {
            return None;
        }
    }
    if captures.name("virtual").is_some() {
        return None;
    }

    captures.name("name").map(|m| m.as_str())
}

/// Parse oracle output into package names, first occurrence first
pub fn parse_dependency_output(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for name in output.lines().filter_map(parse_dependency_line) {
        if seen.insert(name) {
            packages.push(name.to_string());
        }
    }

    packages
}
