// src/cli.rs
//! CLI definitions for aptvault
//!
//! Exactly one mode is chosen per invocation: `--download` builds or refreshes
//! a repository, `--serve` publishes an existing one over HTTP.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aptvault")]
#[command(version)]
#[command(about = "Mirror APT packages with their dependencies and serve them offline", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["download", "serve"])))]
pub struct Cli {
    /// Download the named packages and their dependency closure
    #[arg(short, long, num_args = 1.., value_name = "PACKAGE")]
    pub download: Vec<String>,

    /// Serve an existing repository over HTTP
    #[arg(short, long)]
    pub serve: bool,

    /// Repository root directory [default: ./repository]
    #[arg(short, long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Target architecture [default: amd64]
    #[arg(short, long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Target distribution [default: focal]
    #[arg(long, value_name = "DIST")]
    pub dist: Option<String>,

    /// Server port [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Concurrent downloads [default: 1]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
