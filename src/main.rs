// src/main.rs

use anyhow::{Context, Result};
use aptvault::acquire::AptGetFetcher;
use aptvault::builder::RepositoryBuilder;
use aptvault::config::{Config, Overrides};
use aptvault::layout::RepoLayout;
use aptvault::resolver::AptCacheOracle;
use clap::Parser;
use tracing::info;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = config.with_overrides(Overrides {
        repo: cli.repo.clone(),
        architecture: cli.arch.clone(),
        distribution: cli.dist.clone(),
        port: cli.port,
        jobs: cli.jobs,
    })?;

    if cli.serve {
        cmd_serve(&config)
    } else {
        cmd_download(&config, &cli.download)
    }
}

fn cmd_download(config: &Config, packages: &[String]) -> Result<()> {
    info!(
        "Mirroring {} for {}/{}",
        packages.join(", "),
        config.repository.distribution,
        config.repository.architecture
    );
    let builder = RepositoryBuilder::new(
        Box::new(AptCacheOracle::new(config.tools.apt_cache.as_str())),
        Box::new(AptGetFetcher::new(config.tools.apt_get.as_str())),
        RepoLayout::new(&config.repository.path),
        config.build_options(),
    );

    let manifest = builder
        .build(packages)
        .with_context(|| format!("failed to build repository at {}", config.repository.path.display()))?;

    let failed: Vec<&str> = manifest
        .packages
        .iter()
        .filter(|p| !p.downloaded)
        .map(|p| p.name.as_str())
        .collect();

    println!("Repository: {}", builder.layout().root().display());
    println!(
        "Packages: {} resolved, {} downloaded",
        manifest.total_count(),
        manifest.downloaded_count()
    );
    if !failed.is_empty() {
        println!("Failed: {}", failed.join(", "));
    }
    println!();
    println!("Serve it with: aptvault --serve --repo {}", config.repository.path.display());
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(config: &Config) -> Result<()> {
    use aptvault::server::{ServerConfig, run_server};

    let server_config = ServerConfig {
        bind_addr: config.bind_addr()?,
        repo_root: config.repository.path.clone(),
        origin: config.repository.origin.clone(),
    };

    info!("Starting repository server on {}", server_config.bind_addr);

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run_server(server_config))?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn cmd_serve(_config: &Config) -> Result<()> {
    anyhow::bail!("this build of aptvault was compiled without the `server` feature")
}
