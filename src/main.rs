mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat, Target};
use ghbin::config::load_settings;
use ghbin::download::{download_file, install_binary};
use ghbin::platform::get_system_info;
use ghbin::types::Asset;
use ghbin::{extract, find_asset, GitHubClient};
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    match cli.command {
        Commands::Version => {
            println!("ghbin v{}", env!("CARGO_PKG_VERSION"));
        }

        Commands::Resolve { target, format } => {
            let client = build_client()?;
            let asset = resolve(&client, &target).await?;
            print_asset(&asset, format)?;
        }

        Commands::Get { target, output } => {
            let client = build_client()?;
            let asset = resolve(&client, &target).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(&asset.binary_name));

            let temp_download_dir = TempDir::new()?;
            let downloaded = temp_download_dir.path().join(asset.file_name());
            download_file(client.http(), &asset.download_url, &downloaded).await?;
            install_binary(&asset, &downloaded, &output)?;

            eprintln!(
                "Installed {}/{} {} to {}",
                asset.owner,
                asset.repo,
                asset.tag,
                output.display()
            );
        }

        Commands::Extract {
            source,
            dest,
            target,
        } => {
            extract(&source, &dest, &target).with_context(|| {
                format!("Failed to extract '{}' from {}", target, source.display())
            })?;
            tracing::info!("Extracted {} to {}", target, dest.display());
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn build_client() -> Result<GitHubClient> {
    let settings = load_settings()?;
    tracing::debug!("Using GitHub API at {}", settings.api_url);
    GitHubClient::new(&settings).context("Could not set up GitHub client")
}

async fn resolve(client: &GitHubClient, target: &Target) -> Result<Asset> {
    let system = get_system_info();
    let os = target.os.as_deref().unwrap_or(&system.os);
    let arch = target.arch.as_deref().unwrap_or(&system.arch);

    tracing::info!("Resolving {}@{} for {}/{}", target.keyword, target.tag, os, arch);
    find_asset(client, &target.keyword, &target.tag, os, arch)
        .await
        .with_context(|| format!("Could not resolve a release asset for {}", target.keyword))
}

fn print_asset(asset: &Asset, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(asset)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(asset)?),
        OutputFormat::Plain => {
            println!("repository: {}/{}", asset.owner, asset.repo);
            println!("tag:        {}", asset.tag);
            println!("platform:   {}/{}", asset.os, asset.arch);
            println!("binary:     {}", asset.binary_name);
            println!("url:        {}", asset.download_url);
        }
    }
    Ok(())
}
