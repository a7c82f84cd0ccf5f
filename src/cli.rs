use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("GHBIN_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("GHBIN_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GHBIN_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "ghbin")]
#[command(about = "Resolve and fetch platform-specific release binaries from GitHub")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct Target {
    /// Repository ('owner/repo') or a search keyword
    pub keyword: String,

    /// Release tag (empty or 'latest' for the latest release)
    #[arg(short, long, default_value = "latest")]
    pub tag: String,

    /// Target OS (defaults to the host OS)
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (defaults to the host architecture)
    #[arg(long)]
    pub arch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Plain,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the download that would be used for a release
    #[command(after_help = "Examples:\n  ghbin resolve cli/cli\n  ghbin resolve helm/helm --tag v3.14.0 --os darwin --arch arm64")]
    Resolve {
        #[command(flatten)]
        target: Target,

        /// Output format
        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Download a release binary, extracting it from its archive if needed
    Get {
        #[command(flatten)]
        target: Target,

        /// Where to write the binary (defaults to its name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a single file from a local archive
    Extract {
        /// Archive or compressed file (.zip, .tar.gz, .tgz, .tar.xz, .txz, .gz)
        source: PathBuf,
        /// Destination file
        dest: PathBuf,
        /// Base name of the file to pull out of the archive
        target: String,
    },

    /// Show the current version
    Version,
}
