use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{self, EnvFilter};

use gitdigest_mcp::gitdigest::{ArchiveFetcher, DigestConfig, QueryParams, RequestDescriptor};
use gitdigest_mcp::services::process_repository_request;

#[derive(Parser)]
#[command(author, version = "0.1.0", about = "Print a GitHub repository as a single text document", long_about = None)]
struct Cli {
    /// Repository location
    #[arg(
        help = "Repository location - supports 'https://github.com/owner/repo', '/tree/<branch>/<dir>' and '/blob/<branch>/<file>' URLs, 'github.com/owner/repo/<dir>', 'github:owner/repo' and 'git@github.com:owner/repo.git'"
    )]
    url: String,

    /// Comma-separated directories to include
    #[arg(long)]
    dir: Option<String>,

    /// Comma-separated extensions to include, e.g. "rs,toml"
    #[arg(short = 'e', long)]
    ext: Option<String>,

    /// Branch override
    #[arg(short, long)]
    branch: Option<String>,

    /// Single file to print, relative to the directory in the URL
    #[arg(short, long)]
    file: Option<String>,

    /// Output mode: "tree" or "full" (default)
    #[arg(short, long)]
    mode: Option<String>,

    /// GitHub token sent as a bearer credential on archive downloads
    #[arg(short = 't', long, env = "GITDIGEST_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Base URL of the archive host (defaults to https://codeload.github.com)
    #[arg(long)]
    archive_base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let mut config = DigestConfig::default();
    if let Some(base_url) = &cli.archive_base_url {
        config = config.with_archive_base_url(base_url.as_str());
    }
    let fetcher = ArchiveFetcher::new(Arc::new(config));

    let descriptor = RequestDescriptor {
        url: cli.url,
        params: QueryParams {
            dir: cli.dir,
            ext: cli.ext,
            branch: cli.branch,
            file: cli.file,
            mode: cli.mode,
        },
    };

    let credential = cli.github_token.as_deref().filter(|t| !t.is_empty());
    match process_repository_request(&fetcher, &descriptor, credential).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Failed to fetch repository: {}", err);
            Err(anyhow::anyhow!("{}: {}", err.status_code(), err))
        }
    }
}
