use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gitdigest_mcp::gitdigest::DigestConfig;
use gitdigest_mcp::tools::GitDigestTools;
use gitdigest_mcp::transport::web::WebState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{self, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version = "0.1.0", about, long_about = None)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every server mode
#[derive(Args, Clone)]
struct CommonArgs {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// GitHub token sent as a bearer credential on archive downloads
    #[arg(short = 't', long, env = "GITDIGEST_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Base URL of the archive host (defaults to https://codeload.github.com)
    #[arg(long)]
    archive_base_url: Option<String>,
}

impl CommonArgs {
    fn tools(&self) -> GitDigestTools {
        let mut config = DigestConfig::default();
        if let Some(base_url) = &self.archive_base_url {
            tracing::info!("Using archive host: {}", base_url);
            config = config.with_archive_base_url(base_url.as_str());
        }
        if self.github_token.is_some() {
            tracing::info!("Using GitHub token from command line arguments or environment");
        }
        GitDigestTools::new(Arc::new(config), self.github_token.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server in stdin/stdout mode
    Stdio {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Run the MCP server with HTTP/SSE interface
    Http {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        address: String,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Serve plain-text digests over HTTP for browsers and curl
    Web {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8081")]
        address: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stdio { common } => run_stdio_server(common).await,
        Commands::Http { address, common } => run_http_server(address, common).await,
        Commands::Web { address, common } => run_web_server(address, common).await,
    }
}

async fn run_stdio_server(common: CommonArgs) -> Result<()> {
    let level = if common.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCP repository digest server in STDIN/STDOUT mode");
    let tools = common.tools();

    gitdigest_mcp::transport::stdio::run_stdio_server(tools)
        .await
        .map_err(|e| anyhow::anyhow!("Error running STDIO server: {}", e))
}

fn init_http_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},{}", level, env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

async fn run_http_server(address: String, common: CommonArgs) -> Result<()> {
    init_http_tracing(common.debug);

    let addr: SocketAddr = address.parse()?;
    tracing::info!("Access the repository digest MCP server at http://{}/sse", addr);

    let app = gitdigest_mcp::transport::sse_server::SseServerApp::new(addr, common.tools());
    app.serve().await?;

    Ok(())
}

async fn run_web_server(address: String, common: CommonArgs) -> Result<()> {
    init_http_tracing(common.debug);

    let addr: SocketAddr = address.parse()?;
    let tools = common.tools();
    let state = WebState {
        fetcher: tools.fetcher().clone(),
        github_token: tools.github_token().map(str::to_string),
    };

    gitdigest_mcp::transport::web::serve(addr, state).await
}
