use crate::gitdigest::{ArchiveFetcher, DigestConfig, QueryParams, RequestDescriptor};
use crate::services;
use rmcp::{ServerHandler, model::*, tool};
use std::sync::Arc;

/// Repository digest tools exposed through the MCP protocol
///
/// A thin wrapper around [`ArchiveFetcher`] and the optional GitHub token.
/// Each tool call runs the full pipeline through
/// [`services::process_repository_request`].
#[derive(Clone)]
pub struct GitDigestTools {
    fetcher: ArchiveFetcher,
    github_token: Option<String>,
}

impl GitDigestTools {
    /// Creates a new GitDigestTools instance
    ///
    /// # Parameters
    ///
    /// * `config` - Shared digest configuration (archive host, size limits)
    /// * `github_token` - Optional token sent as a bearer credential on every
    ///   archive download
    pub fn new(config: Arc<DigestConfig>, github_token: Option<String>) -> Self {
        Self::with_fetcher(ArchiveFetcher::new(config), github_token)
    }

    /// Creates a GitDigestTools instance around an existing fetcher
    pub fn with_fetcher(fetcher: ArchiveFetcher, github_token: Option<String>) -> Self {
        Self {
            fetcher,
            github_token: github_token.filter(|token| !token.is_empty()),
        }
    }

    pub fn fetcher(&self) -> &ArchiveFetcher {
        &self.fetcher
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }
}

impl Default for GitDigestTools {
    fn default() -> Self {
        Self::new(Arc::new(DigestConfig::default()), None)
    }
}

#[tool(tool_box)]
impl ServerHandler for GitDigestTools {
    /// Provides information about this MCP server
    ///
    /// Returns server capabilities, protocol version, and usage instructions
    fn get_info(&self) -> ServerInfo {
        let auth_status = match &self.github_token {
            Some(_) => "Authenticated with GitHub token",
            None => "Not authenticated (public repositories only, rate limits apply)",
        };

        let instructions = format!(
            "# GitHub Repository Digest MCP Server

## Authentication Status
{}

## Available Tools
- `fetch_repository`: Fetch a GitHub repository (or part of it) as a single text document

## Output Shapes
- Single file: the raw content of one file (`/blob/<branch>/<path>` URL or `file` parameter)
- Tree: directory structure plus the content of every README (`mode=tree`)
- Full: directory structure with sizes, then every selected file (default)

## Authentication
```
gitdigest-mcp stdio --github-token=your_token
export GITDIGEST_GITHUB_TOKEN=your_github_token
```

A token is required for private repositories and raises the archive host rate limit.
",
            auth_status
        );

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(instructions),
        }
    }
}

#[tool(tool_box)]
impl GitDigestTools {
    /// Fetch a repository snapshot and render it as one text document
    ///
    /// The repository archive is downloaded on every call. When the requested
    /// branch cannot be fetched, `main` and then `master` are tried.
    ///
    /// # Returns
    ///
    /// The rendered digest, or an error string of the form
    /// `"<status>: <message>"` where status follows HTTP conventions
    /// (400 invalid input, 403 access denied, 404 not found, 500 otherwise).
    #[tool(
        description = "Fetch a GitHub repository as a single text document. Downloads the branch snapshot, filters out lock files, binaries, images and oversized files, truncates large files at 30KB, and returns either one file, a directory tree with README files, or every selected file concatenated. Example usage: `{\"name\": \"fetch_repository\", \"arguments\": {\"url\": \"https://github.com/tokio-rs/tokio\"}}`. Subdirectory on a branch: `{\"name\": \"fetch_repository\", \"arguments\": {\"url\": \"https://github.com/tokio-rs/tokio/tree/master/tokio/src/sync\"}}`. Single file: `{\"name\": \"fetch_repository\", \"arguments\": {\"url\": \"https://github.com/rust-lang/log/blob/master/src/lib.rs\"}}`. Structure only: `{\"name\": \"fetch_repository\", \"arguments\": {\"url\": \"github:serde-rs/serde\", \"mode\": \"tree\"}}`. With filters: `{\"name\": \"fetch_repository\", \"arguments\": {\"url\": \"https://github.com/owner/repo\", \"dir\": \"src,docs\", \"ext\": \"rs,md\"}}`"
    )]
    async fn fetch_repository(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Repository location (required). Supports 'https://github.com/owner/repo', '/tree/<branch>/<dir>' and '/blob/<branch>/<file>' URLs, 'github.com/owner/repo/<dir>' (directory without /tree/), 'github:owner/repo' and 'git@github.com:owner/repo.git'. A branch name containing '/' is not supported inside the URL; use the 'branch' parameter instead."
        )]
        url: String,

        #[tool(param)]
        #[schemars(
            description = "Comma-separated list of directories to include (optional). Applied inside the directory given by the URL, if any. Ignored when a single file is requested."
        )]
        dir: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Comma-separated list of file extensions to include, without dots (optional), e.g. 'rs,toml'. Matching is case-insensitive."
        )]
        ext: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Branch to fetch (optional). Overrides any branch in the URL. Defaults to 'main'; falls back to 'main' then 'master' when the branch cannot be fetched."
        )]
        branch: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Single file to return (optional). Interpreted relative to the directory in the URL. Returns only that file's content."
        )]
        file: Option<String>,

        #[tool(param)]
        #[schemars(
            description = "Output mode (optional, default is 'full'). 'tree' returns the directory structure plus README contents; anything else returns every selected file."
        )]
        mode: Option<String>,
    ) -> Result<String, String> {
        let descriptor = RequestDescriptor {
            url,
            params: QueryParams {
                dir,
                ext,
                branch,
                file,
                mode,
            },
        };

        services::process_repository_request(&self.fetcher, &descriptor, self.github_token())
            .await
            .map_err(|e| {
                tracing::warn!("fetch_repository failed for {}: {}", descriptor.url, e);
                format!("{}: {}", e.status_code(), e)
            })
    }
}
