//! Plain-text HTTP endpoint for browsers and curl
//!
//! - GET /
//!   Usage text.
//!
//! - GET /{owner}/{repo}[/tree/{branch}/{dir}|/blob/{branch}/{file}|/{dir}]?dir=&ext=&branch=&file=&mode=
//!   Mirrors the github.com path layout. The path is appended to
//!   `https://github.com/` and run through the digest pipeline; the rendered
//!   output is returned as `text/plain`. Failures return the mapped status
//!   with the error message as the body.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::gitdigest::{ArchiveFetcher, DigestError, QueryParams, RequestDescriptor};
use crate::services;

const GITHUB_BASE_URL: &str = "https://github.com";

const USAGE: &str = "gitdigest: GitHub repositories as a single text document

Replace github.com with this host in any repository URL:

  /{owner}/{repo}                         whole repository, default branch
  /{owner}/{repo}/tree/{branch}/{dir}     one directory on a branch
  /{owner}/{repo}/blob/{branch}/{file}    one file
  /{owner}/{repo}/{dir}                   one directory, default branch

Query parameters:

  dir=src,docs     only these directories
  ext=rs,toml      only these extensions
  branch=develop   branch override
  file=README.md   one file
  mode=tree        directory structure and README files only
";

/// State shared by every request handler
#[derive(Clone)]
pub struct WebState {
    pub fetcher: ArchiveFetcher,
    pub github_token: Option<String>,
}

impl IntoResponse for DigestError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

pub fn create_router(state: WebState) -> Router {
    Router::new()
        .route("/", get(usage))
        .route("/{*path}", get(digest))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn usage() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], USAGE)
}

async fn digest(
    State(state): State<WebState>,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<Response, DigestError> {
    // Still percent-encoded; the resolver decodes each segment once
    let descriptor = RequestDescriptor {
        url: format!("{}/{}", GITHUB_BASE_URL, uri.path().trim_start_matches('/')),
        params,
    };

    let output = services::process_repository_request(
        &state.fetcher,
        &descriptor,
        state.github_token.as_deref(),
    )
    .await
    .inspect_err(|e| tracing::warn!("Request for {} failed: {}", descriptor.url, e))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output).into_response())
}

/// Binds `addr` and serves the router until Ctrl+C
pub async fn serve(addr: SocketAddr, state: WebState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web endpoint listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
