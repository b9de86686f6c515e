//! GitDigest MCP library: GitHub repositories as a single text artifact
//!
//! Given a repository URL and optional filters, this library returns either
//! one file's content, a directory-tree rendering with README files, or a
//! concatenated listing of every selected file.
//!
//! ## Features
//!
//! - GitHub URL shapes: `/tree/<branch>/<dir>`, `/blob/<branch>/<file>`,
//!   shorthand directory paths, `github:owner/repo`, `git@github.com:owner/repo.git`
//! - Directory, extension and single-file filters with URL/query precedence
//! - `main`/`master` fallback when the requested branch cannot be fetched
//! - Lock file, binary, oversized and compiled-JavaScript exclusion
//! - 30KB per-file truncation with size accounting
//!
//! ## Authentication
//!
//! Archive downloads support both authenticated and unauthenticated access.
//! The binaries read the token from `--github-token` or the
//! `GITDIGEST_GITHUB_TOKEN` environment variable.
//!
//! ```bash
//! # Set GitHub token for authentication (optional)
//! export GITDIGEST_GITHUB_TOKEN=your_github_token
//! ```
//!
//! ## Usage
//!
//! This library can be used in several ways:
//! - As an MCP server (HTTP/SSE mode)
//! - As an MCP server (STDIN/STDOUT mode)
//! - As a plain-text HTTP endpoint for browsers
//! - Directly as a Rust library
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitdigest_mcp::gitdigest::{ArchiveFetcher, DigestConfig, RequestDescriptor};
//! use gitdigest_mcp::services::process_repository_request;
//!
//! # async fn example() -> Result<(), gitdigest_mcp::gitdigest::DigestError> {
//! let fetcher = ArchiveFetcher::new(Arc::new(DigestConfig::default()));
//! let descriptor = RequestDescriptor::new("https://github.com/tokio-rs/tokio/tree/master/tokio/src/sync");
//! let digest = process_repository_request(&fetcher, &descriptor, None).await?;
//! println!("{}", digest);
//! # Ok(())
//! # }
//! ```

pub mod gitdigest;
pub mod services;
pub mod tools;
pub mod transport;
