//! Repository digest pipeline
//!
//! This module turns a GitHub repository reference into one text artifact:
//! - [`reference`]: parses the location and query parameters into a
//!   canonical request (repository, branch, scope, display mode)
//! - [`archive`]: downloads the zip snapshot (with `main`/`master` fallback)
//!   and exposes its members through [`archive::ArchiveSource`]
//! - [`filter`]: selects files and applies the exclusion rules
//! - [`render`]: produces the single-file, tree or full output
//!
//! ## Authentication
//!
//! Archive requests are unauthenticated unless a credential is supplied. The
//! credential is an opaque token sent as `Authorization: Bearer <token>`; it
//! is needed for private repositories and raises the upstream rate limit.
//!
//! ```bash
//! # Optional, picked up by the binaries
//! export GITDIGEST_GITHUB_TOKEN=your_github_token
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod reference;
pub mod render;

pub use archive::{ArchiveFetcher, ArchiveSource, FetchedArchive, MemoryArchive, ZipArchiveSource};
pub use config::DigestConfig;
pub use error::DigestError;
pub use filter::{FilteredFiles, RenderedFile, filter_files, looks_binary};
pub use reference::{
    DisplayMode, QueryParams, RepositoryReference, RequestDescriptor, ResolvedRequest,
    ScopeSelection, resolve,
};
pub use render::render;
