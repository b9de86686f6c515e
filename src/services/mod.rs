use crate::gitdigest::error::{DigestError, Result};
use crate::gitdigest::{
    ArchiveFetcher, DigestConfig, DisplayMode, FetchedArchive, RequestDescriptor, ScopeSelection,
    filter_files, render, resolve,
};

/// Runs the whole digest pipeline for one request
///
/// This function is the single surface the transports integrate against:
/// 1. Resolves the descriptor into a canonical request
/// 2. Downloads the repository snapshot (with branch fallback)
/// 3. Selects and loads the matching files
/// 4. Renders the requested output shape
///
/// Nothing is cached between calls; every request downloads and decodes the
/// archive again. All dependencies are passed in, so the function has no
/// access to global state. Decompression, filtering and rendering run on the
/// blocking thread pool.
///
/// # Parameters
///
/// * `fetcher` - Archive fetcher carrying the HTTP client and configuration
/// * `descriptor` - Raw request as built by the calling transport
/// * `credential` - Optional bearer token for the archive host
///
/// # Errors
///
/// Any [`DigestError`] aborts the request; no partial output is returned.
pub async fn process_repository_request(
    fetcher: &ArchiveFetcher,
    descriptor: &RequestDescriptor,
    credential: Option<&str>,
) -> Result<String> {
    let resolved = resolve(&descriptor.url, &descriptor.params)?;
    tracing::info!(
        "Processing {}/{} (branch: {}, mode: {}, dirs: {:?}, file: {:?})",
        resolved.reference.owner,
        resolved.reference.repo,
        resolved
            .reference
            .branch_or(&fetcher.config().default_branch),
        resolved.mode,
        resolved.scope.directory_prefixes,
        resolved.scope.single_file_path
    );

    let fetched = fetcher.fetch(&resolved.reference, credential).await?;
    let root_prefix = fetched.root_prefix(&resolved.reference.repo);
    let config = fetcher.shared_config();

    // Execute decompression and rendering in a blocking task
    tokio::task::spawn_blocking(move || {
        digest_archive(
            fetched,
            &root_prefix,
            &resolved.scope,
            resolved.mode,
            &config,
        )
    })
    .await
    .map_err(|e| DigestError::Internal(format!("Archive processing task failed: {}", e)))?
}

/// Synchronous tail of the pipeline: decode, filter and render one snapshot
pub fn digest_archive(
    fetched: FetchedArchive,
    root_prefix: &str,
    scope: &ScopeSelection,
    mode: DisplayMode,
    config: &DigestConfig,
) -> Result<String> {
    let mut source = fetched.into_source()?;
    let filtered = filter_files(&mut source, root_prefix, scope, mode, config)?;
    render(&filtered, scope, mode)
}
