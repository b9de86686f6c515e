use std::sync::Arc;

use reqwest::Client;

use super::ZipArchiveSource;
use crate::gitdigest::config::DigestConfig;
use crate::gitdigest::error::{DigestError, Result};
use crate::gitdigest::reference::RepositoryReference;

/// Zip snapshot downloaded for one branch
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    /// Branch whose archive request succeeded
    pub effective_branch: String,
    pub bytes: Vec<u8>,
}

impl FetchedArchive {
    /// Folder every member of the archive lives under: `{repo}-{branch}/`
    ///
    /// The archive host replaces `/` in branch names with `-`.
    pub fn root_prefix(&self, repo: &str) -> String {
        format!("{}-{}/", repo, self.effective_branch.replace('/', "-"))
    }

    pub fn into_source(self) -> Result<ZipArchiveSource> {
        ZipArchiveSource::new(self.bytes)
    }
}

/// Failed archive attempt, kept to report the original failure
#[derive(Debug)]
struct FailedAttempt {
    status: u16,
    status_text: String,
}

/// Downloads repository zip snapshots with branch fallback
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: Client,
    config: Arc<DigestConfig>,
}

impl ArchiveFetcher {
    pub fn new(config: Arc<DigestConfig>) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: Arc<DigestConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Shared handle on the configuration, for work moved off the runtime
    pub fn shared_config(&self) -> Arc<DigestConfig> {
        Arc::clone(&self.config)
    }

    /// Snapshot URL: `<archive-base>/<owner>/<repo>/zip/<branch>`
    ///
    /// Every segment is percent-encoded; `/` inside the branch is kept as a
    /// path separator.
    pub fn archive_url(&self, owner: &str, repo: &str, branch: &str) -> String {
        let branch = branch
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}/zip/{}",
            self.config.archive_base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            branch
        )
    }

    /// Downloads the snapshot for the reference's branch
    ///
    /// When the requested branch answers with a non-2xx status, the configured
    /// fallback branches are tried one after another (skipping the requested
    /// one) and the first success wins. Requests are never issued concurrently.
    ///
    /// # Errors
    ///
    /// - [`DigestError::RepositoryFetch`] with the first attempt's status when
    ///   every branch fails
    /// - [`DigestError::Http`] when a request cannot be sent at all
    pub async fn fetch(
        &self,
        reference: &RepositoryReference,
        credential: Option<&str>,
    ) -> Result<FetchedArchive> {
        let requested = reference.branch_or(&self.config.default_branch);
        let candidates = branch_candidates(requested, &self.config.fallback_branches);

        let mut first_failure: Option<FailedAttempt> = None;

        for (attempt, branch) in candidates.iter().enumerate() {
            if attempt > 0 {
                tracing::warn!(
                    "Branch '{}' unavailable for {}/{}, trying '{}'",
                    requested,
                    reference.owner,
                    reference.repo,
                    branch
                );
            }

            let url = self.archive_url(&reference.owner, &reference.repo, branch);
            match self.request_archive(&url, credential).await? {
                Ok(bytes) => {
                    tracing::info!(
                        "Fetched {}/{} at branch '{}' ({} bytes)",
                        reference.owner,
                        reference.repo,
                        branch,
                        bytes.len()
                    );
                    return Ok(FetchedArchive {
                        effective_branch: branch.to_string(),
                        bytes,
                    });
                }
                Err(failure) => {
                    tracing::debug!(
                        "Archive request {} failed: {} {}",
                        url,
                        failure.status,
                        failure.status_text
                    );
                    first_failure.get_or_insert(failure);
                }
            }
        }

        let failure = first_failure.unwrap_or(FailedAttempt {
            status: 500,
            status_text: "No branch to fetch".to_string(),
        });
        Err(DigestError::RepositoryFetch {
            status: failure.status,
            status_text: failure.status_text,
        })
    }

    /// Issues a single GET; the outer error is a transport failure, the inner
    /// one a non-2xx answer
    async fn request_archive(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<std::result::Result<Vec<u8>, FailedAttempt>> {
        let mut req_builder = self
            .client
            .get(url)
            .header("User-Agent", self.config.user_agent.as_str());

        if let Some(token) = credential {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = req_builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(Err(FailedAttempt {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            }));
        }

        let bytes = response.bytes().await?;
        Ok(Ok(bytes.to_vec()))
    }
}

/// Ordered branches to try: the requested one, then each fallback not equal to it
pub fn branch_candidates<'a>(requested: &'a str, fallbacks: &'a [String]) -> Vec<&'a str> {
    std::iter::once(requested)
        .chain(
            fallbacks
                .iter()
                .map(String::as_str)
                .filter(|fallback| *fallback != requested),
        )
        .collect()
}
