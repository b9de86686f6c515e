//! Repository reference resolution
//!
//! Turns a raw repository location plus query-style parameters into the
//! canonical request: which repository, which branch to try first, which
//! part of the tree is wanted and how it should be displayed.
//!
//! Accepted location shapes:
//! - `https://github.com/owner/repo[/tree/<branch>/<dir>|/blob/<branch>/<file>|/<dir>]`
//! - `github.com/owner/repo/...` (scheme is added)
//! - `github:owner/repo`
//! - `git@github.com:owner/repo.git`

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Deserialize;
use strum::{Display, EnumString};
use url::Url;

use super::error::{DigestError, Result};

/// Query-style parameters accompanying a repository location
///
/// Every field is the raw string the caller supplied; interpretation happens
/// in [`resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    /// Comma-separated directory scopes
    pub dir: Option<String>,
    /// Comma-separated file extensions
    pub ext: Option<String>,
    /// Branch to fetch
    pub branch: Option<String>,
    /// Single file to return verbatim
    pub file: Option<String>,
    /// `tree` for structure plus READMEs, anything else for full output
    pub mode: Option<String>,
}

/// Raw request as built by a transport collaborator
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// Repository location (URL or bare path); required
    pub url: String,
    pub params: QueryParams,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: QueryParams::default(),
        }
    }
}

/// Output shape of a rendered repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    /// Structure plus every filtered file's body
    #[default]
    Full,
    /// Structure plus README bodies only
    Tree,
}

impl DisplayMode {
    /// Maps the raw `mode` parameter; only `tree` selects [`DisplayMode::Tree`]
    pub fn from_param(mode: Option<&str>) -> Self {
        match mode.map(|m| DisplayMode::from_str(m.trim())) {
            Some(Ok(DisplayMode::Tree)) => DisplayMode::Tree,
            _ => DisplayMode::Full,
        }
    }
}

/// Identifies a GitHub repository and the branch to try first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub owner: String,
    pub repo: String,
    /// Branch requested by the query or the URL; `None` means the default
    pub branch_candidate: Option<String>,
}

impl RepositoryReference {
    /// Branch to request first, falling back to `default_branch`
    pub fn branch_or<'a>(&'a self, default_branch: &'a str) -> &'a str {
        self.branch_candidate.as_deref().unwrap_or(default_branch)
    }
}

/// Part of the repository tree the caller asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSelection {
    /// Directory prefixes, each ending with `/`
    pub directory_prefixes: Vec<String>,
    /// Exact relative path of a single file
    pub single_file_path: Option<String>,
    /// Lowercase extensions without dot
    pub extension_filters: BTreeSet<String>,
}

/// Canonical descriptor produced by [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub reference: RepositoryReference,
    pub scope: ScopeSelection,
    pub mode: DisplayMode,
}

/// Scope information carried by the URL path itself
#[derive(Debug, Default)]
struct PathScope {
    branch: Option<String>,
    base_dir: Option<String>,
    file: Option<String>,
}

/// Resolves a raw location and its query parameters into a canonical request
///
/// Precedence rules:
/// - branch: query `branch` > `/tree/<b>` or `/blob/<b>` > default (`None` here)
/// - directories: non-empty query `dir` replaces the path scope; relative
///   entries are prefixed with the path-embedded base directory
/// - file: query `file` (prefixed with the base directory) > `/blob/` target
///
/// # Errors
///
/// Returns [`DigestError::InvalidInput`] when the location is empty, cannot be
/// parsed as a URL, or does not name both an owner and a repository.
pub fn resolve(raw_url: &str, query: &QueryParams) -> Result<ResolvedRequest> {
    let segments = path_segments(raw_url)?;
    if segments.len() < 2 {
        return Err(DigestError::InvalidInput(format!(
            "Repository location must contain an owner and a repository: {}",
            raw_url
        )));
    }

    let owner = segments[0].clone();
    let repo = segments[1]
        .strip_suffix(".git")
        .filter(|r| !r.is_empty())
        .unwrap_or(segments[1].as_str())
        .to_string();

    let path_scope = parse_path_scope(&segments[2..]);
    tracing::debug!(
        "Resolved location {} -> {}/{} (path scope: {:?})",
        raw_url,
        owner,
        repo,
        path_scope
    );

    let branch_candidate = non_empty(query.branch.as_deref())
        .map(String::from)
        .or(path_scope.branch.clone());

    let base_dir = path_scope.base_dir.as_deref();

    let query_dirs = parse_query_dirs(query.dir.as_deref(), base_dir);
    let directory_prefixes = if query_dirs.is_empty() {
        path_scope.base_dir.iter().cloned().collect()
    } else {
        query_dirs
    };

    let single_file_path = match non_empty(query.file.as_deref()) {
        Some(file) => Some(resolve_query_file(file, base_dir)),
        None => path_scope.file.clone(),
    };

    Ok(ResolvedRequest {
        reference: RepositoryReference {
            owner,
            repo,
            branch_candidate,
        },
        scope: ScopeSelection {
            directory_prefixes,
            single_file_path,
            extension_filters: parse_extensions(query.ext.as_deref()),
        },
        mode: DisplayMode::from_param(query.mode.as_deref()),
    })
}

/// Normalizes the location into an absolute URL and returns its decoded,
/// non-empty path segments
fn path_segments(raw_url: &str) -> Result<Vec<String>> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(DigestError::InvalidInput(
            "Repository location is required".to_string(),
        ));
    }

    let normalized = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
        format!("https://github.com/{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("github:") {
        format!("https://github.com/{}", rest.trim_start_matches('/'))
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&normalized).map_err(|e| {
        DigestError::InvalidInput(format!("Invalid repository URL '{}': {}", raw_url, e))
    })?;

    let segments = url
        .path_segments()
        .ok_or_else(|| {
            DigestError::InvalidInput(format!("Repository URL has no path: {}", raw_url))
        })?
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .collect();

    Ok(segments)
}

fn parse_path_scope(rest: &[String]) -> PathScope {
    match rest.first().map(String::as_str) {
        Some("tree") => {
            let dir = rest.get(2..).map(|d| d.join("/")).unwrap_or_default();
            PathScope {
                branch: rest.get(1).cloned(),
                base_dir: (!dir.is_empty()).then(|| ensure_trailing_slash(dir)),
                file: None,
            }
        }
        Some("blob") if rest.len() >= 3 => PathScope {
            branch: Some(rest[1].clone()),
            base_dir: None,
            file: Some(rest[2..].join("/")),
        },
        Some(_) => PathScope {
            branch: None,
            base_dir: Some(ensure_trailing_slash(rest.join("/"))),
            file: None,
        },
        None => PathScope::default(),
    }
}

fn parse_query_dirs(dir: Option<&str>, base_dir: Option<&str>) -> Vec<String> {
    let Some(dir) = dir else {
        return Vec::new();
    };

    dir.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let entry = entry.trim_start_matches('/');
            if entry.is_empty() {
                return None;
            }
            let entry = ensure_trailing_slash(entry.to_string());
            Some(prefix_with_base(entry, base_dir))
        })
        .collect()
}

fn resolve_query_file(file: &str, base_dir: Option<&str>) -> String {
    let file = file.strip_prefix('/').unwrap_or(file).to_string();
    prefix_with_base(file, base_dir)
}

/// Prepends `base_dir` unless the value already lives under it
///
/// Applied even when the value names an unrelated subtree.
fn prefix_with_base(value: String, base_dir: Option<&str>) -> String {
    match base_dir {
        Some(base) if !value.starts_with(base) => format!("{}{}", base, value),
        _ => value,
    }
}

fn parse_extensions(ext: Option<&str>) -> BTreeSet<String> {
    ext.map(|ext| {
        ext.split(',')
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn ensure_trailing_slash(mut path: String) -> String {
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> QueryParams {
        QueryParams::default()
    }

    #[test]
    fn test_tree_url_sets_branch_and_directory() {
        let resolved = resolve("https://github.com/owner/repo/tree/b/a/b/c", &query()).unwrap();
        assert_eq!(resolved.reference.owner, "owner");
        assert_eq!(resolved.reference.repo, "repo");
        assert_eq!(resolved.reference.branch_candidate.as_deref(), Some("b"));
        assert_eq!(resolved.scope.directory_prefixes, vec!["a/b/c/"]);
        assert_eq!(resolved.scope.single_file_path, None);
    }

    #[test]
    fn test_tree_url_without_directory() {
        let resolved = resolve("github.com/owner/repo/tree/dev", &query()).unwrap();
        assert_eq!(resolved.reference.branch_candidate.as_deref(), Some("dev"));
        assert!(resolved.scope.directory_prefixes.is_empty());
    }

    #[test]
    fn test_blob_url_sets_file_target() {
        let resolved = resolve("https://github.com/owner/repo/blob/b/x/y.ts", &query()).unwrap();
        assert_eq!(resolved.reference.branch_candidate.as_deref(), Some("b"));
        assert_eq!(resolved.scope.single_file_path.as_deref(), Some("x/y.ts"));
        assert!(resolved.scope.directory_prefixes.is_empty());
    }

    #[test]
    fn test_short_blob_url_is_treated_as_directory() {
        let resolved = resolve("https://github.com/owner/repo/blob/b", &query()).unwrap();
        assert_eq!(resolved.reference.branch_candidate, None);
        assert_eq!(resolved.scope.directory_prefixes, vec!["blob/b/"]);
    }

    #[test]
    fn test_shorthand_directory_scope() {
        let resolved = resolve("https://github.com/owner/repo/src/lib", &query()).unwrap();
        assert_eq!(resolved.reference.branch_candidate, None);
        assert_eq!(resolved.scope.directory_prefixes, vec!["src/lib/"]);
    }

    #[test]
    fn test_query_branch_wins() {
        let params = QueryParams {
            branch: Some("release".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/dev/src", &params).unwrap();
        assert_eq!(
            resolved.reference.branch_candidate.as_deref(),
            Some("release")
        );
    }

    #[test]
    fn test_query_dir_is_prefixed_with_base() {
        let params = QueryParams {
            dir: Some(" /utils , lib/, ,".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/main/src", &params).unwrap();
        assert_eq!(
            resolved.scope.directory_prefixes,
            vec!["src/utils/", "src/lib/"]
        );
    }

    #[test]
    fn test_query_dir_already_under_base_is_kept() {
        let params = QueryParams {
            dir: Some("src/utils".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/main/src", &params).unwrap();
        assert_eq!(resolved.scope.directory_prefixes, vec!["src/utils/"]);
    }

    #[test]
    fn test_unrelated_query_dir_is_still_prefixed() {
        let params = QueryParams {
            dir: Some("docs".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/main/src", &params).unwrap();
        assert_eq!(resolved.scope.directory_prefixes, vec!["src/docs/"]);
    }

    #[test]
    fn test_empty_query_dir_keeps_path_scope() {
        let params = QueryParams {
            dir: Some(" , ".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/main/src", &params).unwrap();
        assert_eq!(resolved.scope.directory_prefixes, vec!["src/"]);
    }

    #[test]
    fn test_query_file_prefixed_with_base_dir() {
        let params = QueryParams {
            file: Some("app.tsx".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/tree/main/src", &params).unwrap();
        assert_eq!(
            resolved.scope.single_file_path.as_deref(),
            Some("src/app.tsx")
        );
    }

    #[test]
    fn test_query_file_overrides_blob_target() {
        let params = QueryParams {
            file: Some("/z.ts".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo/blob/b/x/y.ts", &params).unwrap();
        assert_eq!(resolved.scope.single_file_path.as_deref(), Some("z.ts"));
    }

    #[test]
    fn test_extensions_are_normalized() {
        let params = QueryParams {
            ext: Some("RS, .toml,,md ".into()),
            ..query()
        };
        let resolved = resolve("https://github.com/owner/repo", &params).unwrap();
        let exts: Vec<&str> = resolved
            .scope
            .extension_filters
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(exts, vec!["md", "rs", "toml"]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(DisplayMode::from_param(Some("tree")), DisplayMode::Tree);
        assert_eq!(DisplayMode::from_param(Some("full")), DisplayMode::Full);
        assert_eq!(DisplayMode::from_param(Some("other")), DisplayMode::Full);
        assert_eq!(DisplayMode::from_param(None), DisplayMode::Full);
    }

    #[test]
    fn test_alternate_location_shapes() {
        for location in [
            "github:owner/repo",
            "git@github.com:owner/repo.git",
            "github.com/owner/repo",
            "https://github.com/owner/repo.git/",
        ] {
            let resolved = resolve(location, &query()).unwrap();
            assert_eq!(resolved.reference.owner, "owner", "owner for {}", location);
            assert_eq!(resolved.reference.repo, "repo", "repo for {}", location);
        }
    }

    #[test]
    fn test_percent_encoded_segments_are_decoded() {
        let resolved =
            resolve("https://github.com/owner/repo/tree/main/my%20docs", &query()).unwrap();
        assert_eq!(resolved.scope.directory_prefixes, vec!["my docs/"]);
    }

    #[test]
    fn test_missing_repo_is_invalid_input() {
        for location in ["", "   ", "https://github.com/owner", "https://github.com/", "http://"] {
            let err = resolve(location, &query()).unwrap_err();
            assert!(
                matches!(err, DigestError::InvalidInput(_)),
                "expected InvalidInput for {:?}, got {:?}",
                location,
                err
            );
        }
    }
}
