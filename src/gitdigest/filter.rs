//! Per-file selection and exclusion
//!
//! Walks the archive once, in archive order, and decides for every member
//! whether it is part of the output. Selection (file target, directory
//! prefixes, extensions) runs first; the exclusion rules (lock files, binary
//! extensions, compiled JavaScript in TypeScript projects, oversized files,
//! binary content) only apply to members whose content is actually loaded.

use once_cell::sync::Lazy;
use regex::Regex;

use super::archive::{ArchiveEntry, ArchiveSource};
use super::config::DigestConfig;
use super::error::Result;
use super::reference::{DisplayMode, ScopeSelection};

/// `*-lock.*` or `*.lock`, matched against the file name
static LOCK_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-lock\..*|\.lock)$").expect("lock file pattern is valid"));

/// A selected file, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the repository root
    pub path: String,
    /// UTF-8 length of the untruncated content
    pub byte_size: usize,
    /// Size counted towards the displayed total
    pub display_size: usize,
    /// Content, possibly truncated with a trailing marker
    pub content: String,
    pub is_truncated: bool,
}

impl RenderedFile {
    /// Structure-only entry; nothing was read from the archive
    fn placeholder(path: String) -> Self {
        Self {
            path,
            byte_size: 0,
            display_size: 0,
            content: String::new(),
            is_truncated: false,
        }
    }
}

/// Filter result: selected files in archive order plus size totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredFiles {
    pub files: Vec<RenderedFile>,
    /// Sum of original sizes
    pub total_size: usize,
    /// Sum of display sizes (truncated files count as the truncation limit)
    pub display_total_size: usize,
}

impl FilteredFiles {
    pub fn get(&self, path: &str) -> Option<&RenderedFile> {
        self.files.iter().find(|file| file.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    fn push(&mut self, file: RenderedFile) {
        self.total_size += file.byte_size;
        self.display_total_size += file.display_size;
        self.files.push(file);
    }
}

/// Why a loaded file was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Exclusion {
    #[strum(serialize = "lock file")]
    LockFile,
    #[strum(serialize = "binary extension")]
    BinaryExtension,
    #[strum(serialize = "compiled JavaScript in TypeScript project")]
    CompiledJavaScript,
    #[strum(serialize = "too large")]
    TooLarge,
    #[strum(serialize = "binary content")]
    BinaryContent,
}

/// Selects and loads the files of `archive` that match `scope`
///
/// Only members under `root_prefix` are considered; everything else is
/// ignored. In [`DisplayMode::Tree`] only README files are read, other
/// matches are recorded as empty placeholders for the structure listing.
/// A single-file target is always read, whatever the mode.
///
/// # Errors
///
/// Propagates archive read failures for members whose content is needed.
pub fn filter_files(
    archive: &mut dyn ArchiveSource,
    root_prefix: &str,
    scope: &ScopeSelection,
    mode: DisplayMode,
    config: &DigestConfig,
) -> Result<FilteredFiles> {
    let is_typescript_project = archive
        .entries()
        .iter()
        .any(|entry| entry.path.starts_with(root_prefix) && entry.path.ends_with("tsconfig.json"));

    let members: Vec<ArchiveEntry> = archive
        .entries()
        .iter()
        .filter(|entry| !entry.is_directory)
        .cloned()
        .collect();

    let mut filtered = FilteredFiles::default();

    for member in members {
        let Some(relative_path) = member.path.strip_prefix(root_prefix) else {
            continue;
        };
        if relative_path.is_empty() || !is_selected(relative_path, scope) {
            continue;
        }

        let structure_only = mode == DisplayMode::Tree
            && scope.single_file_path.is_none()
            && !is_readme(relative_path);
        if structure_only {
            filtered.push(RenderedFile::placeholder(relative_path.to_string()));
            continue;
        }

        if let Some(exclusion) =
            exclusion_before_read(relative_path, member.size, is_typescript_project, config)
        {
            tracing::debug!("Skipping {}: {}", relative_path, exclusion);
            continue;
        }

        let content = archive.read_content(&member.path)?;
        if let Some(exclusion) = exclusion_by_content(&content, config) {
            tracing::debug!("Skipping {}: {}", relative_path, exclusion);
            continue;
        }

        filtered.push(build_rendered_file(
            relative_path.to_string(),
            content,
            config.truncate_size,
        ));
    }

    tracing::debug!(
        "Selected {} files ({} bytes, {} displayed)",
        filtered.len(),
        filtered.total_size,
        filtered.display_total_size
    );
    Ok(filtered)
}

fn is_selected(relative_path: &str, scope: &ScopeSelection) -> bool {
    if let Some(target) = &scope.single_file_path {
        return relative_path == target;
    }

    let in_directory = scope.directory_prefixes.is_empty()
        || scope
            .directory_prefixes
            .iter()
            .any(|prefix| relative_path.starts_with(prefix.as_str()));

    let has_extension = scope.extension_filters.is_empty()
        || extension(relative_path).is_some_and(|ext| scope.extension_filters.contains(&ext));

    in_directory && has_extension
}

/// Rules that only look at the listing, checked before reading the member
fn exclusion_before_read(
    relative_path: &str,
    declared_size: u64,
    is_typescript_project: bool,
    config: &DigestConfig,
) -> Option<Exclusion> {
    if LOCK_FILE_PATTERN.is_match(file_name(relative_path)) {
        return Some(Exclusion::LockFile);
    }
    if extension(relative_path).is_some_and(|ext| config.is_excluded_extension(&ext)) {
        return Some(Exclusion::BinaryExtension);
    }
    if is_typescript_project && (relative_path.ends_with(".js") || relative_path.ends_with(".mjs"))
    {
        return Some(Exclusion::CompiledJavaScript);
    }
    if declared_size > config.max_file_size as u64 {
        return Some(Exclusion::TooLarge);
    }
    None
}

fn exclusion_by_content(content: &str, config: &DigestConfig) -> Option<Exclusion> {
    if content.len() > config.max_file_size {
        return Some(Exclusion::TooLarge);
    }
    if looks_binary(content, config.binary_sample_chars, config.binary_threshold) {
        return Some(Exclusion::BinaryContent);
    }
    None
}

/// Sizes the content and truncates it to `truncate_size` bytes when larger
fn build_rendered_file(path: String, content: String, truncate_size: usize) -> RenderedFile {
    let byte_size = content.len();
    if byte_size <= truncate_size {
        return RenderedFile {
            path,
            byte_size,
            display_size: byte_size,
            content,
            is_truncated: false,
        };
    }

    let mut cut = truncate_size;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let remaining_kb = (byte_size - truncate_size) as f64 / 1024.0;
    let truncated = format!(
        "{}\n\n... [truncated: {:.2}KB remaining]",
        &content[..cut],
        remaining_kb
    );

    RenderedFile {
        path,
        byte_size,
        display_size: truncate_size,
        content: truncated,
        is_truncated: true,
    }
}

/// Heuristic binary detection over the first `sample_chars` characters
///
/// A character is suspicious when its code is 0, or below 32 and not a tab,
/// newline or carriage return. The content is binary when the suspicious
/// fraction of the sample exceeds `threshold`. Empty content is text.
pub fn looks_binary(content: &str, sample_chars: usize, threshold: f64) -> bool {
    let (total, suspicious) = content
        .chars()
        .take(sample_chars)
        .fold((0usize, 0usize), |(total, suspicious), c| {
            let code = c as u32;
            let is_suspicious = code == 0 || (code < 32 && !matches!(code, 9 | 10 | 13));
            (total + 1, suspicious + usize::from(is_suspicious))
        });

    total > 0 && (suspicious as f64 / total as f64) > threshold
}

pub fn is_readme(relative_path: &str) -> bool {
    file_name(relative_path).eq_ignore_ascii_case("readme.md")
}

fn file_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// Lowercase text after the last `.` of the file name
fn extension(relative_path: &str) -> Option<String> {
    file_name(relative_path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}
