//! Output rendering
//!
//! Produces one of the three output shapes from a [`FilteredFiles`] set:
//! the verbatim content of a single file, a structure listing with README
//! bodies, or a full listing with every file's content.

use std::collections::{BTreeSet, HashMap};

use super::error::{DigestError, Result};
use super::filter::{FilteredFiles, RenderedFile, is_readme};
use super::reference::{DisplayMode, ScopeSelection};

const FOLDER_MARKER: &str = "📁";
const FILE_MARKER: &str = "📄";

/// Renders the filtered files according to the scope and mode
///
/// # Errors
///
/// Returns [`DigestError::FileNotFound`] when a single-file target was
/// requested but is not part of `filtered` (missing from the archive or
/// dropped by an exclusion rule).
pub fn render(filtered: &FilteredFiles, scope: &ScopeSelection, mode: DisplayMode) -> Result<String> {
    if let Some(target) = &scope.single_file_path {
        return filtered
            .get(target)
            .map(|file| file.content.clone())
            .ok_or_else(|| DigestError::FileNotFound(target.clone()));
    }

    match mode {
        DisplayMode::Tree => Ok(render_tree_mode(filtered)),
        DisplayMode::Full => Ok(render_full_mode(filtered)),
    }
}

fn render_tree_mode(filtered: &FilteredFiles) -> String {
    let mut output = String::from("# Directory Structure\n\n");
    output.push_str(&render_tree(filtered, |_| None));

    let mut readmes: Vec<&RenderedFile> = filtered
        .files
        .iter()
        .filter(|file| is_readme(&file.path) && !file.content.is_empty())
        .collect();
    readmes.sort_by(|a, b| a.path.cmp(&b.path));

    if !readmes.is_empty() {
        output.push_str("\n# README Files\n");
        for readme in readmes {
            output.push_str(&format!("\n## {}\n\n{}\n", readme.path, readme.content));
        }
    }

    output
}

fn render_full_mode(filtered: &FilteredFiles) -> String {
    let by_path: HashMap<&str, &RenderedFile> = filtered
        .files
        .iter()
        .map(|file| (file.path.as_str(), file))
        .collect();

    let mut output = String::from("# File Tree\n\n");
    output.push_str(&render_tree(filtered, |path| {
        by_path.get(path).map(|file| leaf_annotation(file))
    }));

    output.push_str(&format!(
        "\nTotal size: {}, displayed: {}\n",
        format_kb(filtered.total_size),
        format_kb(filtered.display_total_size)
    ));

    output.push_str("\n# Files\n");
    for file in &filtered.files {
        output.push_str(&format!("\n```{}\n{}\n```\n", file.path, file.content));
    }

    output
}

fn leaf_annotation(file: &RenderedFile) -> String {
    if file.is_truncated {
        format!(
            " ({} →{}KB truncated)",
            format_kb(file.display_size),
            file.display_size / 1024
        )
    } else {
        format!(" ({})", format_kb(file.display_size))
    }
}

/// Indented listing of every path implied by the selected files
///
/// Each file contributes itself and all of its ancestor directories. Paths
/// are sorted lexicographically; a path is a leaf when no other path lives
/// under it. `annotate` may append text to leaf lines.
fn render_tree<F>(filtered: &FilteredFiles, annotate: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let paths = collect_paths(filtered);

    let mut output = String::new();
    for path in &paths {
        let depth = path.matches('/').count();
        let name = path.rsplit('/').next().unwrap_or(path.as_str());
        let indent = "  ".repeat(depth);

        if is_leaf(&paths, path) {
            let annotation = annotate(path.as_str()).unwrap_or_default();
            output.push_str(&format!("{}{} {}{}\n", indent, FILE_MARKER, name, annotation));
        } else {
            output.push_str(&format!("{}{} {}/\n", indent, FOLDER_MARKER, name));
        }
    }
    output
}

fn collect_paths(filtered: &FilteredFiles) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    for file in &filtered.files {
        let mut current = String::new();
        for segment in file.path.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            paths.insert(current.clone());
        }
    }
    paths
}

/// True when no recorded path starts with `path` followed by `/`
///
/// Every descendant sorts at or after `"{path}/"`, so checking the first
/// element of that range is enough.
fn is_leaf(paths: &BTreeSet<String>, path: &str) -> bool {
    let child_prefix = format!("{}/", path);
    !paths
        .range(child_prefix.clone()..)
        .next()
        .is_some_and(|next| next.starts_with(&child_prefix))
}

fn format_kb(bytes: usize) -> String {
    format!("{:.2}KB", bytes as f64 / 1024.0)
}
