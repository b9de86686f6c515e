//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use gitdigest_mcp::gitdigest::{ArchiveFetcher, DigestConfig};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builds an in-memory zip laid out like a codeload snapshot
///
/// Every member is placed under `{repo}-{branch}/`, with explicit
/// directory entries for the intermediate folders.
pub struct SnapshotBuilder {
    root: String,
    files: Vec<(String, Vec<u8>)>,
}

impl SnapshotBuilder {
    pub fn new(repo: &str, branch: &str) -> Self {
        Self {
            root: format!("{}-{}/", repo, branch.replace('/', "-")),
            files: Vec::new(),
        }
    }

    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.files.push((path.to_string(), content.as_ref().to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.add_directory(self.root.as_str(), options).unwrap();
        let mut seen_dirs = std::collections::BTreeSet::new();
        for (path, content) in &self.files {
            let mut dir = String::new();
            let segments: Vec<&str> = path.split('/').collect();
            for segment in &segments[..segments.len() - 1] {
                dir.push_str(segment);
                dir.push('/');
                if seen_dirs.insert(dir.clone()) {
                    writer
                        .add_directory(format!("{}{}", self.root, dir), options)
                        .unwrap();
                }
            }
            writer
                .start_file(format!("{}{}", self.root, path), options)
                .unwrap();
            writer.write_all(content).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}

/// Fetcher pointed at a mock archive host
pub fn fetcher_for(server_url: &str) -> ArchiveFetcher {
    let config = DigestConfig::default().with_archive_base_url(server_url);
    ArchiveFetcher::new(Arc::new(config))
}

/// A small Rust project snapshot used across tests
pub fn sample_project(branch: &str) -> Vec<u8> {
    SnapshotBuilder::new("demo", branch)
        .file("README.md", "# Demo\n\nA demo project.\n")
        .file("Cargo.toml", "[package]\nname = \"demo\"\n")
        .file("Cargo.lock", "# generated\n")
        .file("src/lib.rs", "pub mod util;\n")
        .file("src/util/mod.rs", "pub fn helper() -> u8 { 1 }\n")
        .file("docs/README.md", "Documentation index\n")
        .file("docs/guide.md", "Guide\n")
        .file("assets/logo.png", [0x89u8, b'P', b'N', b'G', 0, 0, 0, 13])
        .build()
}
