//! Repository snapshot access
//!
//! The filter only needs two things from a snapshot: the flat member listing
//! in archive order and the content of a single member. [`ArchiveSource`]
//! captures exactly that so the pipeline does not depend on the zip library;
//! [`ZipArchiveSource`] backs it with a downloaded zip and [`MemoryArchive`]
//! with an in-memory fixture.

pub mod fetcher;

use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

use super::error::{DigestError, Result};

pub use fetcher::{ArchiveFetcher, FetchedArchive};

/// One archive member as listed by an [`ArchiveSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full archive path, including the repository root folder
    pub path: String,
    pub is_directory: bool,
    /// Uncompressed size as declared by the archive
    pub size: u64,
}

/// Read access to a decoded repository snapshot
pub trait ArchiveSource {
    /// All members in archive order
    fn entries(&self) -> &[ArchiveEntry];

    /// Content of the member at `path`, decoded as UTF-8 (lossy)
    fn read_content(&mut self, path: &str) -> Result<String>;
}

/// [`ArchiveSource`] over an in-memory zip file
pub struct ZipArchiveSource {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
}

impl ZipArchiveSource {
    /// Decodes the zip central directory and records the member listing
    ///
    /// Member contents stay compressed until [`ArchiveSource::read_content`]
    /// asks for them.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let member = archive.by_index_raw(index)?;
            entries.push(ArchiveEntry {
                path: member.name().to_string(),
                is_directory: member.is_dir(),
                size: member.size(),
            });
        }

        tracing::debug!("Opened zip archive with {} members", entries.len());
        Ok(Self { archive, entries })
    }
}

impl ArchiveSource for ZipArchiveSource {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read_content(&mut self, path: &str) -> Result<String> {
        let mut member = self.archive.by_name(path)?;
        let mut buffer = Vec::new();
        member
            .read_to_end(&mut buffer)
            .map_err(ZipError::from)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// [`ArchiveSource`] built member by member in memory
///
/// Handy for fixtures; insertion order is the archive order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<ArchiveEntry>,
    contents: Vec<Option<String>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        self.entries.push(ArchiveEntry {
            path: path.into(),
            is_directory: false,
            size: content.len() as u64,
        });
        self.contents.push(Some(content));
        self
    }

    pub fn with_directory(mut self, path: impl Into<String>) -> Self {
        self.entries.push(ArchiveEntry {
            path: path.into(),
            is_directory: true,
            size: 0,
        });
        self.contents.push(None);
        self
    }
}

impl ArchiveSource for MemoryArchive {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn read_content(&mut self, path: &str) -> Result<String> {
        self.entries
            .iter()
            .position(|entry| entry.path == path)
            .and_then(|index| self.contents[index].clone())
            .ok_or_else(|| DigestError::Internal(format!("No archive member named {}", path)))
    }
}
