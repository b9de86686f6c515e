//! Error kinds produced by the digest pipeline.
//!
//! The pipeline never writes transport responses itself. Each collaborator
//! (MCP tool, browser endpoint, CLI) calls [`DigestError::status_code`] and
//! turns the result into its own failure representation.
//!
//! Status mappings:
//! - `InvalidInput` → 400
//! - `RepositoryFetch` → 403 for upstream 401/403, 404 for upstream 404, else 500
//! - `FileNotFound` → 404
//! - `Http`, `Archive`, `Internal` → 500

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch repository: {status} {status_text}")]
    RepositoryFetch { status: u16, status_text: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// HTTP-style status classifying this error for the calling transport
    pub fn status_code(&self) -> u16 {
        match self {
            DigestError::InvalidInput(_) => 400,
            DigestError::RepositoryFetch { status, .. } => match status {
                401 | 403 => 403,
                404 => 404,
                _ => 500,
            },
            DigestError::FileNotFound(_) => 404,
            DigestError::Http(_) | DigestError::Archive(_) | DigestError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
