//! Immutable pipeline configuration
//!
//! Every threshold and list the pipeline consults lives here. A single
//! `DigestConfig` is built at startup and shared behind an `Arc`; nothing in
//! the pipeline mutates it.

use std::collections::HashSet;

/// Default host serving repository zip snapshots
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://codeload.github.com";

/// User agent sent with every archive request
pub const DEFAULT_USER_AGENT: &str =
    "gitdigest-mcp/0.1.0 (https://github.com/tacogips/gitdigest-mcp)";

/// Extensions whose files are never rendered: images, compiled binaries,
/// archives, office documents, media and fonts.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "tif", "tiff", "avif", "heic",
    "psd",
    // binaries and archives
    "exe", "dll", "so", "dylib", "bin", "o", "a", "lib", "obj", "class", "jar", "war", "pyc",
    "pyo", "wasm", "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "iso", "dmg", "deb",
    "rpm",
    // office documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp",
    // media
    "mp3", "mp4", "wav", "ogg", "flac", "aac", "m4a", "avi", "mov", "mkv", "webm", "wmv",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // databases
    "db", "sqlite", "sqlite3",
];

/// Configuration consumed by the fetcher, filter and renderer
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Base URL of the zip snapshot host, without trailing slash
    pub archive_base_url: String,

    /// Value of the `User-Agent` header on archive requests
    pub user_agent: String,

    /// Branch used when neither the URL nor the query names one
    pub default_branch: String,

    /// Branches tried, in order, after the requested branch fails
    pub fallback_branches: Vec<String>,

    /// Files whose original size exceeds this many bytes are dropped
    pub max_file_size: usize,

    /// Files larger than this many bytes are truncated to it
    pub truncate_size: usize,

    /// Number of leading characters inspected by the binary heuristic
    pub binary_sample_chars: usize,

    /// Fraction of control characters above which content counts as binary
    pub binary_threshold: f64,

    /// Lowercase extensions, without dot, that are never rendered
    pub excluded_extensions: HashSet<String>,
}

impl DigestConfig {
    /// Returns a copy pointing at another archive host
    ///
    /// Used for mirrors and for tests running against a local mock server.
    pub fn with_archive_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.archive_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_excluded_extension(&self, extension: &str) -> bool {
        self.excluded_extensions
            .contains(&extension.to_ascii_lowercase())
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_branch: "main".to_string(),
            fallback_branches: vec!["main".to_string(), "master".to_string()],
            max_file_size: 500 * 1024,
            truncate_size: 30 * 1024,
            binary_sample_chars: 1000,
            binary_threshold: 0.05,
            excluded_extensions: EXCLUDED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
