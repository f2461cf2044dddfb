//! Content source interfaces.
//!
//! Sources provide a unified interface for reading workshop documents,
//! whether they were bundled at startup or are fetched live from disk or
//! a file server.

pub mod bundled;
pub mod filesystem;
pub mod http;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Re-export the source implementations
pub use bundled::BundledSource;
pub use filesystem::DirectorySource;
pub use http::HttpSource;

/// Folders and files directly under a path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Sub-folder names, sorted
    #[serde(default)]
    pub folders: Vec<String>,

    /// File names, sorted
    #[serde(default)]
    pub files: Vec<String>,
}

impl DirectoryListing {
    /// Sort and dedup both lists
    pub fn normalized(mut self) -> Self {
        self.folders.sort();
        self.folders.dedup();
        self.files.sort();
        self.files.dedup();
        self
    }

    /// Check if the listing has no entries
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Trait for content sources
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Read a document by key
    ///
    /// Returns `Ok(None)` when the source does not have the key and `Err`
    /// when the source itself failed.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// List folders and files under a path (`""` is the root)
    async fn list(&self, path: &str) -> Result<DirectoryListing>;
}

/// Normalize a content key into a relative, forward-slash path
///
/// Strips `./` and leading slashes, folds backslashes, and rejects keys
/// that are empty or climb out of the content root.
pub fn normalize_key(key: &str) -> Result<String> {
    let key = key.trim().replace('\\', "/");

    let mut parts = Vec::new();
    for part in key.split('/') {
        match part {
            "" | "." => continue,
            ".." => bail!("key '{}' escapes the content root", key),
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        bail!("key is empty");
    }

    Ok(parts.join("/"))
}

/// Normalize a listing path; unlike keys, the root (`""`) is allowed
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        return Ok(String::new());
    }
    normalize_key(trimmed)
}

/// Check if a key ends in a file extension
pub fn has_extension(key: &str) -> bool {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    match file_name.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < file_name.len(),
        None => false,
    }
}
