//! Live content read straight from a directory on every call.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use super::{normalize_key, normalize_path, ContentSource, DirectoryListing};

/// Directory-backed live source
pub struct DirectorySource {
    /// Content root
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the content root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.root.join(normalize_key(key)?);

        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(_) if path.is_dir() => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read content file: {}", path.display()))
            }
        }
    }

    async fn list(&self, path: &str) -> Result<DirectoryListing> {
        let dir = self.root.join(normalize_path(path)?);
        let mut listing = DirectoryListing::default();

        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("Failed to list content directory: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                listing.folders.push(name);
            } else if file_type.is_file() {
                listing.files.push(name);
            }
        }

        Ok(listing.normalized())
    }
}
