//! Bundled content: an immutable key → text map captured once.
//!
//! In a packaged deployment the lessons are snapshotted when the process
//! starts (or compiled in with `include_str!` and passed as entries), so
//! reads never touch the filesystem afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{normalize_key, normalize_path, ContentSource, DirectoryListing};

/// In-memory content map
#[derive(Debug, Clone, Default)]
pub struct BundledSource {
    entries: BTreeMap<String, String>,
}

impl BundledSource {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bundle from (key, text) pairs
    ///
    /// Keys are normalized; entries whose key is invalid are skipped.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(key, text)| {
                normalize_key(key.as_ref())
                    .ok()
                    .map(|key| (key, text.into()))
            })
            .collect();

        Self { entries }
    }

    /// Snapshot every markdown document under `root`
    ///
    /// Keys are paths relative to `root`, including the extension.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let pattern = format!(
            "{}/**/*.md",
            glob::Pattern::escape(&root.to_string_lossy())
        );

        let mut entries = BTreeMap::new();
        for path in glob::glob(&pattern)
            .with_context(|| format!("Invalid content glob: {}", pattern))?
        {
            let path = path.context("Failed to walk content directory")?;
            if !path.is_file() {
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
            let key = normalize_key(&relative.to_string_lossy())?;
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read content file: {}", path.display()))?;

            entries.insert(key, text);
        }

        debug!(root = %root.display(), documents = entries.len(), "Bundled content");
        Ok(Self { entries })
    }

    /// Add or replace one document
    pub fn insert(&mut self, key: &str, text: impl Into<String>) -> Result<()> {
        self.entries.insert(normalize_key(key)?, text.into());
        Ok(())
    }

    /// Bundled keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get the number of documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the bundle is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ContentSource for BundledSource {
    fn name(&self) -> &str {
        "bundled"
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.entries.get(&key).cloned())
    }

    async fn list(&self, path: &str) -> Result<DirectoryListing> {
        let path = normalize_path(path)?;
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut listing = DirectoryListing::default();
        for key in self.entries.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((folder, _)) => listing.folders.push(folder.to_string()),
                None => listing.files.push(rest.to_string()),
            }
        }

        Ok(listing.normalized())
    }
}
