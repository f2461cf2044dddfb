//! Content directory watcher.
//!
//! Watches the live content directory and invalidates resolver cache
//! entries for documents that change, so consumers re-read them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::adapters::normalize_key;
use crate::core::{ContentResolver, STRUCTURE_KEY};

/// Errors that can occur with the watcher
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Content directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Configuration for the watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Content root to watch (recursively)
    pub content_root: PathBuf,

    /// Quiet period before a burst of file events is reported (milliseconds)
    pub debounce_ms: u64,

    /// File extensions that count as content
    pub extensions: Vec<String>,
}

impl WatcherConfig {
    /// Watch `content_root` for markdown changes
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            debounce_ms: 500,
            extensions: vec!["md".to_string()],
        }
    }

    /// Check if the content root exists
    pub fn validate(&self) -> Result<(), WatcherError> {
        if !self.content_root.is_dir() {
            return Err(WatcherError::DirectoryNotFound(self.content_root.clone()));
        }
        Ok(())
    }

    /// Map a changed file to its content key
    pub fn key_for_path(&self, path: &Path) -> Option<String> {
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if !matches_extension {
            return None;
        }

        let relative = path.strip_prefix(&self.content_root).ok()?;
        normalize_key(&relative.to_string_lossy()).ok()
    }
}

/// A content change that was applied to the resolver cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// Content key of the changed document
    pub key: String,

    /// Whether the cached structure was dropped as well
    pub structure_invalidated: bool,

    /// When the change was seen
    pub detected_at: DateTime<Utc>,
}

/// Invalidates resolver entries when content files change
pub struct ContentWatcher {
    config: WatcherConfig,
    resolver: Arc<ContentResolver>,
}

impl ContentWatcher {
    /// Create a watcher for a resolver
    pub fn new(resolver: Arc<ContentResolver>, config: WatcherConfig) -> Self {
        Self { config, resolver }
    }

    /// Get the current configuration
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Invalidate whatever the change at `path` affects
    pub async fn apply_change(&self, path: &Path) -> Option<ContentChange> {
        apply_change(&self.resolver, &self.config, path).await
    }

    /// Watch the content root until stopped via the returned handle
    pub async fn watch(&self) -> Result<(mpsc::Receiver<ContentChange>, WatchHandle)> {
        self.config.validate()?;

        let (change_tx, change_rx) = mpsc::channel::<ContentChange>(100);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let (fs_tx, mut fs_rx) = mpsc::unbounded_channel::<DebounceEventResult>();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.config.debounce_ms),
            move |result: DebounceEventResult| {
                let _ = fs_tx.send(result);
            },
        )?;
        debouncer
            .watcher()
            .watch(&self.config.content_root, RecursiveMode::Recursive)?;

        tracing::info!(
            "Watching {} for content changes",
            self.config.content_root.display()
        );

        let resolver = Arc::clone(&self.resolver);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            // Dropping the debouncer stops the OS watch
            let _debouncer = debouncer;

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Watcher stopping...");
                        break;
                    }
                    result = fs_rx.recv() => match result {
                        Some(Ok(events)) => {
                            for event in events {
                                if let Some(change) = apply_change(&resolver, &config, &event.path).await {
                                    let _ = change_tx.send(change).await;
                                }
                            }
                        }
                        Some(Err(e)) => tracing::warn!("Watcher error: {:?}", e),
                        None => {
                            tracing::error!("Watcher channel disconnected");
                            break;
                        }
                    }
                }
            }
        });

        Ok((change_rx, WatchHandle { stop_tx, task }))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

async fn apply_change(
    resolver: &ContentResolver,
    config: &WatcherConfig,
    path: &Path,
) -> Option<ContentChange> {
    let key = config.key_for_path(path)?;

    // Callers may have cached the document with or without its extension
    resolver.invalidate(&key).await;
    if let Some(stem) = key.strip_suffix(".md") {
        resolver.invalidate(stem).await;
    }

    let structure_invalidated = match resolver.outline_key() {
        Some(outline) => normalize_key(outline).ok().as_deref() == Some(key.as_str()),
        None => true,
    };
    if structure_invalidated {
        resolver.invalidate(STRUCTURE_KEY).await;
    }

    tracing::debug!(%key, structure_invalidated, "Content changed");

    Some(ContentChange {
        key,
        structure_invalidated,
        detected_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BundledSource, DirectorySource};
    use tempfile::TempDir;

    #[test]
    fn test_key_for_path() {
        let config = WatcherConfig::new("/content");

        assert_eq!(
            config.key_for_path(Path::new("/content/part/intro.md")),
            Some("part/intro.md".to_string())
        );
        assert_eq!(
            config.key_for_path(Path::new("/content/WELCOME.MD")),
            Some("WELCOME.MD".to_string())
        );
        assert_eq!(config.key_for_path(Path::new("/content/image.png")), None);
        assert_eq!(config.key_for_path(Path::new("/elsewhere/a.md")), None);
    }

    #[test]
    fn test_validate_missing_root() {
        let config = WatcherConfig::new("/definitely/not/here");
        assert!(matches!(
            config.validate(),
            Err(WatcherError::DirectoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_change_invalidates_content_and_outline() {
        let temp = TempDir::new().unwrap();
        tokio::fs::write(
            temp.path().join("workshop-structure.md"),
            "# W\n## P\n- [A](a.md)\n",
        )
        .await
        .unwrap();
        tokio::fs::write(temp.path().join("a.md"), "# A").await.unwrap();

        let resolver = Arc::new(ContentResolver::live(
            BundledSource::new(),
            DirectorySource::new(temp.path()),
        ));
        resolver.resolve_structure().await.unwrap();
        resolver.resolve_content("a").await.unwrap();
        assert_eq!(resolver.cache_entries().await.len(), 2);

        let watcher = ContentWatcher::new(Arc::clone(&resolver), WatcherConfig::new(temp.path()));

        let change = watcher
            .apply_change(&temp.path().join("a.md"))
            .await
            .unwrap();
        assert_eq!(change.key, "a.md");
        assert!(!change.structure_invalidated);
        assert_eq!(resolver.cache_entries().await.len(), 1);

        let change = watcher
            .apply_change(&temp.path().join("workshop-structure.md"))
            .await
            .unwrap();
        assert!(change.structure_invalidated);
        assert!(resolver.cache_entries().await.is_empty());
    }
}
