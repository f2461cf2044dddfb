//! Content resolver: the one entry point every consumer goes through.
//!
//! The resolver turns a content key into text, or resolves the workshop
//! outline, using the sources it was built with:
//!
//! - **Bundled** mode reads only the bundled map and serves repeat calls
//!   from the cache until entries expire.
//! - **Live** mode reads the bundled map first, then the live store, and
//!   never reads the cache so edits show up immediately.
//!
//! Within each source the literal key is tried before the key with the
//! default extension appended.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{has_extension, normalize_key, ContentSource};
use crate::domain::WorkshopStructure;
use crate::library::discovery::{discover_structure, DiscoveryOptions};

use super::cache::{CachedValue, ContentCache, EntryInfo, DEFAULT_EXPIRY, STRUCTURE_KEY};
use super::outline::{parse_outline, ParsedOutline};

/// Default outline document key
pub const DEFAULT_OUTLINE_KEY: &str = "workshop-structure.md";

/// Extension appended to keys that have none
pub const DEFAULT_EXTENSION: &str = "md";

/// Resolution failures surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Workshop structure unavailable: {reason}")]
    StructureUnavailable { reason: String },

    #[error("Content not found: {key}")]
    ContentNotFound { key: String },

    #[error("Invalid content key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Operating mode, fixed when the resolver is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    #[default]
    Bundled,
    Live,
}

impl std::fmt::Display for ContentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentMode::Bundled => write!(f, "bundled"),
            ContentMode::Live => write!(f, "live"),
        }
    }
}

impl std::str::FromStr for ContentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bundled" | "bundle" | "static" => Ok(ContentMode::Bundled),
            "live" | "dev" => Ok(ContentMode::Live),
            _ => anyhow::bail!("Unknown content mode: {}", s),
        }
    }
}

/// How the workshop structure is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureStrategy {
    /// Parse an outline document
    Outline { key: String },

    /// Build the structure from `NN-title` folders under `root`
    Discover { root: String, options: DiscoveryOptions },
}

impl Default for StructureStrategy {
    fn default() -> Self {
        StructureStrategy::Outline {
            key: DEFAULT_OUTLINE_KEY.to_string(),
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// How long bundled-mode cache entries stay fresh
    pub cache_expiry: Duration,

    /// Where the structure comes from
    pub structure: StructureStrategy,

    /// Extension tried when a key has none (without the dot)
    pub default_extension: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            cache_expiry: DEFAULT_EXPIRY,
            structure: StructureStrategy::default(),
            default_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// The sources a resolver reads from; the variant decides the mode
#[derive(Clone)]
pub enum Sources {
    Bundled(Arc<dyn ContentSource>),
    Live {
        bundled: Arc<dyn ContentSource>,
        store: Arc<dyn ContentSource>,
    },
}

impl Sources {
    fn mode(&self) -> ContentMode {
        match self {
            Sources::Bundled(_) => ContentMode::Bundled,
            Sources::Live { .. } => ContentMode::Live,
        }
    }

    /// Sources in lookup order
    fn chain(&self) -> Vec<&Arc<dyn ContentSource>> {
        match self {
            Sources::Bundled(bundled) => vec![bundled],
            Sources::Live { bundled, store } => vec![bundled, store],
        }
    }

    /// Source used for directory listings
    fn listing(&self) -> &Arc<dyn ContentSource> {
        match self {
            Sources::Bundled(bundled) => bundled,
            Sources::Live { store, .. } => store,
        }
    }
}

/// Content resolver with an expiring cache
pub struct ContentResolver {
    sources: Sources,
    options: ResolverOptions,
    cache: ContentCache,
}

impl ContentResolver {
    /// Create a resolver
    pub fn new(sources: Sources, options: ResolverOptions) -> Self {
        let cache = ContentCache::new(options.cache_expiry);
        Self {
            sources,
            options,
            cache,
        }
    }

    /// Bundled-mode resolver with default options
    pub fn bundled(source: impl ContentSource + 'static) -> Self {
        Self::new(Sources::Bundled(Arc::new(source)), ResolverOptions::default())
    }

    /// Live-mode resolver with default options
    pub fn live(
        bundled: impl ContentSource + 'static,
        store: impl ContentSource + 'static,
    ) -> Self {
        Self::new(
            Sources::Live {
                bundled: Arc::new(bundled),
                store: Arc::new(store),
            },
            ResolverOptions::default(),
        )
    }

    /// Get the operating mode
    pub fn mode(&self) -> ContentMode {
        self.sources.mode()
    }

    /// Get the resolver options
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Key of the outline document, if the outline strategy is used
    pub fn outline_key(&self) -> Option<&str> {
        match &self.options.structure {
            StructureStrategy::Outline { key } => Some(key.as_str()),
            StructureStrategy::Discover { .. } => None,
        }
    }

    /// Describe the current cache entries
    pub async fn cache_entries(&self) -> Vec<EntryInfo> {
        self.cache.entries().await
    }

    /// Resolve the workshop structure
    pub async fn resolve_structure(&self) -> Result<WorkshopStructure, ResolveError> {
        Ok(self.resolve_outline().await?.structure)
    }

    /// Resolve the workshop structure together with its parse diagnostics
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn resolve_outline(&self) -> Result<ParsedOutline, ResolveError> {
        if self.mode() == ContentMode::Bundled {
            if let Some(CachedValue::Outline(outline)) = self.cache.get_fresh(STRUCTURE_KEY).await {
                debug!("Structure served from cache");
                return Ok((*outline).clone());
            }
        }

        let ticket = self.cache.ticket(STRUCTURE_KEY).await;
        let outline = Arc::new(self.fresh_outline().await?);

        info!(
            parts = outline.structure.parts.len(),
            sections = outline.structure.section_count(),
            diagnostics = outline.diagnostics.len(),
            "Resolved workshop structure"
        );

        if !self
            .cache
            .store(ticket, CachedValue::Outline(Arc::clone(&outline)))
            .await
        {
            warn!("Structure was invalidated while resolving; result not cached");
        }

        Ok((*outline).clone())
    }

    /// Resolve a document by key
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub async fn resolve_content(&self, key: &str) -> Result<String, ResolveError> {
        let key = checked_key(key)?;
        if key == STRUCTURE_KEY {
            return Err(ResolveError::InvalidKey {
                key,
                reason: "reserved for the workshop structure".to_string(),
            });
        }

        if self.mode() == ContentMode::Bundled {
            if let Some(CachedValue::Content(text)) = self.cache.get_fresh(&key).await {
                debug!(%key, "Content served from cache");
                return Ok(text.to_string());
            }
        }

        let ticket = self.cache.ticket(&key).await;
        let text = self.fetch(&key).await?;

        if !self
            .cache
            .store(ticket, CachedValue::Content(Arc::from(text.as_str())))
            .await
        {
            warn!(%key, "Content was invalidated while resolving; result not cached");
        }

        Ok(text)
    }

    /// Drop one cache entry (a content key or `"structure"`)
    ///
    /// Returns whether an entry was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        let key = normalize_key(key).unwrap_or_else(|_| key.to_string());
        let removed = self.cache.invalidate(&key).await;
        debug!(%key, removed, "Invalidated cache entry");
        removed
    }

    /// Drop every cache entry and eagerly re-resolve the structure
    pub async fn invalidate_all(&self) -> Result<WorkshopStructure, ResolveError> {
        self.cache.clear().await;
        info!("Cache cleared, re-resolving structure");
        self.resolve_structure().await
    }

    /// Export the whole workshop as one markdown document
    pub async fn export_all(&self) -> Result<String, ResolveError> {
        super::export::export_workshop(self).await
    }

    /// Build the structure from its source, bypassing the cache
    async fn fresh_outline(&self) -> Result<ParsedOutline, ResolveError> {
        match &self.options.structure {
            StructureStrategy::Outline { key } => {
                let key = checked_key(key).map_err(|e| ResolveError::StructureUnavailable {
                    reason: e.to_string(),
                })?;
                let text = self.fetch(&key).await.map_err(|_| {
                    ResolveError::StructureUnavailable {
                        reason: format!("outline document '{}' could not be read", key),
                    }
                })?;

                parse_outline(&text).map_err(|e| ResolveError::StructureUnavailable {
                    reason: e.to_string(),
                })
            }
            StructureStrategy::Discover { root, options } => {
                discover_structure(self.sources.listing().as_ref(), root, options)
                    .await
                    .map_err(|e| ResolveError::StructureUnavailable {
                        reason: format!("{:#}", e),
                    })
            }
        }
    }

    /// Keys to try for a lookup, literal first
    fn candidates(&self, key: &str) -> Vec<String> {
        let mut candidates = vec![key.to_string()];
        if !has_extension(key) && !self.options.default_extension.is_empty() {
            candidates.push(format!("{}.{}", key, self.options.default_extension));
        }
        candidates
    }

    /// Walk the source chain until one returns the key
    async fn fetch(&self, key: &str) -> Result<String, ResolveError> {
        let candidates = self.candidates(key);

        for source in self.sources.chain() {
            for candidate in &candidates {
                match source.read(candidate).await {
                    Ok(Some(text)) => {
                        debug!(key = %candidate, source = source.name(), "Fetched content");
                        return Ok(text);
                    }
                    Ok(None) => {
                        debug!(key = %candidate, source = source.name(), "Not in source");
                    }
                    Err(e) => {
                        warn!(key = %candidate, source = source.name(), error = %e, "Source read failed");
                    }
                }
            }
        }

        Err(ResolveError::ContentNotFound {
            key: key.to_string(),
        })
    }
}

fn checked_key(key: &str) -> Result<String, ResolveError> {
    normalize_key(key).map_err(|e| ResolveError::InvalidKey {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::BundledSource;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("live".parse::<ContentMode>().unwrap(), ContentMode::Live);
        assert_eq!(" Bundled ".parse::<ContentMode>().unwrap(), ContentMode::Bundled);
        assert!("remote".parse::<ContentMode>().is_err());
        assert_eq!(ContentMode::Live.to_string(), "live");
    }

    #[test]
    fn test_candidates_append_extension_only_when_missing() {
        let resolver = ContentResolver::bundled(BundledSource::new());

        assert_eq!(resolver.candidates("welcome"), vec!["welcome", "welcome.md"]);
        assert_eq!(resolver.candidates("welcome.md"), vec!["welcome.md"]);
        assert_eq!(
            resolver.candidates("part.1/intro"),
            vec!["part.1/intro", "part.1/intro.md"]
        );
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let resolver = ContentResolver::bundled(BundledSource::new());

        let err = resolver.resolve_content("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKey { .. }));

        let err = resolver.resolve_content("").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn test_structure_key_is_reserved() {
        let resolver = ContentResolver::bundled(BundledSource::from_entries([
            (DEFAULT_OUTLINE_KEY, "# W\n## P\n- [A](a.md)\n"),
            ("structure", "not an outline"),
        ]));
        resolver.resolve_structure().await.unwrap();

        let err = resolver.resolve_content("./structure").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKey { ref key, .. } if key == STRUCTURE_KEY));

        // The cached outline survives
        let entries = resolver.cache_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, STRUCTURE_KEY);
    }

    #[tokio::test]
    async fn test_missing_outline_is_structure_unavailable() {
        let resolver = ContentResolver::bundled(BundledSource::new());

        let err = resolver.resolve_structure().await.unwrap_err();
        assert!(matches!(err, ResolveError::StructureUnavailable { .. }));
        assert!(err.to_string().contains(DEFAULT_OUTLINE_KEY));
    }

    #[tokio::test]
    async fn test_outline_without_parts_is_structure_unavailable() {
        let resolver = ContentResolver::bundled(BundledSource::from_entries([(
            DEFAULT_OUTLINE_KEY,
            "# Title only\n",
        )]));

        let err = resolver.resolve_structure().await.unwrap_err();
        assert!(matches!(err, ResolveError::StructureUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_content_not_found_names_key() {
        let resolver = ContentResolver::bundled(BundledSource::new());

        let err = resolver.resolve_content("ghost.md").await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::ContentNotFound {
                key: "ghost.md".to_string()
            }
        );
        assert_eq!(err.to_string(), "Content not found: ghost.md");
    }
}
