//! Configuration for the workshop resolver.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (WORKSHOP_MODE, WORKSHOP_CONTENT_DIR, WORKSHOP_STORE_URL)
//! 2. Config file (.workshop/config.yaml)
//! 3. Defaults (bundled mode, ./content)
//!
//! Config file discovery:
//! - Searches the given directory and its parents for .workshop/config.yaml
//! - Paths in the config file are relative to the project root (parent of .workshop/)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{BundledSource, ContentSource, DirectorySource, HttpSource};
use crate::core::{
    ContentMode, ContentResolver, ResolverOptions, Sources, StructureStrategy, DEFAULT_EXPIRY,
    DEFAULT_OUTLINE_KEY,
};
use crate::library::DiscoveryOptions;

/// Directory holding the config file
pub const CONFIG_DIR: &str = ".workshop";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

/// Default content root, relative to the project root
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// Default export file name
pub const DEFAULT_EXPORT_FILE: &str = "workshop.md";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    #[serde(default)]
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// `bundled` or `live`
    pub mode: Option<String>,
    /// Content root (relative to project root)
    pub root: Option<String>,
    /// Outline document key
    pub outline: Option<String>,
    /// `outline` or `discover`
    pub structure: Option<String>,
    /// Live store base URL; live reads go over HTTP when set
    pub store_url: Option<String>,
    /// Snapshot consulted before the live store (relative to project root)
    pub bundle: Option<String>,
    /// Title for discovered workshops
    pub title: Option<String>,
    /// Description for discovered workshops
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub expiry_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub file_name: Option<String>,
}

/// How the structure is built, as configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    #[default]
    Outline,
    Discover,
}

impl std::str::FromStr for StructureKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "outline" => Ok(StructureKind::Outline),
            "discover" | "folders" => Ok(StructureKind::Discover),
            _ => anyhow::bail!("Unknown structure strategy: {}", s),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Operating mode
    pub mode: ContentMode,
    /// Absolute path to the content root
    pub content_root: PathBuf,
    /// Outline document key
    pub outline: String,
    /// Structure strategy
    pub structure: StructureKind,
    /// Live store base URL
    pub store_url: Option<String>,
    /// Directory snapshotted ahead of the live store in live mode
    pub bundle_dir: Option<PathBuf>,
    /// Discovery metadata overrides
    pub title: Option<String>,
    pub description: Option<String>,
    /// Cache freshness window
    pub cache_expiry_seconds: u64,
    /// Default export file name
    pub export_file: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults rooted at `base`
    pub fn defaults(base: &Path) -> Self {
        Self {
            mode: ContentMode::default(),
            content_root: base.join(DEFAULT_CONTENT_DIR),
            outline: DEFAULT_OUTLINE_KEY.to_string(),
            structure: StructureKind::default(),
            store_url: None,
            bundle_dir: None,
            title: None,
            description: None,
            cache_expiry_seconds: DEFAULT_EXPIRY.as_secs(),
            export_file: DEFAULT_EXPORT_FILE.to_string(),
            config_file: None,
        }
    }

    /// Resolver options implied by this configuration
    pub fn resolver_options(&self) -> ResolverOptions {
        let structure = match self.structure {
            StructureKind::Outline => StructureStrategy::Outline {
                key: self.outline.clone(),
            },
            StructureKind::Discover => StructureStrategy::Discover {
                root: String::new(),
                options: DiscoveryOptions {
                    title: self.title.clone(),
                    description: self.description.clone(),
                },
            },
        };

        ResolverOptions {
            cache_expiry: Duration::from_secs(self.cache_expiry_seconds),
            structure,
            ..ResolverOptions::default()
        }
    }

    /// Build a resolver for the configured mode
    ///
    /// Bundled mode snapshots the content root now. Live mode reads the
    /// content root (or the store URL) on every call, with only the
    /// separately configured bundle directory consulted first.
    pub fn build_resolver(&self) -> Result<ContentResolver> {
        let sources = match self.mode {
            ContentMode::Bundled => Sources::Bundled(Arc::new(snapshot(&self.content_root)?)),
            ContentMode::Live => {
                let bundled: Arc<dyn ContentSource> = match &self.bundle_dir {
                    Some(dir) => Arc::new(snapshot(dir)?),
                    None => Arc::new(BundledSource::new()),
                };
                let store: Arc<dyn ContentSource> = match &self.store_url {
                    Some(url) => Arc::new(HttpSource::new(url.clone())),
                    None => Arc::new(DirectorySource::new(self.content_root.clone())),
                };
                Sources::Live { bundled, store }
            }
        };

        Ok(ContentResolver::new(sources, self.resolver_options()))
    }
}

fn snapshot(dir: &Path) -> Result<BundledSource> {
    BundledSource::from_dir(dir)
        .with_context(|| format!("Failed to bundle content from {}", dir.display()))
}

/// Find config file by searching `start` and its parents
pub fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration starting the file search at `dir`
pub fn load_config_from(dir: &Path) -> Result<ResolvedConfig> {
    load_config_with(dir, |name| std::env::var(name).ok())
}

/// Load configuration from the current directory
pub fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd)
}

/// Load configuration with an explicit environment lookup
fn load_config_with(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<ResolvedConfig> {
    let config_file = find_config_file_from(dir);

    let mut resolved = match &config_file {
        Some(config_path) => {
            let config = load_config_file(config_path)?;

            // Project root is the parent of .workshop/
            let base_dir = config_path
                .parent()
                .and_then(|p| p.parent())
                .unwrap_or(Path::new("."));

            let mut resolved = ResolvedConfig::defaults(base_dir);
            let content = config.content;

            if let Some(mode) = content.mode {
                resolved.mode = mode.parse()?;
            }
            if let Some(root) = content.root {
                resolved.content_root = resolve_path(base_dir, &root);
            }
            if let Some(outline) = content.outline {
                resolved.outline = outline;
            }
            if let Some(structure) = content.structure {
                resolved.structure = structure.parse()?;
            }
            resolved.store_url = content.store_url;
            resolved.bundle_dir = content.bundle.map(|dir| resolve_path(base_dir, &dir));
            resolved.title = content.title;
            resolved.description = content.description;

            if let Some(expiry) = config.cache.and_then(|c| c.expiry_seconds) {
                resolved.cache_expiry_seconds = expiry;
            }
            if let Some(file_name) = config.export.and_then(|e| e.file_name) {
                resolved.export_file = file_name;
            }

            resolved.config_file = Some(config_path.clone());
            resolved
        }
        None => ResolvedConfig::defaults(dir),
    };

    if let Some(mode) = env("WORKSHOP_MODE") {
        resolved.mode = mode.parse().context("Invalid WORKSHOP_MODE")?;
    }
    if let Some(content_dir) = env("WORKSHOP_CONTENT_DIR") {
        resolved.content_root = PathBuf::from(content_dir);
    }
    if let Some(url) = env("WORKSHOP_STORE_URL") {
        resolved.store_url = Some(url);
    }

    Ok(resolved)
}
