//! Command-line interface for workshop.
//!
//! Provides commands for printing the outline, reading sections, exporting
//! the whole workshop, checking content, and watching a live content tree.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{ContentSource, DirectorySource};
use crate::config::{self, ResolvedConfig};
use crate::core::{ContentMode, ParsedOutline};
use crate::library::{discover_structure, validate_listing, DiscoveryOptions};
use crate::watch::{ContentWatcher, WatcherConfig};

/// workshop - Resolve, check and export workshop content
#[derive(Parser, Debug)]
#[command(name = "workshop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Content mode (overrides the config file)
    #[arg(long, global = true, env = "WORKSHOP_MODE")]
    pub mode: Option<ContentMode>,

    /// Content root directory (overrides the config file)
    #[arg(long, global = true, env = "WORKSHOP_CONTENT_DIR")]
    pub content_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the workshop outline
    Outline {
        /// Print the structure as JSON
        #[arg(long)]
        json: bool,

        /// Also print parse diagnostics
        #[arg(short, long)]
        diagnostics: bool,
    },

    /// Print one section with its neighbours
    Show {
        /// Section slug
        slug: String,
    },

    /// Export the whole workshop as one markdown file
    Export {
        /// Output file (defaults to the configured export file, `-` for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a structure from NN-title folders and check their names
    Discover {
        /// Folder to scan (defaults to the content root)
        path: Option<PathBuf>,
    },

    /// Verify the outline and that every section resolves
    Check,

    /// Watch the content root and report invalidated entries
    Watch,

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut cfg = config::load_config()?;
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(dir) = self.content_dir {
            cfg.content_root = dir;
        }

        match self.command {
            Commands::Outline { json, diagnostics } => show_outline(&cfg, json, diagnostics).await,
            Commands::Show { slug } => show_section(&cfg, &slug).await,
            Commands::Export { output } => export(&cfg, output).await,
            Commands::Discover { path } => discover(&cfg, path).await,
            Commands::Check => check(&cfg).await,
            Commands::Watch => watch(&cfg).await,
            Commands::Config => show_config(&cfg),
        }
    }
}

async fn show_outline(cfg: &ResolvedConfig, json: bool, diagnostics: bool) -> Result<()> {
    let resolver = cfg.build_resolver()?;
    let outline = resolver.resolve_outline().await?;

    if json {
        let value = if diagnostics {
            serde_json::to_string_pretty(&outline)?
        } else {
            serde_json::to_string_pretty(&outline.structure)?
        };
        println!("{}", value);
        return Ok(());
    }

    print_outline(&outline);
    if diagnostics {
        print_diagnostics(&outline);
    }
    Ok(())
}

fn print_outline(outline: &ParsedOutline) {
    let structure = &outline.structure;

    println!("{}", structure.title);
    if !structure.description.is_empty() {
        println!("{}", structure.description);
    }

    for part in &structure.parts {
        println!();
        println!("Part {}: {}", part.id, part.title);
        for section in &part.sections {
            match &section.slug {
                Some(slug) => println!("  {}.{} {:<40} {}", part.id, section.id, section.title, slug),
                None => println!("  {}.{} {:<40} (coming soon)", part.id, section.id, section.title),
            }
        }
    }
}

fn print_diagnostics(outline: &ParsedOutline) {
    println!();
    if outline.diagnostics.is_empty() {
        println!("No diagnostics");
        return;
    }
    println!("Diagnostics:");
    for diagnostic in &outline.diagnostics {
        println!("  - {}", diagnostic);
    }
}

async fn show_section(cfg: &ResolvedConfig, slug: &str) -> Result<()> {
    let resolver = cfg.build_resolver()?;
    let structure = resolver.resolve_structure().await?;

    let section = structure
        .find_section(slug)
        .with_context(|| format!("No section with slug '{}' in the outline", slug))?;

    let text = resolver.resolve_content(slug).await?;

    eprintln!(
        "[{} {} / Part {}: {}]",
        section.number(),
        section.section.title,
        section.part.id,
        section.part.title
    );
    println!("{}", text.trim_end());

    let adjacent = structure.adjacent(slug);
    eprintln!();
    if let Some(prev) = adjacent.prev {
        eprintln!("← {} {} ({})", prev.number(), prev.section.title, prev.slug().unwrap_or(""));
    }
    if let Some(next) = adjacent.next {
        eprintln!("→ {} {} ({})", next.number(), next.section.title, next.slug().unwrap_or(""));
    }
    Ok(())
}

async fn export(cfg: &ResolvedConfig, output: Option<PathBuf>) -> Result<()> {
    let resolver = cfg.build_resolver()?;
    let markdown = resolver.export_all().await?;

    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.export_file));
    if output == Path::new("-") {
        print!("{}", markdown);
        return Ok(());
    }

    write_atomically(&output, &markdown)?;
    eprintln!("Exported workshop to {}", output.display());
    Ok(())
}

/// Write through a temp file in the target directory, then rename over it
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .context("Failed to write export")?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

async fn discover(cfg: &ResolvedConfig, path: Option<PathBuf>) -> Result<()> {
    let root = path.unwrap_or_else(|| cfg.content_root.clone());
    let source = DirectorySource::new(root.clone());
    let options = DiscoveryOptions {
        title: cfg.title.clone(),
        description: cfg.description.clone(),
    };

    let outline = discover_structure(&source, "", &options)
        .await
        .with_context(|| format!("Failed to discover workshop in {}", root.display()))?;
    print_outline(&outline);
    print_diagnostics(&outline);

    let root_listing = source.list("").await?;
    let mut issues = validate_listing(&root_listing);
    for folder in &root_listing.folders {
        issues.extend(validate_listing(&source.list(folder).await?));
    }

    if !issues.is_empty() {
        println!();
        println!("Naming issues:");
        for issue in &issues {
            println!("  - {}", issue);
        }
    }
    Ok(())
}

async fn check(cfg: &ResolvedConfig) -> Result<()> {
    let resolver = cfg.build_resolver()?;
    let outline = resolver.resolve_outline().await?;

    let mut missing = Vec::new();
    let sections = outline.structure.navigable_sections();
    for section in &sections {
        let Some(slug) = section.slug() else { continue };
        if let Err(e) = resolver.resolve_content(slug).await {
            missing.push(format!("{} {}: {}", section.number(), section.section.title, e));
        }
    }

    println!(
        "{}: {} parts, {} sections ({} linked)",
        outline.structure.title,
        outline.structure.parts.len(),
        outline.structure.section_count(),
        sections.len()
    );
    print_diagnostics(&outline);

    if !missing.is_empty() {
        println!();
        println!("Unresolved sections:");
        for line in &missing {
            println!("  - {}", line);
        }
        anyhow::bail!("{} section(s) could not be resolved", missing.len());
    }
    Ok(())
}

async fn watch(cfg: &ResolvedConfig) -> Result<()> {
    if cfg.mode != ContentMode::Live {
        tracing::warn!("Watching in bundled mode; the bundled snapshot will not pick up edits");
    }

    let resolver = Arc::new(cfg.build_resolver()?);
    let watcher = ContentWatcher::new(
        Arc::clone(&resolver),
        WatcherConfig::new(cfg.content_root.clone()),
    );
    let (mut changes, handle) = watcher.watch().await?;

    eprintln!("Watching {} (Ctrl-C to stop)", cfg.content_root.display());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Some(change) => {
                    let suffix = if change.structure_invalidated { " (+structure)" } else { "" };
                    println!("{} invalidated {}{}", change.detected_at.format("%H:%M:%S"), change.key, suffix);
                }
                None => break,
            }
        }
    }

    handle.stop().await
}

fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("Workshop Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Content:");
    println!("  Mode:       {}", cfg.mode);
    println!("  Root:       {}", cfg.content_root.display());
    println!("  Structure:  {:?}", cfg.structure);
    println!("  Outline:    {}", cfg.outline);
    println!(
        "  Store URL:  {}",
        cfg.store_url.as_deref().unwrap_or("(directory)")
    );
    println!(
        "  Bundle:     {}",
        cfg.bundle_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!();
    println!("Cache expiry: {}s", cfg.cache_expiry_seconds);
    println!("Export file:  {}", cfg.export_file);

    Ok(())
}
