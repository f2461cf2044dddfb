//! workshop - Content resolution for a workshop site
//!
//! Resolves the workshop structure (parts and sections) and the markdown
//! behind each section from one of two source configurations:
//!
//! - **Bundled**: a snapshot of the content taken at startup, served from
//!   an expiring cache
//! - **Live**: the bundled snapshot first, then a live store (directory or
//!   dev server) read on every call
//!
//! # Modules
//!
//! - `adapters`: Content sources (bundled map, directory, HTTP)
//! - `core`: Outline parser, cache, resolver, export
//! - `domain`: Data structures (WorkshopStructure, Part, Section, Diagnostic)
//! - `library`: Folder-based structure discovery and naming rules
//! - `watch`: Live content watcher
//! - `config`: Config file and environment overrides
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Print the outline
//! workshop outline --diagnostics
//!
//! # Read a section in live mode
//! workshop --mode live show smart-wallet
//!
//! # Export everything to one file
//! workshop export -o workshop.md
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;
pub mod watch;

// Re-export main types at crate root for convenience
pub use adapters::{BundledSource, ContentSource, DirectoryListing, DirectorySource, HttpSource};
pub use core::{
    parse_outline, ContentMode, ContentResolver, ParsedOutline, ResolveError, ResolverOptions,
    Sources, StructureStrategy,
};
pub use domain::{Diagnostic, Part, Section, WorkshopStructure};
pub use watch::{ContentChange, ContentWatcher, WatcherConfig};
