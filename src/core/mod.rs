//! Core content pipeline.
//!
//! This module contains:
//! - Outline: Tolerant outline document parser
//! - Cache: Expiring cache with invalidation tickets
//! - Resolver: Mode-aware content and structure resolution
//! - Export: Whole-workshop markdown export

pub mod cache;
pub mod export;
pub mod outline;
pub mod resolver;

// Re-export commonly used types
pub use cache::{ContentCache, EntryInfo, DEFAULT_EXPIRY, STRUCTURE_KEY};
pub use export::export_workshop;
pub use outline::{parse_outline, OutlineError, ParsedOutline};
pub use resolver::{
    ContentMode, ContentResolver, ResolveError, ResolverOptions, Sources, StructureStrategy,
    DEFAULT_OUTLINE_KEY,
};
