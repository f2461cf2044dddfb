//! Domain types for workshop content.
//!
//! This module contains the core data structures:
//! - Structure: Workshop, parts and sections
//! - Diagnostic: Findings absorbed while parsing or discovering

pub mod diagnostic;
pub mod structure;

// Re-export commonly used types
pub use diagnostic::Diagnostic;
pub use structure::{Adjacent, Part, Section, SectionRef, WorkshopStructure};
