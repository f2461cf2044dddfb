//! Folder-based workshop layout.
//!
//! When a workshop has no outline document, its structure is discovered
//! from ordered folders and lesson files.
//!
//! # Layout
//!
//! ```text
//! content/
//! ├── README.md                 # Title and description
//! └── NN-part-title/
//!     └── NN-section-title.md   # One lesson
//! ```

pub mod discovery;
pub mod naming;

pub use discovery::{discover_structure, DiscoveryOptions};
pub use naming::{parse_ordered_name, validate_listing, NamingIssue, OrderedName};
