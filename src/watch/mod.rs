//! Live content watching.
//!
//! In live mode the content directory is edited while the workshop is
//! being served. The watcher maps file events to content keys and drops
//! the matching cache entries:
//!
//! ```text
//! content/*.md ──notify──▶ ContentWatcher ──invalidate──▶ ContentResolver
//!                               │
//!                               └──▶ ContentChange events
//! ```

pub mod watcher;

pub use watcher::{ContentChange, ContentWatcher, WatchHandle, WatcherConfig, WatcherError};
