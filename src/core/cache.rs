//! Expiring in-memory cache shared by all resolver calls.
//!
//! Entries are keyed by content key, or by [`STRUCTURE_KEY`] for the parsed
//! outline. Writes go through a [`Ticket`] taken before the fetch started:
//! if the key was invalidated (or the whole cache cleared) while the fetch
//! was in flight, the write is dropped so a stale value never lands after
//! an invalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::outline::ParsedOutline;

/// Cache key used for the parsed outline
pub const STRUCTURE_KEY: &str = "structure";

/// Default expiry window (5 minutes)
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// A cached value
#[derive(Debug, Clone)]
pub enum CachedValue {
    Outline(Arc<ParsedOutline>),
    Content(Arc<str>),
}

/// One cache entry
#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    /// Monotonic time of the fetch, used for expiry
    loaded: Instant,
    /// Wall-clock time of the fetch, for reporting
    fetched_at: DateTime<Utc>,
}

/// Summary of an entry, for status output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
    pub fresh: bool,
}

/// Proof of when a fetch started, required to write its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    epoch: u64,
    generation: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Bumped by `invalidate(key)`
    generations: HashMap<String, u64>,
    /// Bumped by `clear()`
    epoch: u64,
}

impl CacheState {
    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

/// Expiring content cache
#[derive(Debug)]
pub struct ContentCache {
    expiry: Duration,
    state: RwLock<CacheState>,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY)
    }
}

impl ContentCache {
    /// Create a cache with the given expiry window
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Get the expiry window
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Get a value if present and younger than the expiry window
    pub async fn get_fresh(&self, key: &str) -> Option<CachedValue> {
        let state = self.state.read().await;
        let entry = state.entries.get(key)?;

        if entry.loaded.elapsed() < self.expiry {
            Some(entry.value.clone())
        } else {
            debug!(key, "Cache entry expired");
            None
        }
    }

    /// Take a ticket before fetching `key`
    pub async fn ticket(&self, key: &str) -> Ticket {
        let state = self.state.read().await;
        Ticket {
            key: key.to_string(),
            epoch: state.epoch,
            generation: state.generation(key),
        }
    }

    /// Store a fetched value
    ///
    /// Returns `false` (and stores nothing) when the key was invalidated
    /// after the ticket was taken.
    pub async fn store(&self, ticket: Ticket, value: CachedValue) -> bool {
        let mut state = self.state.write().await;

        if ticket.epoch != state.epoch || ticket.generation != state.generation(&ticket.key) {
            return false;
        }

        state.entries.insert(
            ticket.key,
            CacheEntry {
                value,
                loaded: Instant::now(),
                fetched_at: Utc::now(),
            },
        );
        true
    }

    /// Remove one entry and supersede fetches in flight for it
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut state = self.state.write().await;
        *state.generations.entry(key.to_string()).or_insert(0) += 1;
        state.entries.remove(key).is_some()
    }

    /// Remove every entry and supersede every fetch in flight
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.generations.clear();
        state.epoch += 1;
    }

    /// Check if a key has an entry, fresh or not
    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.entries.contains_key(key)
    }

    /// Get the number of entries, fresh or not
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Describe every entry, sorted by key
    pub async fn entries(&self) -> Vec<EntryInfo> {
        let state = self.state.read().await;
        let mut entries: Vec<_> = state
            .entries
            .iter()
            .map(|(key, entry)| EntryInfo {
                key: key.clone(),
                fetched_at: entry.fetched_at,
                fresh: entry.loaded.elapsed() < self.expiry,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}
