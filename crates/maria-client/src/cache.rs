//! Prepared-statement cache with LRU eviction.
//!
//! ## Lifecycle
//!
//! 1. First execution of a SQL text issues `COM_STMT_PREPARE`; the result
//!    is cached keyed by the exact SQL.
//! 2. Each in-flight execute increments the entry's reference count;
//!    completion decrements it.
//! 3. LRU pressure evicts entries. An evicted entry with a zero count is
//!    closed (`COM_STMT_CLOSE`) immediately; one still referenced parks
//!    until its last execute completes, then closes.
//! 4. Capacity 0 disables caching: every statement closes when released.

use lru::LruCache;
use maria_protocol::ColumnDefinition;
use std::num::NonZeroUsize;

/// Outcome of a `COM_STMT_PREPARE`, cached per connection.
#[derive(Debug, Clone)]
pub struct ServerPrepareResult {
    /// Server-assigned statement id.
    pub statement_id: u32,
    /// Parameter definitions, one per placeholder.
    pub parameters: Vec<ColumnDefinition>,
    /// Result column definitions.
    pub columns: Vec<ColumnDefinition>,
}

impl ServerPrepareResult {
    /// Number of parameters the statement declares.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.parameters.len()
    }
}

#[derive(Debug)]
struct Entry {
    prepare: ServerPrepareResult,
    ref_count: usize,
}

/// Per-connection prepared-statement cache.
///
/// Mutated only by the task owning the connection; no cross-connection
/// sharing.
#[derive(Debug)]
pub struct PrepareCache {
    entries: Option<LruCache<String, Entry>>,
    // Evicted while still executing; closed once released.
    detached: Vec<(u32, usize)>,
}

impl PrepareCache {
    /// Create a cache with the given capacity (0 disables caching).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            detached: Vec::new(),
        }
    }

    /// Whether caching is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Look up by exact SQL text. A hit touches the LRU order and
    /// increments the reference count.
    pub fn get(&mut self, sql: &str) -> Option<ServerPrepareResult> {
        let entry = self.entries.as_mut()?.get_mut(sql)?;
        entry.ref_count += 1;
        Some(entry.prepare.clone())
    }

    /// Install a fresh prepare result with one reference held.
    ///
    /// Returns statement ids that must be closed on the wire now
    /// (evicted entries nobody references).
    pub fn insert(&mut self, sql: String, prepare: ServerPrepareResult) -> Vec<u32> {
        let Some(entries) = self.entries.as_mut() else {
            // Caching disabled: the caller closes on release.
            self.detached.push((prepare.statement_id, 1));
            return Vec::new();
        };
        let mut to_close = Vec::new();
        if entries.len() == usize::from(entries.cap()) && !entries.contains(&sql) {
            if let Some((_, evicted)) = entries.pop_lru() {
                if evicted.ref_count == 0 {
                    to_close.push(evicted.prepare.statement_id);
                } else {
                    self.detached
                        .push((evicted.prepare.statement_id, evicted.ref_count));
                }
            }
        }
        entries.put(
            sql,
            Entry {
                prepare,
                ref_count: 1,
            },
        );
        to_close
    }

    /// Release one reference on a statement after its execute completes.
    ///
    /// Returns the statement id when it must now be closed on the wire
    /// (detached entry, or caching disabled).
    pub fn release(&mut self, statement_id: u32) -> Option<u32> {
        if let Some(entries) = self.entries.as_mut() {
            for (_, entry) in entries.iter_mut() {
                if entry.prepare.statement_id == statement_id {
                    entry.ref_count = entry.ref_count.saturating_sub(1);
                    return None;
                }
            }
        }
        if let Some(pos) = self
            .detached
            .iter()
            .position(|(id, _)| *id == statement_id)
        {
            self.detached[pos].1 = self.detached[pos].1.saturating_sub(1);
            if self.detached[pos].1 == 0 {
                self.detached.remove(pos);
                return Some(statement_id);
            }
        }
        None
    }

    /// Drop everything (connection reset); returns ids to close.
    pub fn clear(&mut self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.detached.drain(..).map(|(id, _)| id).collect();
        if let Some(entries) = self.entries.as_mut() {
            while let Some((_, entry)) = entries.pop_lru() {
                ids.push(entry.prepare.statement_id);
            }
        }
        ids
    }

    /// Number of cached statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    /// Whether the cache holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn prepare(id: u32) -> ServerPrepareResult {
        ServerPrepareResult {
            statement_id: id,
            parameters: Vec::new(),
            columns: Vec::new(),
        }
    }

    #[test]
    fn test_hit_increments_and_release_decrements() {
        let mut cache = PrepareCache::new(4);
        assert!(cache.insert("SELECT 1".into(), prepare(1)).is_empty());
        assert!(cache.get("SELECT 1").is_some());
        // Two references held; releases keep the entry cached.
        assert!(cache.release(1).is_none());
        assert!(cache.release(1).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_closes_unreferenced() {
        let mut cache = PrepareCache::new(1);
        assert!(cache.insert("a".into(), prepare(1)).is_empty());
        assert!(cache.release(1).is_none());
        // "a" has no references; inserting "b" evicts and closes it.
        let closed = cache.insert("b".into(), prepare(2));
        assert_eq!(closed, vec![1]);
    }

    #[test]
    fn test_eviction_defers_while_referenced() {
        let mut cache = PrepareCache::new(1);
        assert!(cache.insert("a".into(), prepare(1)).is_empty());
        // Still referenced: eviction must not close it yet.
        let closed = cache.insert("b".into(), prepare(2));
        assert!(closed.is_empty());
        // The deferred close fires when the last reference drops.
        assert_eq!(cache.release(1), Some(1));
    }

    #[test]
    fn test_disabled_cache_closes_on_release() {
        let mut cache = PrepareCache::new(0);
        assert!(!cache.is_enabled());
        assert!(cache.insert("a".into(), prepare(7)).is_empty());
        assert!(cache.get("a").is_none());
        assert_eq!(cache.release(7), Some(7));
    }

    #[test]
    fn test_clear_returns_all_ids() {
        let mut cache = PrepareCache::new(4);
        cache.insert("a".into(), prepare(1));
        cache.insert("b".into(), prepare(2));
        let mut ids = cache.clear();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(cache.is_empty());
    }
}
