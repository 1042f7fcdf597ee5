//! Content-addressed cache for reshaped tables and filter results.
//!
//! A table is keyed by the SHA-256 of the file bytes together with the
//! reshape settings, so editing the file yields a new key. When a path is
//! re-read with different bytes, the old table and every query result derived
//! from it are evicted. Both tables and query results are bounded by the same
//! capacity and evicted oldest first.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::model::{DirectionPolicy, LongTable, Observation};
use crate::query::{DirectionCompareFilter, LineCompareFilter, SingleFilter};
use crate::reshape::IdColumns;

/// Identity of one reshaped table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn new(bytes: &[u8], columns: &IdColumns, policy: &DirectionPolicy) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);

        for label in [
            &columns.day_type,
            &columns.line,
            &columns.station_id,
            &columns.station_name,
            &columns.direction,
        ] {
            hasher.update([0u8]);
            hasher.update(label.as_bytes());
        }

        match policy {
            DirectionPolicy::KeepAll => hasher.update(b"\x01keep_all"),
            DirectionPolicy::PrimaryOnly { loop_directions } => {
                hasher.update(b"\x01primary_only");
                for d in loop_directions {
                    hasher.update([0u8]);
                    hasher.update(d.as_bytes());
                }
            }
        }

        ContentKey(hasher.finalize().into())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({self})")
    }
}

/// Full parameter tuple of a cached filter call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Single(ContentKey, SingleFilter),
    DirectionCompare(ContentKey, DirectionCompareFilter),
    LineCompare(ContentKey, LineCompareFilter),
}

impl QueryKey {
    fn content(&self) -> ContentKey {
        match self {
            QueryKey::Single(k, _) | QueryKey::DirectionCompare(k, _) | QueryKey::LineCompare(k, _) => *k,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub table_hits: u64,
    pub table_misses: u64,
    pub query_hits: u64,
    pub query_misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<ContentKey, Arc<LongTable>>,
    table_order: VecDeque<ContentKey>,
    paths: HashMap<PathBuf, ContentKey>,
    queries: HashMap<QueryKey, Arc<Vec<Observation>>>,
    query_order: VecDeque<QueryKey>,
    /// Upper bound on cached tables and on cached query results; `None` is
    /// unbounded. The table just built is always kept.
    capacity: Option<usize>,
    stats: CacheStats,
}

impl TableCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Returns the table for `key`, building it on a miss.
    ///
    /// If `path` was last seen with different content, that content's table
    /// and query results are dropped first (unless another path still uses it).
    pub fn table_for(
        &mut self,
        path: &Path,
        key: ContentKey,
        build: impl FnOnce() -> Result<LongTable>,
    ) -> Result<Arc<LongTable>> {
        let previous = self.paths.insert(path.to_path_buf(), key);
        if let Some(prev) = previous.filter(|prev| *prev != key) {
            if !self.paths.values().any(|k| *k == prev) {
                debug!(path = %path.display(), old = %prev, new = %key, "input changed, invalidating");
                self.invalidate(prev);
            }
        }

        if let Some(table) = self.tables.get(&key) {
            self.stats.table_hits += 1;
            debug!(key = %key, "table cache hit");
            return Ok(Arc::clone(table));
        }

        self.stats.table_misses += 1;
        debug!(key = %key, "table cache miss");
        let table = Arc::new(build()?);

        if let Some(capacity) = self.capacity {
            while self.tables.len() >= capacity.max(1) {
                let Some(oldest) = self.table_order.pop_front() else {
                    break;
                };
                debug!(key = %oldest, "table capacity reached, evicting");
                self.invalidate(oldest);
            }
        }

        self.table_order.push_back(key);
        self.tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Returns the cached result for `key`, computing and storing it on a miss.
    pub fn query(
        &mut self,
        key: QueryKey,
        compute: impl FnOnce() -> Vec<Observation>,
    ) -> Arc<Vec<Observation>> {
        if let Some(rows) = self.queries.get(&key) {
            self.stats.query_hits += 1;
            return Arc::clone(rows);
        }

        self.stats.query_misses += 1;
        let rows = Arc::new(compute());

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return rows;
            }
            while self.queries.len() >= capacity {
                let Some(oldest) = self.query_order.pop_front() else {
                    break;
                };
                self.queries.remove(&oldest);
                self.stats.evictions += 1;
            }
        }

        self.query_order.push_back(key.clone());
        self.queries.insert(key, Arc::clone(&rows));
        rows
    }

    /// Drops a table and every query result computed from it.
    pub fn invalidate(&mut self, content: ContentKey) {
        if self.tables.remove(&content).is_some() {
            self.stats.evictions += 1;
        }
        self.table_order.retain(|k| *k != content);
        self.paths.retain(|_, k| *k != content);
        let before = self.queries.len();
        self.queries.retain(|k, _| k.content() != content);
        self.query_order.retain(|k| k.content() != content);
        self.stats.evictions += (before - self.queries.len()) as u64;
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.table_order.clear();
        self.paths.clear();
        self.queries.clear();
        self.query_order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn cached_queries(&self) -> usize {
        self.queries.len()
    }
}
