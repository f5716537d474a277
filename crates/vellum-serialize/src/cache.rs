//! # Schema Cache
//!
//! Memoization of built schema trees keyed by [`SchemaKey`]. The only state
//! shared between resolution calls lives here.
//!
//! Concurrent misses for the same key may both build and both publish. Trees
//! for the same key are interchangeable, so the store only needs atomic
//! get and set; the lock is never held while a tree is being built.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::schema::{SchemaKey, SchemaTree};

/// Store of built schema trees.
pub trait SchemaCache: Send + Sync + fmt::Debug {
    /// Returns true if a tree is stored under `key`.
    fn has(&self, key: &SchemaKey) -> bool;

    /// The tree stored under `key`.
    fn get(&self, key: &SchemaKey) -> Option<Arc<SchemaTree>>;

    /// Store `tree` under `key`, replacing any previous tree.
    fn set(&self, key: SchemaKey, tree: Arc<SchemaTree>);
}

/// Hit and miss counters of a [`MemoryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// In-process cache backed by a hash map under a read-write lock.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<SchemaKey, Arc<SchemaTree>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

static GLOBAL: OnceLock<Arc<MemoryCache>> = OnceLock::new();

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<MemoryCache> {
        GLOBAL.get_or_init(|| Arc::new(MemoryCache::new())).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every stored tree. Counters are kept.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop every tree built for `class`, under any group set.
    pub fn invalidate(&self, class: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.class() != class);
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl SchemaCache for MemoryCache {
    fn has(&self, key: &SchemaKey) -> bool {
        self.entries.read().contains_key(key)
    }

    fn get(&self, key: &SchemaKey) -> Option<Arc<SchemaTree>> {
        let found = self.entries.read().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn set(&self, key: SchemaKey, tree: Arc<SchemaTree>) {
        self.entries.write().insert(key, tree);
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Cache that stores nothing: every build is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl SchemaCache for NoCache {
    fn has(&self, _key: &SchemaKey) -> bool {
        false
    }

    fn get(&self, _key: &SchemaKey) -> Option<Arc<SchemaTree>> {
        None
    }

    fn set(&self, _key: SchemaKey, _tree: Arc<SchemaTree>) {}
}
