//! Bounded cache of compiled patterns.
//!
//! # Design Decisions
//! - First writer wins: once full, nothing is evicted
//! - Overflowing patterns are compiled on every call and never stored
//! - One compiler per route tree; no process-wide cache

use dashmap::DashMap;
use std::sync::Arc;

use crate::observability::metrics;
use crate::pattern::compiler::CompiledPattern;

/// Default number of cached patterns per route tree.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: String,
    case_sensitive: bool,
}

/// Compiles patterns, memoising up to `capacity` distinct ones.
#[derive(Debug)]
pub struct PatternCompiler {
    cache: DashMap<CacheKey, Arc<CompiledPattern>>,
    capacity: usize,
}

impl PatternCompiler {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: DashMap::new(),
            capacity,
        }
    }

    /// Compile `pattern`, returning the cached matcher when present.
    pub fn compile(&self, pattern: &str, case_sensitive: bool) -> Arc<CompiledPattern> {
        let key = CacheKey {
            pattern: pattern.to_string(),
            case_sensitive,
        };

        if let Some(hit) = self.cache.get(&key) {
            return hit.value().clone();
        }

        let compiled = Arc::new(CompiledPattern::compile(pattern, case_sensitive));

        if self.cache.len() >= self.capacity {
            tracing::debug!(pattern = %pattern, capacity = self.capacity, "Pattern cache full; compiled without caching");
            metrics::record_pattern_cache_overflow();
            return compiled;
        }

        let stored = self.cache.entry(key).or_insert(compiled).value().clone();
        metrics::record_pattern_cache_size(self.cache.len());
        stored
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
