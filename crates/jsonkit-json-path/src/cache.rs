//! Bounded cache of compiled paths keyed by expression text.

use std::sync::Arc;

use dashmap::DashMap;
use jsonkit_node::Result;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::JsonPath;

/// Capacity of the process-wide cache behind [`JsonPath::cached`].
pub const PATH_CACHE_CAPACITY: usize = 1024;

pub(crate) static PATH_CACHE: Lazy<PathCache> =
    Lazy::new(|| PathCache::with_capacity(PATH_CACHE_CAPACITY));

/// Thread-safe map from expression text to its compiled form.
///
/// When full, one arbitrary entry is evicted per insertion. Compilation is
/// deterministic, so two threads racing on the same miss store equal values.
pub struct PathCache {
    entries: DashMap<String, Arc<JsonPath>>,
    capacity: usize,
}

impl PathCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_compile(&self, expr: &str) -> Result<Arc<JsonPath>> {
        if let Some(hit) = self.entries.get(expr) {
            return Ok(Arc::clone(hit.value()));
        }
        let compiled = Arc::new(JsonPath::compile(expr)?);
        if self.entries.len() >= self.capacity {
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
                debug!(evicted = %victim, "path cache full");
            }
        }
        self.entries.insert(expr.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::with_capacity(PATH_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_share_the_compiled_path() {
        let cache = PathCache::with_capacity(4);
        let a = cache.get_or_compile("$.a.b").unwrap();
        let b = cache.get_or_compile("$.a.b").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = PathCache::with_capacity(4);
        assert!(cache.get_or_compile("$[").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn stays_within_capacity() {
        let cache = PathCache::with_capacity(2);
        for expr in ["$.a", "$.b", "$.c", "$.d"] {
            cache.get_or_compile(expr).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get_or_compile("$.d").is_ok());
    }

    #[test]
    fn global_cache() {
        let a = JsonPath::cached("/x/0").unwrap();
        let b = JsonPath::cached("/x/0").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
