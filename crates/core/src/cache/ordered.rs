//! Insertion-ordered bounded store of enriched result lists.

use std::collections::{HashMap, VecDeque};

use crate::SearchResult;

/// Bounded query → results map with FIFO eviction.
///
/// Re-inserting an existing key replaces its value but keeps its original
/// position in the eviction order.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: HashMap<String, Vec<SearchResult>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ResultCache {
    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::new(), order: VecDeque::new(), capacity }
    }

    /// Look up the results stored for an exact query string.
    pub fn get(&self, query: &str) -> Option<&Vec<SearchResult>> {
        self.entries.get(query)
    }

    /// Store results for a query, evicting the oldest-inserted entry if the
    /// cache grows past capacity.
    ///
    /// Returns the evicted query, if any.
    pub fn put(&mut self, query: impl Into<String>, results: Vec<SearchResult>) -> Option<String> {
        let query = query.into();

        if let Some(existing) = self.entries.get_mut(&query) {
            *existing = results;
            return None;
        }

        self.order.push_back(query.clone());
        self.entries.insert(query, results);

        if self.entries.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            self.entries.remove(&oldest);
            tracing::debug!(query = %oldest, capacity = self.capacity, "evicted oldest cache entry");
            return Some(oldest);
        }

        None
    }

    /// Drop a single entry. Returns true if it was present.
    pub fn invalidate(&mut self, query: &str) -> bool {
        if self.entries.remove(query).is_some() {
            self.order.retain(|q| q != query);
            true
        } else {
            false
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached queries from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(tag: &str) -> Vec<SearchResult> {
        vec![SearchResult::new(Some(tag.to_string()), format!("https://{tag}.example"), None)]
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = ResultCache::new(2);
        cache.put("rust", hits("rust"));

        let got = cache.get("rust").unwrap();
        assert_eq!(got[0].title, "rust");
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = ResultCache::new(3);
        for i in 0..10 {
            cache.put(format!("q{i}"), hits("x"));
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["q7", "q8", "q9"]);
    }

    #[test]
    fn test_evicts_exactly_oldest_inserted() {
        let mut cache = ResultCache::new(2);
        assert_eq!(cache.put("a", hits("a")), None);
        assert_eq!(cache.put("b", hits("b")), None);
        assert_eq!(cache.put("c", hits("c")), Some("a".to_string()));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_reads_do_not_refresh_position() {
        let mut cache = ResultCache::new(2);
        cache.put("a", hits("a"));
        cache.put("b", hits("b"));

        for _ in 0..5 {
            assert!(cache.get("a").is_some());
        }

        assert_eq!(cache.put("c", hits("c")), Some("a".to_string()));
    }

    #[test]
    fn test_reinsert_keeps_position_and_updates_value() {
        let mut cache = ResultCache::new(2);
        cache.put("a", hits("a"));
        cache.put("b", hits("b"));
        assert_eq!(cache.put("a", hits("a2")), None);

        assert_eq!(cache.get("a").unwrap()[0].title, "a2");
        assert_eq!(cache.put("c", hits("c")), Some("a".to_string()));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut cache = ResultCache::new(4);
        cache.put("Rust", hits("upper"));
        cache.put("rust", hits("lower"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("Rust").unwrap()[0].title, "upper");
        assert!(cache.get(" rust ").is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = ResultCache::new(3);
        cache.put("a", hits("a"));
        cache.put("b", hits("b"));

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b"]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = ResultCache::new(0);
        assert_eq!(cache.put("a", hits("a")), Some("a".to_string()));
        assert!(cache.is_empty());
    }
}
