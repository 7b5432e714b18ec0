use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::MxCacheEntry;

/// Shared TTL cache of MX answers, keyed by lower-cased domain.
///
/// Lookups take the read lock only; expired entries are evicted lazily on the
/// lookup that notices them, and every insert sweeps whatever else has
/// expired. Inserts swap in a fresh `Arc`, so readers holding an older entry
/// are never affected.
#[derive(Debug)]
pub struct MxCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Arc<MxCacheEntry>>>,
}

impl MxCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, domain: &str) -> Option<Arc<MxCacheEntry>> {
        self.get_at(domain, Instant::now())
    }

    pub fn get_at(&self, domain: &str, now: Instant) -> Option<Arc<MxCacheEntry>> {
        let key = domain.to_ascii_lowercase();
        let entry = self.entries.read().get(&key).cloned()?;
        if self.is_fresh(&entry, now) {
            return Some(entry);
        }

        let mut entries = self.entries.write();
        // another worker may have refreshed the slot in the meantime
        if entries
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &entry))
        {
            entries.remove(&key);
        }
        None
    }

    pub fn insert(&self, domain: &str, hosts: Vec<String>) -> Arc<MxCacheEntry> {
        self.insert_at(domain, hosts, Instant::now())
    }

    pub fn insert_at(&self, domain: &str, hosts: Vec<String>, now: Instant) -> Arc<MxCacheEntry> {
        let key = domain.to_ascii_lowercase();
        let entry = Arc::new(MxCacheEntry::new(key.clone(), hosts, now));
        let ttl = self.ttl;
        let mut entries = self.entries.write();
        entries.retain(|_, held| now.saturating_duration_since(held.inserted_at) < ttl);
        entries.insert(key, Arc::clone(&entry));
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &MxCacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }
}
