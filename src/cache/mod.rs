//! Regeneration cache for rendered pages
//!
//! Entries stay fresh for a fixed time. After that they are still served
//! while one background regeneration per key replaces them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Result of looking up a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Generated within the revalidation window
    Fresh(T),
    /// Older than the window; should be regenerated
    Stale(T),
    /// Never generated
    Missing,
}

#[derive(Debug)]
struct Generated<T> {
    value: T,
    at: Instant,
    ttl: Duration,
    /// Store order, for eviction
    seq: u64,
}

#[derive(Debug)]
struct Entry<T> {
    value: Option<Generated<T>>,
    building: bool,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            value: None,
            building: false,
        }
    }
}

/// Time-revalidated store of generated values, keyed by path
///
/// Holds at most `capacity` generated values. Storing a new key into a full
/// cache evicts the oldest value that is not being regenerated.
#[derive(Debug)]
pub struct PageCache<T> {
    revalidate: Duration,
    capacity: usize,
    stored: AtomicU64,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Clone> PageCache<T> {
    /// Create a cache whose entries go stale after `revalidate`
    pub fn new(revalidate: Duration) -> Self {
        Self::with_capacity(revalidate, usize::MAX)
    }

    /// Create a cache holding at most `capacity` values
    pub fn with_capacity(revalidate: Duration, capacity: usize) -> Self {
        Self {
            revalidate,
            capacity: capacity.max(1),
            stored: AtomicU64::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key
    pub async fn lookup(&self, key: &str) -> Lookup<T> {
        let entries = self.entries.lock().await;
        match entries.get(key).and_then(|e| e.value.as_ref()) {
            Some(g) if g.at.elapsed() < g.ttl => Lookup::Fresh(g.value.clone()),
            Some(g) => Lookup::Stale(g.value.clone()),
            None => Lookup::Missing,
        }
    }

    /// Mark a key as being regenerated.
    ///
    /// Returns false when another regeneration already holds the key; the
    /// caller must not start a second one.
    pub async fn claim(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_default();
        if entry.building {
            return false;
        }
        entry.building = true;
        true
    }

    /// Store a generated value and release the claim
    pub async fn store(&self, key: &str, value: T) {
        self.store_for(key, value, self.revalidate).await;
    }

    /// Like [`store`](Self::store), with its own freshness window
    pub async fn store_for(&self, key: &str, value: T, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        let is_new = entries.get(key).map_or(true, |e| e.value.is_none());
        if is_new {
            evict_for_one(&mut entries, self.capacity);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Some(Generated {
                    value,
                    at: Instant::now(),
                    ttl,
                    seq: self.stored.fetch_add(1, Ordering::Relaxed),
                }),
                building: false,
            },
        );
    }

    /// Release a claim without storing, keeping any previous value
    pub async fn release(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.building = false;
            if entry.value.is_none() {
                entries.remove(key);
            }
        }
    }

    /// Drop values that went stale more than `grace` ago and nobody regenerated.
    /// Returns how many were dropped.
    pub async fn sweep(&self, grace: Duration) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| match &e.value {
            Some(g) => e.building || g.at.elapsed() < g.ttl.saturating_add(grace),
            None => e.building,
        });
        before - entries.len()
    }

    /// Number of generated entries
    pub async fn len(&self) -> usize {
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.value.is_some())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Make room for one more value, dropping the oldest idle ones
fn evict_for_one<T>(entries: &mut HashMap<String, Entry<T>>, capacity: usize) {
    loop {
        let generated = entries.values().filter(|e| e.value.is_some()).count();
        if generated < capacity {
            return;
        }
        let oldest = entries
            .iter()
            .filter(|(_, e)| !e.building)
            .filter_map(|(k, e)| e.value.as_ref().map(|g| (k, g.seq)))
            .min_by_key(|(_, seq)| *seq)
            .map(|(k, _)| k.clone());
        match oldest {
            Some(key) => {
                tracing::debug!("Evicting cached page {}", key);
                entries.remove(&key);
            }
            None => return,
        }
    }
}
