use std::time::Duration;

use moka::sync::Cache;

/// Upper bound on cached responses per client.
const MAX_ENTRIES: u64 = 1_000;

/// Top-level routes that address child records of another collection.
/// A mutation on the left also invalidates the lists on the right.
const PARENT_COLLECTIONS: &[(&str, &str)] = &[
    ("/api/claim-comments", "/api/claims"),
    ("/api/attachments", "/api/claims"),
    ("/api/station-entries", "/api/stations"),
    ("/api/station-kpis", "/api/stations"),
];

/// Response cache keyed by request path (including the query string).
///
/// Entries expire after the stale time. Mutations invalidate whole
/// collections with [`QueryCache::invalidate_prefix`].
pub struct QueryCache {
    inner: Cache<String, serde_json::Value>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(stale_time)
                .support_invalidation_closures()
                .build(),
        }
    }

    /// The cached value if it is still fresh.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        self.inner.insert(key.to_string(), value);
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// Drop `prefix` itself and every key below it (`prefix/...`, `prefix?...`).
    /// Returns how many live entries matched.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let prefix = prefix.trim_end_matches('/').to_string();
        let matched = self.inner.iter().filter(|(key, _)| under(key, &prefix)).count();
        if matched == 0 {
            return 0;
        }
        let owned = prefix.clone();
        if let Err(e) = self.inner.invalidate_entries_if(move |key, _| under(key, &owned)) {
            tracing::warn!(prefix = %prefix, error = %e, "predicate invalidation failed, dropping keys one by one");
            let keys: Vec<_> = self
                .inner
                .iter()
                .filter(|(key, _)| under(key, &prefix))
                .map(|(key, _)| key)
                .collect();
            for key in keys {
                self.inner.invalidate(key.as_str());
            }
        }
        matched
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Live entries after pending expirations and invalidations are applied.
    pub fn len(&self) -> usize {
        self.inner.run_pending_tasks();
        self.inner.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn under(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// The collection a request path belongs to: `/api/claims/7/comments` →
/// `/api/claims`.
pub fn collection_of(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).take(2).collect();
    format!("/{}", segments.join("/"))
}

/// Every collection whose cached lists a mutation on `path` can change:
/// its own collection plus the parent of child-record routes such as
/// `/api/claim-comments/{id}`.
pub fn affected_collections(path: &str) -> Vec<String> {
    let own = collection_of(path);
    let parent = PARENT_COLLECTIONS
        .iter()
        .find(|(child, _)| *child == own)
        .map(|(_, parent)| parent.to_string());
    std::iter::once(own).chain(parent).collect()
}
