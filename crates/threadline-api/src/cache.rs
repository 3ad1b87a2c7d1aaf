use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;

use threadline_persist::PathRevalidator;

use crate::config::CacheConfig;

pub const DEFAULT_MAX_ENTRIES: u64 = 1_000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Rendered GET responses keyed by request path and query.
///
/// Writes invalidate by path: dropping `/threads` also drops
/// `/threads?page=2` and `/threads/<id>`.
pub struct ResponseCache {
    enabled: bool,
    entries: Cache<String, Value>,
    generation: AtomicU64,
}

impl ResponseCache {
    pub fn new(enabled: bool) -> Self {
        Self::with_limits(enabled, DEFAULT_MAX_ENTRIES, DEFAULT_TTL)
    }

    pub fn with_limits(enabled: bool, max_entries: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            enabled,
            entries,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_limits(
            config.enabled,
            config.max_entries,
            Duration::from_secs(config.ttl_secs),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current invalidation generation. Capture it before computing a value
    /// and hand it back to [`ResponseCache::put`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key).await
    }

    /// Store `value` unless an invalidation ran after `generation` was read.
    /// Returns whether the entry was kept.
    pub async fn put(&self, key: impl Into<String>, value: Value, generation: u64) -> bool {
        if !self.enabled || self.generation() != generation {
            return false;
        }

        let key = key.into();
        self.entries.insert(key.clone(), value).await;

        // An invalidation that bumped the counter before its sweep may have
        // missed the insert above.
        if self.generation() != generation {
            self.entries.invalidate(&key).await;
            return false;
        }
        true
    }

    pub async fn len(&self) -> usize {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    /// Drop every entry at or below `path`; returns how many were dropped.
    pub async fn invalidate(&self, path: &str) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| is_under(key, path))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in &stale {
            self.entries.invalidate(key).await;
        }
        stale.len()
    }
}

/// Cache key for a thread listing. Only the fields the handler reads take
/// part, so unrelated query parameters share one entry.
pub fn page_key(path: &str, page: i64, page_size: i64) -> String {
    format!("{}?page={}&page_size={}", path, page, page_size)
}

fn is_under(key: &str, path: &str) -> bool {
    let key_path = key.split('?').next().unwrap_or(key);
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return true;
    }
    key_path == path
        || key_path
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[async_trait]
impl PathRevalidator for ResponseCache {
    async fn revalidate_path(&self, path: &str) {
        let dropped = self.invalidate(path).await;
        tracing::debug!(path = %path, dropped, "Revalidated cached responses");
    }
}
