use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub inserted_at: DateTime<Utc>,
}

/// The parts of an inbound request that cache keys are derived from.
#[derive(Debug, Clone, Copy)]
pub struct RequestDescriptor<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub original_url: &'a str,
    pub query: &'a HashMap<String, String>,
}

/// Derive a cache key for a request.
///
/// With `fields`, the named query parameters (in the given order, absent ones
/// omitted) are JSON-encoded; otherwise method and full URL are. The JSON is
/// SHA-1 hashed and prefixed with the route path.
pub fn key_for_request(request: &RequestDescriptor<'_>, fields: Option<&[&str]>) -> String {
    let payload = match fields {
        Some(fields) => {
            let mut selected = Map::new();
            for field in fields {
                if let Some(value) = request.query.get(*field) {
                    selected.insert((*field).to_string(), Value::String(value.clone()));
                }
            }
            Value::Object(selected)
        }
        None => serde_json::json!({
            "method": request.method,
            "originalUrl": request.original_url,
        }),
    };

    let digest = Sha1::digest(payload.to_string().as_bytes());
    format!("{}:{}", request.path, hex::encode(digest))
}

/// Time-bounded response store shared by all request handlers.
///
/// moka bounds memory (`max_entries`) and evicts on its own TTL; `get` also
/// checks age against the injected clock so an entry never outlives `ttl`
/// even before the store gets around to evicting it.
#[derive(Clone)]
pub struct ResponseCache {
    store: Cache<String, CacheEntry>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let store = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            store,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.store.get(key).await?;
        if self.clock.now() - entry.inserted_at >= self.ttl {
            self.store.invalidate(key).await;
            return None;
        }
        Some(entry.value)
    }

    pub async fn set(&self, key: &str, value: Value) {
        let entry = CacheEntry {
            key: key.to_string(),
            value,
            inserted_at: self.clock.now(),
        };
        self.store.insert(entry.key.clone(), entry).await;
    }

    /// Serve `key` from the cache, or run `fetch` and store its result.
    ///
    /// `refresh` skips the read but still writes the fresh value through.
    /// Failed fetches are never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, refresh: bool, fetch: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if refresh {
            tracing::debug!(key, "Cache bypassed by refresh request");
        } else if let Some(hit) = self.get(key).await {
            tracing::debug!(key, "Cache hit");
            return Ok(hit);
        } else {
            tracing::debug!(key, "Cache miss");
        }

        let value = fetch().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }

    /// Flush moka's pending maintenance, evicting expired entries.
    pub async fn sweep(&self) {
        self.store.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }

    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                cache.sweep().await;
                tracing::debug!(entries = cache.entry_count(), "Cache sweep complete");
            }
        })
    }
}
