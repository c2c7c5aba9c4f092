// src/api/cache.rs
//! Response caches for remote API calls.
//!
//! Raw response bodies are cached, never decoded objects. A cache hit is
//! decoded through the same envelope path as a live response, so the two
//! can never disagree. The cache belongs to the host: several clients may
//! share one, and entries expire only by the backend's own policy.

use super::commands::{Command, RequestParams};
use crate::constants::{CACHE_DIR_NAME, CACHE_KEY_PREFIX};
use crate::error::AppError;
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Storage for raw response bodies.
///
/// Operations are best-effort: a broken cache must never prevent a fresh
/// API call.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, body: &str);
}

/// Derives the cache key for one request.
///
/// Parameters are hashed in name order, so two requests with the same
/// arguments share an entry however the arguments were assembled.
pub fn cache_key(base_url: &str, command: Command, params: &RequestParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(base_url.as_bytes());
    hasher.update(command.as_str().as_bytes());
    hasher.update(params.form_encoded().as_bytes());
    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Null cache
// ---------------------------------------------------------------------------

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl ResponseCache for NullCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _body: &str) {}
}

// ---------------------------------------------------------------------------
// Memory cache
// ---------------------------------------------------------------------------

/// Bounded in-process LRU with a per-entry lifetime.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, (Instant, String)>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some((stored_at, body)) if stored_at.elapsed() <= self.ttl => {
                return Some(body.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn set(&self, key: &str, body: &str) {
        self.entries
            .lock()
            .put(key.to_string(), (Instant::now(), body.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Disk cache
// ---------------------------------------------------------------------------

/// TTL-based file cache for raw API response bodies.
pub struct DiskCache {
    cache_dir: PathBuf,
    ttl_secs: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    data: String,
    cached_at: i64,
}

impl DiskCache {
    /// Opens (creating if needed) a cache in `cache_dir`.
    ///
    /// On open, expired entries are purged to prevent unbounded disk growth.
    pub fn open(cache_dir: impl Into<PathBuf>, ttl_secs: u64) -> Result<Self, AppError> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir).map_err(|source| AppError::CacheUnavailable {
            path: cache_dir.clone(),
            source,
        })?;
        let cache = Self {
            cache_dir,
            ttl_secs,
        };
        cache.purge_expired();
        Ok(cache)
    }

    /// `$XDG_CACHE_HOME/cms-migrate-source` (or `~/.cache/cms-migrate-source`).
    pub fn default_cache_dir() -> PathBuf {
        std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".cache")
            })
            .join(CACHE_DIR_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn is_expired(&self, cached_at: i64, now: i64) -> bool {
        u64::try_from(now.saturating_sub(cached_at)).unwrap_or(0) > self.ttl_secs
    }

    /// Removes all expired cache entries from disk.
    fn purge_expired(&self) {
        let now = chrono::Utc::now().timestamp();
        let Ok(dir) = std::fs::read_dir(&self.cache_dir) else {
            return;
        };

        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            if let Ok(cached) = serde_json::from_str::<CacheEntry>(&content) {
                if self.is_expired(cached.cached_at, now) {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", name))
    }
}

impl ResponseCache for DiskCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.key_to_path(key);
        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        if self.is_expired(entry.cached_at, chrono::Utc::now().timestamp()) {
            let _ = std::fs::remove_file(&path);
            return None;
        }
        Some(entry.data)
    }

    fn set(&self, key: &str, body: &str) {
        let entry = CacheEntry {
            data: body.to_string(),
            cached_at: chrono::Utc::now().timestamp(),
        };
        if let Ok(json) = serde_json::to_string(&entry) {
            if let Err(e) = std::fs::write(self.key_to_path(key), json) {
                log::debug!("Cache write failed for {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://acme.example-cms.com/api/0.4/";

    #[test]
    fn key_ignores_parameter_order() {
        let a = RequestParams::new().with("id", 7).with("page", 2).with("a", "b");
        let b = RequestParams::new().with("a", "b").with("page", 2).with("id", 7);
        assert_eq!(
            cache_key(BASE, Command::GetPage, &a),
            cache_key(BASE, Command::GetPage, &b)
        );
    }

    #[test]
    fn key_separates_commands_accounts_and_values() {
        let params = RequestParams::id(7);
        let key = cache_key(BASE, Command::GetPage, &params);
        assert!(key.starts_with("cms:"));
        assert_ne!(key, cache_key(BASE, Command::GetFile, &params));
        assert_ne!(
            key,
            cache_key("https://other.example-cms.com/api/0.4/", Command::GetPage, &params)
        );
        assert_ne!(key, cache_key(BASE, Command::GetPage, &RequestParams::id(8)));
    }

    #[test]
    fn memory_cache_round_trips_and_expires() {
        let cache = MemoryCache::new(2, 60);
        cache.set("k", "body");
        assert_eq!(cache.get("k").as_deref(), Some("body"));
        assert_eq!(cache.get("missing"), None);

        let expired = MemoryCache::new(2, 0);
        expired.set("k", "body");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(expired.get("k"), None);
    }

    #[test]
    fn memory_cache_evicts_least_recent() {
        let cache = MemoryCache::new(1, 60);
        cache.set("a", "1");
        cache.set("b", "2");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn null_cache_never_hits() {
        NullCache.set("k", "v");
        assert_eq!(NullCache.get("k"), None);
    }

    #[test]
    fn disk_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::open(dir.path().join("responses"), 300).unwrap();
        let key = cache_key(BASE, Command::GetProject, &RequestParams::id(1));

        assert_eq!(cache.get(&key), None);
        cache.set(&key, r#"{"project":{"id":1}}"#);
        assert_eq!(cache.get(&key).as_deref(), Some(r#"{"project":{"id":1}}"#));
        assert!(cache.dir().ends_with("responses"));
    }

    #[test]
    fn disk_cache_purges_expired_entries_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let stale = CacheEntry {
            data: "old".to_string(),
            cached_at: chrono::Utc::now().timestamp() - 10_000,
        };
        let path = dir.path().join("cms_stale.json");
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let cache = DiskCache::open(dir.path(), 60).unwrap();
        assert!(!path.exists());
        assert_eq!(cache.get("cms:stale"), None);
    }
}
