//! Session-scoped cache with TTLs and change subscribers
//!
//! Holds the state the client keeps for the lifetime of a signed-in session:
//! - the viewer's profile and owned listings
//! - paginated listing pages
//! - small session markers (see the notification marker in `gigmap-market`)
//!
//! Values are stored serialized so any `Serialize` type can be cached and read
//! back as a different but compatible type. Subscribers are told about every
//! change; `clear` is called on sign-out.
//!
//! # Example
//!
//! ```rust
//! use gigmap_core::cache::{CacheEvent, SessionCache};
//! use std::sync::{Arc, Mutex};
//!
//! let cache = SessionCache::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! cache.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
//!
//! cache.set("workers:page:1", &vec![1, 2, 3], None).unwrap();
//! cache.invalidate("workers:page:1");
//!
//! assert_eq!(seen.lock().unwrap().len(), 2);
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A key was written
    Set(String),
    /// A key was removed explicitly or found expired
    Invalidated(String),
    /// Every key was dropped (sign-out)
    Cleared,
}

/// Handle returned by [`SessionCache::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

/// In-memory cache shared across the client for one session
#[derive(Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    subscribers: RwLock<Subscribers>,
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl SessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached value, dropping it if its TTL has passed
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let now = Instant::now();
        let expired = {
            let guard = self.read_entries()?;
            match guard.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => {
                    return Ok(Some(serde_json::from_slice(&entry.data)?));
                }
                Some(_) => true,
            }
        };

        if expired {
            self.invalidate(key);
        }
        Ok(None)
    }

    /// Set a cached value with an optional TTL
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            data: serde_json::to_vec(value)?,
            expires_at: ttl.map(|d| Instant::now() + d),
        };

        self.write_entries()?.insert(key.to_string(), entry);
        self.notify(&CacheEvent::Set(key.to_string()));
        Ok(())
    }

    /// Remove a cached value, returning whether it was present
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self
            .entries
            .write()
            .map(|mut guard| guard.remove(key).is_some())
            .unwrap_or(false);

        if removed {
            self.notify(&CacheEvent::Invalidated(key.to_string()));
        }
        removed
    }

    /// Remove every key starting with `prefix` (e.g. all pages of a listing feed)
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let keys: Vec<String> = match self.entries.read() {
            Ok(guard) => guard.keys().filter(|k| k.starts_with(prefix)).cloned().collect(),
            Err(_) => return 0,
        };

        keys.iter().filter(|k| self.invalidate(k)).count()
    }

    /// Drop everything. Called when the user signs out.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.write() {
            guard.clear();
        }
        self.notify(&CacheEvent::Cleared);
    }

    /// Check whether a live value exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .map(|guard| guard.get(key).is_some_and(|e| !e.is_expired(now)))
            .unwrap_or(false)
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a listener called synchronously on every change
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        subs.next_id += 1;
        let id = SubscriptionId(subs.next_id);
        subs.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = subs.listeners.len();
        subs.listeners.retain(|(sid, _)| *sid != id);
        subs.listeners.len() != before
    }

    fn notify(&self, event: &CacheEvent) {
        // Clone the listeners out so a callback may touch the cache again.
        let listeners: Vec<Listener> = match self.subscribers.read() {
            Ok(subs) => subs.listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(event);
        }
    }

    fn read_entries(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .read()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire cache read lock"))
    }

    fn write_entries(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .write()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire cache write lock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_set_and_get() {
        let cache = SessionCache::new();

        cache.set("test_key", "test_value", None).unwrap();
        let value: Option<String> = cache.get("test_key").unwrap();

        assert_eq!(value, Some("test_value".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let cache = SessionCache::new();
        let value: Option<String> = cache.get("nonexistent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_invalidate() {
        let cache = SessionCache::new();

        cache.set("to_remove", &42i32, None).unwrap();
        assert!(cache.contains("to_remove"));

        assert!(cache.invalidate("to_remove"));
        assert!(cache.get::<i32>("to_remove").unwrap().is_none());
        assert!(!cache.invalidate("to_remove"));
    }

    #[test]
    fn test_expiry() {
        let cache = SessionCache::new();

        cache.set("expires", "value", Some(Duration::from_millis(20))).unwrap();
        assert!(cache.get::<String>("expires").unwrap().is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get::<String>("expires").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_prefix() {
        let cache = SessionCache::new();
        cache.set("ads:page:1", &1, None).unwrap();
        cache.set("ads:page:2", &2, None).unwrap();
        cache.set("workers:page:1", &3, None).unwrap();

        assert_eq!(cache.invalidate_prefix("ads:"), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_subscribers_see_changes_and_clear() {
        let cache = SessionCache::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let id = cache.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        cache.set("profile", "alice", None).unwrap();
        cache.invalidate("profile");
        cache.clear();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                CacheEvent::Set("profile".to_string()),
                CacheEvent::Invalidated("profile".to_string()),
                CacheEvent::Cleared,
            ]
        );

        assert!(cache.unsubscribe(id));
        cache.set("profile", "bob", None).unwrap();
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_listener_may_reenter_cache() {
        let cache = Arc::new(SessionCache::new());
        let inner = Arc::clone(&cache);
        cache.subscribe(move |e| {
            if let CacheEvent::Set(key) = e {
                let _ = inner.contains(key);
            }
        });
        cache.set("k", &1, None).unwrap();
        assert!(cache.contains("k"));
    }
}
