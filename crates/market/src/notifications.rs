//! Session-stable "new" marker for notifications.
//!
//! Entering the notifications view captures the persisted "last viewed"
//! instant into session storage *before* advancing the persisted value to
//! now. Notifications newer than the captured reference are shown as new for
//! the rest of the visit, so nothing flips back to "old" on re-render.
//! Leaving the view drops the reference; the next visit starts from the
//! advanced value.

use chrono::{DateTime, Utc};
use gigmap_core::cache::SessionCache;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::model::Notification;

/// String key/value storage, either persistent or session-scoped.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// Session storage is the session cache.
impl KeyValueStore for SessionCache {
    fn get(&self, key: &str) -> Option<String> {
        SessionCache::get::<String>(self, key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = SessionCache::set(self, key, value, None) {
            debug!(key, error = %e, "session value not stored");
        }
    }

    fn remove(&self, key: &str) {
        self.invalidate(key);
    }
}

/// Plain in-memory storage, standing in for the browser's local storage.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}

fn parse_millis(raw: &str) -> DateTime<Utc> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Marks notifications newer than the visit's reference instant.
#[derive(Debug)]
pub struct NotificationMarker<P, S> {
    persistent: P,
    session: S,
    persistent_key: String,
    session_key: String,
}

impl<P: KeyValueStore, S: KeyValueStore> NotificationMarker<P, S> {
    pub fn new(user_id: &str, persistent: P, session: S) -> Self {
        Self {
            persistent,
            session,
            persistent_key: format!("notifications:lastViewed:{user_id}"),
            session_key: format!("notifications:reference:{user_id}"),
        }
    }

    /// Enter the notifications view at `now` and return the visit's reference.
    ///
    /// Re-entering without [`NotificationMarker::leave`] keeps the existing
    /// reference.
    pub fn enter(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let reference = match self.session.get(&self.session_key) {
            Some(existing) => existing,
            None => {
                let captured = self.persistent.get(&self.persistent_key).unwrap_or_else(|| "0".to_string());
                self.session.set(&self.session_key, &captured);
                captured
            }
        };
        self.persistent.set(&self.persistent_key, &now.timestamp_millis().to_string());
        parse_millis(&reference)
    }

    /// Reference instant for the current visit.
    ///
    /// Outside a visit this is the persisted "last viewed" value.
    pub fn reference(&self) -> DateTime<Utc> {
        self.session
            .get(&self.session_key)
            .or_else(|| self.persistent.get(&self.persistent_key))
            .map_or(DateTime::UNIX_EPOCH, |raw| parse_millis(&raw))
    }

    pub fn is_new(&self, notification: &Notification) -> bool {
        notification.timestamp > self.reference()
    }

    /// Pair each notification with its "new" flag.
    pub fn mark<'a>(&self, notifications: &'a [Notification]) -> Vec<(&'a Notification, bool)> {
        let reference = self.reference();
        notifications.iter().map(|n| (n, n.timestamp > reference)).collect()
    }

    /// Leave the view; the next visit recomputes from the persisted value.
    pub fn leave(&self) {
        self.session.remove(&self.session_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn notification(timestamp: DateTime<Utc>) -> Notification {
        Notification {
            id: "n1".into(),
            user_id: "u1".into(),
            kind: "review".into(),
            title: "New review".into(),
            message: String::new(),
            post_id: None,
            post_type: None,
            timestamp,
            status: None,
        }
    }

    #[test]
    fn test_session_stability_scenario() {
        let persistent = MemoryKeyValueStore::new();
        let session = SessionCache::new();
        let marker = NotificationMarker::new("u1", &persistent, &session);

        let (t0, t_half, t1) = (at(0), at(30), at(60));
        persistent.set("notifications:lastViewed:u1", &t0.timestamp_millis().to_string());

        assert_eq!(marker.enter(t1), t0);
        assert_eq!(parse_millis(&persistent.get("notifications:lastViewed:u1").unwrap()), t1);

        let item = notification(t_half);
        assert!(marker.is_new(&item));

        // Re-render, and even a remount, within the same visit
        assert!(marker.is_new(&item));
        assert_eq!(marker.enter(at(61)), t0);
        assert!(marker.is_new(&item));

        marker.leave();
        assert_eq!(marker.enter(at(90)), at(61));
        assert!(!marker.is_new(&item));
    }

    #[test]
    fn test_first_visit_falls_back_to_epoch() {
        let persistent = MemoryKeyValueStore::new();
        let session = MemoryKeyValueStore::new();
        let marker = NotificationMarker::new("u1", &persistent, &session);

        assert_eq!(marker.enter(at(0)), DateTime::UNIX_EPOCH);
        let notifications = [notification(at(-600)), notification(at(5))];
        let marked = marker.mark(&notifications);
        assert!(marked.iter().all(|(_, new)| *new));
    }

    #[test]
    fn test_sign_out_clears_session_reference() {
        let persistent = Arc::new(MemoryKeyValueStore::new());
        let session = Arc::new(SessionCache::new());
        let marker = NotificationMarker::new("u1", Arc::clone(&persistent), Arc::clone(&session));

        marker.enter(at(0));
        marker.enter(at(10));
        session.clear();
        assert_eq!(marker.reference(), at(10));
    }

    #[test]
    fn test_garbage_value_reads_as_epoch() {
        let persistent = MemoryKeyValueStore::new();
        persistent.set("notifications:lastViewed:u1", "yesterday");
        let marker = NotificationMarker::new("u1", &persistent, MemoryKeyValueStore::new());
        assert_eq!(marker.enter(at(0)), DateTime::UNIX_EPOCH);
    }
}
