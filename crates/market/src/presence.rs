//! Effective online state with time decay on `lastSeen`.
//!
//! Heartbeat flags go stale when a client dies without clearing them. A
//! `lastSeen` older than the stale window forces offline; one newer than the
//! fresh window forces online; in between the stored flag is trusted.

use chrono::{DateTime, Duration, Utc};
use gigmap_core::config::PresenceConfig;

/// Decay thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresencePolicy {
    pub stale_after: Duration,
    pub fresh_within: Duration,
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::minutes(5),
            fresh_within: Duration::minutes(2),
        }
    }
}

impl From<&PresenceConfig> for PresencePolicy {
    fn from(config: &PresenceConfig) -> Self {
        Self {
            stale_after: Duration::minutes(config.stale_after_minutes),
            fresh_within: Duration::minutes(config.fresh_within_minutes),
        }
    }
}

impl PresencePolicy {
    /// Classify a target user as seen by `viewer_uid`.
    pub fn is_online(
        &self,
        target_uid: &str,
        viewer_uid: Option<&str>,
        online_flag: Option<bool>,
        last_seen: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        if viewer_uid == Some(target_uid) {
            return true;
        }

        let flag = online_flag.unwrap_or(false);
        let Some(last_seen) = last_seen else {
            return flag;
        };

        let elapsed = now - last_seen;
        if elapsed > self.stale_after {
            false
        } else if elapsed < self.fresh_within {
            true
        } else {
            flag
        }
    }
}

/// [`PresencePolicy::is_online`] with the default 5/2 minute windows.
pub fn is_online(
    target_uid: &str,
    viewer_uid: Option<&str>,
    online_flag: Option<bool>,
    last_seen: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    PresencePolicy::default().is_online(target_uid, viewer_uid, online_flag, last_seen, now)
}
