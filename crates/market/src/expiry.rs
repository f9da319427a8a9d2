//! Listing expiry countdowns.
//!
//! An expiry is absent (nothing is shown), the far-future "never" sentinel,
//! or a concrete instant. Concrete instants fall into urgency tiers; the two
//! short tiers also drive the `expiring_5min` and `expiring_1hour`
//! notifications.

use chrono::{DateTime, Datelike, Duration, Utc};
use gigmap_core::config::ExpiryConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::{Listing, ListingStatus};

/// Classified expiry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

/// Urgency of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryTier {
    /// Sentinel, never expires
    Never,
    /// More than the warning window left
    Long,
    /// Within the warning window (1 hour by default)
    Warning,
    /// Within the critical window (5 minutes by default)
    Critical,
    Expired,
}

impl ExpiryTier {
    /// Notification type raised when a listing enters this tier.
    pub fn notification_type(&self) -> Option<&'static str> {
        match self {
            ExpiryTier::Critical => Some("expiring_5min"),
            ExpiryTier::Warning => Some("expiring_1hour"),
            _ => None,
        }
    }

    pub fn color(&self) -> ExpiryColor {
        match self {
            ExpiryTier::Never | ExpiryTier::Long => ExpiryColor::Neutral,
            ExpiryTier::Warning => ExpiryColor::Amber,
            ExpiryTier::Critical => ExpiryColor::Red,
            ExpiryTier::Expired => ExpiryColor::Gray,
        }
    }
}

/// Display color of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryColor {
    Neutral,
    Amber,
    /// Rendered pulsing
    Red,
    Gray,
}

/// What a countdown shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryDisplay {
    /// Countdown text; empty for the never sentinel
    pub text: String,
    pub color: ExpiryColor,
    pub is_expiring_now: bool,
    pub tier: ExpiryTier,
}

/// Tier boundaries and the sentinel year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub critical: Duration,
    pub warning: Duration,
    pub never_year: i32,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            critical: Duration::minutes(5),
            warning: Duration::minutes(60),
            never_year: 9000,
        }
    }
}

impl From<&ExpiryConfig> for ExpiryPolicy {
    fn from(config: &ExpiryConfig) -> Self {
        Self {
            critical: Duration::minutes(config.critical_minutes),
            warning: Duration::minutes(config.warning_minutes),
            never_year: config.never_year_threshold,
        }
    }
}

impl ExpiryPolicy {
    pub fn classify(&self, at: DateTime<Utc>) -> Expiry {
        if at.year() >= self.never_year {
            Expiry::Never
        } else {
            Expiry::At(at)
        }
    }

    pub fn tier(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryTier {
        match self.classify(at) {
            Expiry::Never => ExpiryTier::Never,
            Expiry::At(at) => {
                let remaining = at - now;
                if remaining <= Duration::zero() {
                    ExpiryTier::Expired
                } else if remaining <= self.critical {
                    ExpiryTier::Critical
                } else if remaining <= self.warning {
                    ExpiryTier::Warning
                } else {
                    ExpiryTier::Long
                }
            }
        }
    }

    /// Format an expiry for display. `None` means render nothing.
    pub fn format(&self, expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<ExpiryDisplay> {
        let at = expiry?;
        let tier = self.tier(at, now);
        let text = match tier {
            ExpiryTier::Never => String::new(),
            ExpiryTier::Expired => "Expired".to_string(),
            _ => format!("{} left", format_remaining(at - now)),
        };

        Some(ExpiryDisplay {
            text,
            color: tier.color(),
            is_expiring_now: tier == ExpiryTier::Critical,
            tier,
        })
    }

    /// Status a listing should be shown with at `now`.
    ///
    /// An active listing past its concrete expiry reads as expired; disabled
    /// and already-expired listings keep their stored status.
    pub fn effective_status(&self, listing: &Listing, now: DateTime<Utc>) -> ListingStatus {
        match (listing.status, listing.expiry) {
            (ListingStatus::Active, Some(at)) if self.tier(at, now) == ExpiryTier::Expired => ListingStatus::Expired,
            (status, _) => status,
        }
    }
}

/// [`ExpiryPolicy::format`] with the default tiers.
pub fn format_expiry(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<ExpiryDisplay> {
    ExpiryPolicy::default().format(expiry, now)
}

fn format_remaining(remaining: Duration) -> String {
    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    let seconds = remaining.num_seconds() % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Start a countdown that recomputes every `period` until the receiver is dropped.
///
/// The first value is published immediately. `clock` supplies "now" so the
/// countdown can be driven deterministically.
pub fn spawn_ticker<C>(
    policy: ExpiryPolicy,
    expiry: Option<DateTime<Utc>>,
    period: std::time::Duration,
    clock: C,
) -> (watch::Receiver<Option<ExpiryDisplay>>, JoinHandle<()>)
where
    C: Fn() -> DateTime<Utc> + Send + 'static,
{
    let (tx, rx) = watch::channel(policy.format(expiry, clock()));

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately and the initial value is already sent
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(policy.format(expiry, clock())).is_err() {
                tracing::debug!("expiry countdown unmounted");
                break;
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_absent_renders_nothing() {
        assert!(format_expiry(None, now()).is_none());
    }

    #[test]
    fn test_sentinel_never_expires() {
        let never = Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap();
        for now in [now(), Utc.with_ymd_and_hms(9999, 12, 31, 23, 0, 0).unwrap()] {
            let display = format_expiry(Some(never), now).unwrap();
            assert_eq!(display.tier, ExpiryTier::Never);
            assert!(!display.is_expiring_now);
            assert!(display.text.is_empty());
        }
    }

    #[test]
    fn test_one_second_past_is_expired() {
        let display = format_expiry(Some(now() - Duration::seconds(1)), now()).unwrap();
        assert_eq!(display.text, "Expired");
        assert_eq!(display.tier, ExpiryTier::Expired);
        assert!(!display.is_expiring_now);
    }

    #[test]
    fn test_tier_boundaries() {
        let policy = ExpiryPolicy::default();
        assert_eq!(policy.tier(now() + Duration::minutes(5), now()), ExpiryTier::Critical);
        assert_eq!(policy.tier(now() + Duration::minutes(6), now()), ExpiryTier::Warning);
        assert_eq!(policy.tier(now() + Duration::minutes(60), now()), ExpiryTier::Warning);
        assert_eq!(policy.tier(now() + Duration::minutes(61), now()), ExpiryTier::Long);
    }

    #[test]
    fn test_critical_display() {
        let display = format_expiry(Some(now() + Duration::seconds(150)), now()).unwrap();
        assert_eq!(display.text, "2m 30s left");
        assert_eq!(display.color, ExpiryColor::Red);
        assert!(display.is_expiring_now);
        assert_eq!(display.tier.notification_type(), Some("expiring_5min"));
    }

    #[test]
    fn test_long_display() {
        let display = format_expiry(Some(now() + Duration::hours(50)), now()).unwrap();
        assert_eq!(display.text, "2d 2h left");
        assert_eq!(display.color, ExpiryColor::Neutral);
        assert_eq!(display.tier.notification_type(), None);

        let warning = format_expiry(Some(now() + Duration::minutes(45)), now()).unwrap();
        assert_eq!(warning.text, "45m 0s left");
        assert_eq!(warning.tier.notification_type(), Some("expiring_1hour"));
    }

    fn listing(status: ListingStatus, expiry: Option<DateTime<Utc>>) -> Listing {
        let mut listing: Listing = serde_json::from_value(serde_json::json!({
            "id": "w1",
            "title": "Plumber",
            "createdBy": "u1",
            "author": {"uid": "u1", "username": "ravi"},
        }))
        .unwrap();
        listing.status = status;
        listing.expiry = expiry;
        listing
    }

    #[test]
    fn test_active_listing_past_expiry_reads_expired() {
        let policy = ExpiryPolicy::default();
        let past = Some(now() - Duration::seconds(1));
        assert_eq!(policy.effective_status(&listing(ListingStatus::Active, past), now()), ListingStatus::Expired);

        let future = Some(now() + Duration::minutes(3));
        assert_eq!(policy.effective_status(&listing(ListingStatus::Active, future), now()), ListingStatus::Active);
    }

    #[test]
    fn test_sentinel_listing_stays_active() {
        let policy = ExpiryPolicy::default();
        let never = Some(Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap());
        let late = Utc.with_ymd_and_hms(9999, 12, 31, 23, 0, 0).unwrap();
        for at in [now(), late] {
            assert_eq!(policy.effective_status(&listing(ListingStatus::Active, never), at), ListingStatus::Active);
        }
    }

    #[test]
    fn test_stored_status_kept_otherwise() {
        let policy = ExpiryPolicy::default();
        let past = Some(now() - Duration::days(2));
        assert_eq!(policy.effective_status(&listing(ListingStatus::Disabled, past), now()), ListingStatus::Disabled);
        for status in [ListingStatus::Active, ListingStatus::Disabled, ListingStatus::Expired] {
            assert_eq!(policy.effective_status(&listing(status, None), now()), status);
        }
    }

    #[test]
    fn test_policy_from_config() {
        let policy = ExpiryPolicy::from(&ExpiryConfig::default());
        assert_eq!(policy, ExpiryPolicy::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_and_stops_on_drop() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicI64, Ordering};

        let start = now();
        let elapsed = Arc::new(AtomicI64::new(0));
        let clock = {
            let elapsed = Arc::clone(&elapsed);
            move || start + Duration::seconds(elapsed.load(Ordering::SeqCst))
        };

        let expiry = Some(start + Duration::seconds(90));
        let (mut rx, handle) = spawn_ticker(ExpiryPolicy::default(), expiry, std::time::Duration::from_secs(60), clock);
        assert_eq!(rx.borrow().as_ref().unwrap().text, "1m 30s left");

        elapsed.store(60, Ordering::SeqCst);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().text, "30s left");

        elapsed.store(120, Ordering::SeqCst);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().text, "Expired");

        drop(rx);
        handle.await.unwrap();
    }
}
