//! Documents the marketplace logic reads and writes.
//!
//! Field names follow the stored documents (camelCase). Coordinates are kept
//! lenient on input because older documents stored them as strings.

use chrono::{DateTime, Utc};
use gigmap_geo::{Coordinate, ParseDegrees, distance_km};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MarketError;
use crate::store::Collection;

/// A user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub username: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Profile {
    /// Home position, when both coordinates are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    /// Point-in-time author snapshot for embedding in a new listing.
    pub fn author_snapshot(&self, verified: bool) -> AuthorSnapshot {
        AuthorSnapshot {
            uid: self.uid.clone(),
            username: self.username.clone(),
            photo_url: self.profile_image.clone(),
            online: self.online,
            last_seen: self.last_seen,
            verified,
        }
    }
}

/// The three listing collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Worker,
    Service,
    Ad,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] = [ListingKind::Worker, ListingKind::Service, ListingKind::Ad];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Worker => "worker",
            ListingKind::Service => "service",
            ListingKind::Ad => "ad",
        }
    }

    /// Collection holding listings of this kind.
    pub fn collection(&self) -> Collection {
        match self {
            ListingKind::Worker => Collection::Workers,
            ListingKind::Service => Collection::Services,
            ListingKind::Ad => Collection::Ads,
        }
    }

    /// Collection holding reviews of this kind.
    pub fn review_collection(&self) -> Collection {
        match self {
            ListingKind::Worker => Collection::WorkerReviews,
            ListingKind::Service => Collection::ServiceReviews,
            ListingKind::Ad => Collection::AdReviews,
        }
    }

    /// Collection holding favorites of this kind.
    pub fn favorites_collection(&self) -> Collection {
        match self {
            ListingKind::Worker => Collection::WorkerFavorites,
            ListingKind::Service => Collection::ServiceFavorites,
            ListingKind::Ad => Collection::AdFavorites,
        }
    }

    /// Review field that points back at the listing (`workerId`, ...).
    pub fn review_field(&self) -> &'static str {
        match self {
            ListingKind::Worker => "workerId",
            ListingKind::Service => "serviceId",
            ListingKind::Ad => "adId",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "worker" | "workers" => Ok(ListingKind::Worker),
            "service" | "services" => Ok(ListingKind::Service),
            "ad" | "ads" => Ok(ListingKind::Ad),
            other => Err(MarketError::Validation(format!("unknown listing kind `{other}`"))),
        }
    }
}

/// Stored listing status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Disabled,
    Expired,
}

/// Human-readable location block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub landmark: String,
}

/// Copy of the author's profile embedded in a listing.
///
/// Not kept live by the backend; see [`crate::author_sync`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub uid: String,
    pub username: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified: bool,
}

/// A worker, service or ad listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: ListingStatus,
    pub author: AuthorSnapshot,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Listing {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    /// Distance in km from a viewer, `None` when either side lacks a position.
    pub fn distance_from(&self, viewer: &Profile) -> Option<f64> {
        distance_km(viewer.latitude, viewer.longitude, self.latitude, self.longitude)
    }
}

/// A review of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    /// 1..=5, or `None` for a text-only review
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub post_type: Option<ListingKind>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: Option<String>,
}

fn lenient_degrees<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.parse_degrees())
}
