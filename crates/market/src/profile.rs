//! Profile save flow.

use gigmap_core::cache::SessionCache;
use gigmap_core::config::SyncConfig;
use gigmap_core::validation::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::author_sync::{AuthorSync, OwnedListings, SyncOutcome};
use crate::model::Profile;
use crate::store::{Collection, DocumentStore};
use crate::{MarketError, Result};

/// Fields a user may change on their profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub profile_image: Option<String>,
    pub city: Option<String>,
    pub place: Option<String>,
    pub pincode: Option<String>,
    pub landmark: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ProfileUpdate {
    fn validate(&self) -> Result<()> {
        let mut validator = Validator::new();
        if let Some(username) = &self.username {
            validator = validator
                .required("username", username)
                .min_length("username", username.trim(), 3)
                .max_length("username", username.trim(), 30);
        }
        if let Some(pincode) = &self.pincode {
            validator = validator.pincode("pincode", pincode);
        }
        if let Some(latitude) = self.latitude {
            validator = validator.range("latitude", latitude, -90.0, 90.0);
        }
        if let Some(longitude) = self.longitude {
            validator = validator.range("longitude", longitude, -180.0, 180.0);
        }
        validator
            .validate()
            .to_result()
            .map_err(|e| MarketError::Validation(e.message))
    }

    /// Changed fields as store patches.
    fn fields(&self) -> Vec<(String, Value)> {
        let strings = [
            ("username", self.username.as_ref().map(|s| s.trim().to_string())),
            ("profileImage", self.profile_image.clone()),
            ("city", self.city.clone()),
            ("place", self.place.clone()),
            ("pincode", self.pincode.clone()),
            ("landmark", self.landmark.clone()),
        ];
        let numbers = [("latitude", self.latitude), ("longitude", self.longitude)];

        strings
            .into_iter()
            .filter_map(|(name, value)| Some((name.to_string(), Value::String(value?))))
            .chain(
                numbers
                    .into_iter()
                    .filter_map(|(name, value)| Some((name.to_string(), Value::from(value?)))),
            )
            .collect()
    }
}

/// Result of [`ProfileService::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub fields_written: usize,
    pub sync: SyncOutcome,
}

/// Loads and saves profiles, keeping listing author snapshots in step.
#[derive(Debug)]
pub struct ProfileService<S> {
    store: Arc<S>,
    author_sync: AuthorSync<S>,
}

impl<S: DocumentStore> ProfileService<S> {
    pub fn new(store: Arc<S>, cache: Arc<SessionCache>, sync: &SyncConfig) -> Self {
        Self {
            author_sync: AuthorSync::with_config(Arc::clone(&store), cache, sync),
            store,
        }
    }

    pub fn author_sync(&self) -> &AuthorSync<S> {
        &self.author_sync
    }

    /// Load a profile and remember its photo as the one on its listings.
    pub async fn load(&self, uid: &str) -> Result<Option<Profile>> {
        let Some(document) = self.store.get(Collection::Profiles, uid).await? else {
            return Ok(None);
        };
        let profile: Profile = serde_json::from_value(Value::Object(document))?;
        if let Some(photo) = &profile.profile_image {
            self.author_sync.remember_photo(uid, photo);
        }
        Ok(Some(profile))
    }

    /// Validate and write a profile update, then propagate a changed photo.
    ///
    /// Validation and the profile write report errors to the caller; the
    /// photo fan-out never does.
    pub async fn save(&self, uid: &str, update: &ProfileUpdate) -> Result<SaveOutcome> {
        update.validate()?;

        if let Some(username) = &update.username {
            let wanted = Value::String(username.trim().to_string());
            let taken = self
                .store
                .query_eq(Collection::Profiles, "username", &wanted)
                .await?
                .iter()
                .any(|(id, _)| id != uid);
            if taken {
                return Err(MarketError::Validation(format!("username `{}` is already taken", username.trim())));
            }
        }

        if update.profile_image.is_some() && self.author_sync.cached_photo(uid).is_none() {
            self.seed_cached_photo(uid).await;
        }

        let fields = update.fields();
        if !fields.is_empty() {
            self.store.update_fields(Collection::Profiles, uid, &fields).await?;
        }
        info!(uid, fields = fields.len(), "profile saved");

        let sync = match &update.profile_image {
            None => SyncOutcome::Unchanged,
            Some(photo) => match OwnedListings::fetch(self.store.as_ref(), uid).await {
                Ok(owned) => self.author_sync.sync_author_photo(uid, photo, &owned).await,
                Err(e) => {
                    warn!(uid, error = %e, "could not list owned listings, skipping author photo fan-out");
                    SyncOutcome::Stale {
                        committed_batches: 0,
                        failed_batch: 0,
                    }
                }
            },
        };

        Ok(SaveOutcome {
            fields_written: fields.len(),
            sync,
        })
    }

    /// Take the stored photo as the one on the listings when nothing was loaded.
    async fn seed_cached_photo(&self, uid: &str) {
        match self.store.get(Collection::Profiles, uid).await {
            Ok(Some(document)) => {
                if let Some(photo) = document.get("profileImage").and_then(Value::as_str) {
                    self.author_sync.remember_photo(uid, photo);
                }
            }
            Ok(None) => {}
            Err(e) => debug!(uid, error = %e, "could not read stored profile photo"),
        }
    }
}
