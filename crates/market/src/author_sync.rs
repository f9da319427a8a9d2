//! Author-photo fan-out.
//!
//! Listings embed a copy of their author's profile. When the profile photo
//! changes, every owned listing's `author.photoURL` is patched in batches
//! kept below the store's per-commit ceiling. The sweep is best effort: a
//! failed batch stops it, nothing is surfaced to the user, and the cached
//! photo is left untouched so the next profile save runs the full sweep
//! again.

use gigmap_core::cache::SessionCache;
use gigmap_core::config::SyncConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::model::ListingKind;
use crate::store::{Collection, DocumentStore, WriteBatch};

/// Nested field patched in each listing.
pub const AUTHOR_PHOTO_FIELD: &str = "author.photoURL";

/// Listing ids owned by one user, per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedListings {
    pub workers: Vec<String>,
    pub services: Vec<String>,
    pub ads: Vec<String>,
}

impl OwnedListings {
    /// Look up every listing created by `owner_uid`.
    pub async fn fetch<S: DocumentStore>(store: &S, owner_uid: &str) -> Result<Self> {
        let owner = Value::String(owner_uid.to_string());
        let mut owned = Self::default();
        for kind in ListingKind::ALL {
            let ids = store
                .query_eq(kind.collection(), "createdBy", &owner)
                .await?
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            match kind {
                ListingKind::Worker => owned.workers = ids,
                ListingKind::Service => owned.services = ids,
                ListingKind::Ad => owned.ads = ids,
            }
        }
        Ok(owned)
    }

    pub fn len(&self) -> usize {
        self.workers.len() + self.services.len() + self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every (collection, id) pair, workers first.
    pub fn iter(&self) -> impl Iterator<Item = (Collection, &str)> {
        tagged(Collection::Workers, &self.workers)
            .chain(tagged(Collection::Services, &self.services))
            .chain(tagged(Collection::Ads, &self.ads))
    }
}

fn tagged(collection: Collection, ids: &[String]) -> impl Iterator<Item = (Collection, &str)> {
    ids.iter().map(move |id| (collection, id.as_str()))
}

/// Result of one fan-out attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Cached photo already matched; nothing written
    Unchanged,
    /// Every listing patched
    Synced { listings: usize, batches: usize },
    /// A batch failed; listings from `failed_batch` on still hold the old photo
    Stale { committed_batches: usize, failed_batch: usize },
}

/// Keeps listing author snapshots in step with the profile photo.
#[derive(Debug)]
pub struct AuthorSync<S> {
    store: Arc<S>,
    cache: Arc<SessionCache>,
    max_batch_ops: usize,
    batch_size: usize,
}

impl<S: DocumentStore> AuthorSync<S> {
    pub fn new(store: Arc<S>, cache: Arc<SessionCache>) -> Self {
        Self::with_config(store, cache, &SyncConfig::default())
    }

    pub fn with_config(store: Arc<S>, cache: Arc<SessionCache>, config: &SyncConfig) -> Self {
        Self {
            store,
            cache,
            max_batch_ops: config.max_batch_ops,
            batch_size: config.batch_size(),
        }
    }

    fn cache_key(owner_uid: &str) -> String {
        format!("author_photo:{owner_uid}")
    }

    /// Photo URL last propagated (or loaded) for this owner.
    pub fn cached_photo(&self, owner_uid: &str) -> Option<String> {
        self.cache
            .get::<String>(&Self::cache_key(owner_uid))
            .unwrap_or_else(|e| {
                debug!(owner_uid, error = %e, "cached author photo unreadable");
                None
            })
    }

    /// Record the photo currently on the owner's listings, e.g. after loading the profile.
    pub fn remember_photo(&self, owner_uid: &str, photo_url: &str) {
        if let Err(e) = self.cache.set(&Self::cache_key(owner_uid), photo_url, None) {
            debug!(owner_uid, error = %e, "failed to cache author photo");
        }
    }

    /// Patch `author.photoURL` on every owned listing.
    ///
    /// Never fails: batch errors are logged and reported as
    /// [`SyncOutcome::Stale`].
    pub async fn sync_author_photo(&self, owner_uid: &str, new_photo_url: &str, owned: &OwnedListings) -> SyncOutcome {
        if self.cached_photo(owner_uid).as_deref() == Some(new_photo_url) {
            debug!(owner_uid, "author photo unchanged, skipping fan-out");
            return SyncOutcome::Unchanged;
        }

        let targets: Vec<(Collection, &str)> = owned.iter().collect();
        let mut batches = 0;

        for (index, chunk) in targets.chunks(self.batch_size).enumerate() {
            let committed = async {
                let mut batch = WriteBatch::with_limit(self.max_batch_ops);
                for (collection, id) in chunk {
                    batch.update(
                        *collection,
                        *id,
                        vec![(AUTHOR_PHOTO_FIELD.to_string(), Value::String(new_photo_url.to_string()))],
                    )?;
                }
                self.store.commit(batch).await
            }
            .await;

            if let Err(e) = committed {
                warn!(
                    owner_uid,
                    batch = index,
                    listings = chunk.len(),
                    error = %e,
                    "author photo fan-out failed, listings keep the old photo until the next save"
                );
                return SyncOutcome::Stale {
                    committed_batches: batches,
                    failed_batch: index,
                };
            }
            batches += 1;
        }

        self.remember_photo(owner_uid, new_photo_url);
        info!(owner_uid, listings = targets.len(), batches, "author photo propagated");
        SyncOutcome::Synced {
            listings: targets.len(),
            batches,
        }
    }
}
