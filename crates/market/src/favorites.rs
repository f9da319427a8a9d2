//! Favorites, one collection per listing kind, keyed `{user}_{listing}`.

use chrono::Utc;
use serde_json::json;

use crate::model::ListingKind;
use crate::store::{DocumentStore, to_document};
use crate::{MarketError, Result};

/// Composite document id of a favorite.
pub fn favorite_key(user_id: &str, listing_id: &str) -> String {
    format!("{user_id}_{listing_id}")
}

pub async fn add_favorite<S: DocumentStore>(store: &S, kind: ListingKind, user_id: &str, listing_id: &str) -> Result<String> {
    if user_id.is_empty() || listing_id.is_empty() {
        return Err(MarketError::Validation("favorite needs a user and a listing".to_string()));
    }
    let key = favorite_key(user_id, listing_id);
    let document = to_document(&json!({
        "userId": user_id,
        "listingId": listing_id,
        "createdAt": Utc::now(),
    }))?;
    store.set(kind.favorites_collection(), &key, document).await?;
    Ok(key)
}

pub async fn remove_favorite<S: DocumentStore>(store: &S, kind: ListingKind, user_id: &str, listing_id: &str) -> Result<()> {
    store.delete(kind.favorites_collection(), &favorite_key(user_id, listing_id)).await
}

pub async fn is_favorite<S: DocumentStore>(store: &S, kind: ListingKind, user_id: &str, listing_id: &str) -> Result<bool> {
    Ok(store
        .get(kind.favorites_collection(), &favorite_key(user_id, listing_id))
        .await?
        .is_some())
}
