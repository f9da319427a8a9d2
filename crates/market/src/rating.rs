//! Client-side rating aggregation.
//!
//! After every review add or delete, the acting reviewer's client recomputes
//! the mean of all numeric ratings for the listing and writes it to both the
//! listing and the owner's profile. There is no transaction: if one of the
//! two writes is refused, it is logged and skipped, and the next review
//! mutation recomputes from scratch.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{ListingKind, Review};
use crate::store::{Collection, DocumentStore, to_document};
use crate::{MarketError, Result};

/// Mean of the non-null ratings in 1..=5. `None` when there are none.
pub fn aggregate_rating(ratings: impl IntoIterator<Item = Option<u8>>) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .flatten()
        .filter(|r| (1..=5).contains(r))
        .fold((0u32, 0u32), |(sum, count), r| (sum + u32::from(r), count + 1));
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Which aggregate writes landed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingOutcome {
    pub rating: Option<f64>,
    pub reviews: usize,
    pub listing_updated: bool,
    pub profile_updated: bool,
}

fn rating_value(rating: Option<f64>) -> Value {
    rating.map_or(Value::Null, Value::from)
}

/// Recompute and write the aggregate for one listing.
pub async fn recompute_rating<S: DocumentStore>(
    store: &S,
    kind: ListingKind,
    listing_id: &str,
    owner_uid: &str,
) -> Result<RatingOutcome> {
    let reviews = store
        .query_eq(kind.review_collection(), kind.review_field(), &Value::String(listing_id.to_string()))
        .await?;
    let rating = aggregate_rating(
        reviews
            .iter()
            .map(|(_, doc)| doc.get("rating").and_then(Value::as_u64).and_then(|r| u8::try_from(r).ok())),
    );

    let fields = vec![("rating".to_string(), rating_value(rating))];
    let listing_updated = write_skippable(store, kind.collection(), listing_id, &fields).await?;
    let profile_updated = write_skippable(store, Collection::Profiles, owner_uid, &fields).await?;

    debug!(%kind, listing_id, ?rating, reviews = reviews.len(), "rating recomputed");
    Ok(RatingOutcome {
        rating,
        reviews: reviews.len(),
        listing_updated,
        profile_updated,
    })
}

async fn write_skippable<S: DocumentStore>(
    store: &S,
    collection: Collection,
    id: &str,
    fields: &[(String, Value)],
) -> Result<bool> {
    match store.update_fields(collection, id, fields).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_skippable() => {
            warn!(%collection, id, error = %e, "skipping rating write");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Store a review and refresh the aggregates. Returns the new review id.
pub async fn submit_review<S: DocumentStore>(
    store: &S,
    kind: ListingKind,
    listing_id: &str,
    owner_uid: &str,
    review: &Review,
) -> Result<(String, RatingOutcome)> {
    if let Some(rating) = review.rating.filter(|r| !(1..=5).contains(r)) {
        return Err(MarketError::Validation(format!("rating must be 1-5, got {rating}")));
    }
    if review.rating.is_none() && review.text.trim().is_empty() {
        return Err(MarketError::Validation("a review needs a rating or some text".to_string()));
    }

    let mut document = to_document(review)?;
    document.insert(kind.review_field().to_string(), Value::String(listing_id.to_string()));
    let id = store.add(kind.review_collection(), document).await?;

    let outcome = recompute_rating(store, kind, listing_id, owner_uid).await?;
    Ok((id, outcome))
}

/// Delete a review and refresh the aggregates.
pub async fn delete_review<S: DocumentStore>(
    store: &S,
    kind: ListingKind,
    review_id: &str,
    listing_id: &str,
    owner_uid: &str,
) -> Result<RatingOutcome> {
    store.delete(kind.review_collection(), review_id).await?;
    recompute_rating(store, kind, listing_id, owner_uid).await
}

/// A review stamped now, for callers without their own clock.
pub fn new_review(user_id: &str, rating: Option<u8>, text: &str) -> Review {
    Review {
        user_id: user_id.to_string(),
        rating,
        text: text.to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn setup() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            Collection::Services,
            "s1",
            json!({"title": "Tailoring", "createdBy": "owner"}).as_object().cloned().unwrap(),
        );
        store.insert(
            Collection::Profiles,
            "owner",
            json!({"uid": "owner", "username": "lata"}).as_object().cloned().unwrap(),
        );
        store
    }

    #[test]
    fn test_aggregate_ignores_null_and_out_of_range() {
        assert_eq!(aggregate_rating([Some(4), None, Some(5), Some(0), Some(9)]), Some(4.5));
        assert_eq!(aggregate_rating([None, None]), None);
        assert_eq!(aggregate_rating(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_listing_and_profile_hold_the_same_mean() {
        let store = setup();
        submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", Some(5), ""))
            .await
            .unwrap();
        submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("b", None, "nice"))
            .await
            .unwrap();
        let (_, outcome) = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("c", Some(2), ""))
            .await
            .unwrap();

        assert_eq!(outcome.rating, Some(3.5));
        assert_eq!(outcome.reviews, 3);
        let listing = store.get(Collection::Services, "s1").await.unwrap().unwrap();
        let profile = store.get(Collection::Profiles, "owner").await.unwrap().unwrap();
        assert_eq!(listing["rating"], json!(3.5));
        assert_eq!(profile["rating"], json!(3.5));
    }

    #[tokio::test]
    async fn test_delete_recomputes() {
        let store = setup();
        let (first, _) = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", Some(1), ""))
            .await
            .unwrap();
        submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("b", Some(5), ""))
            .await
            .unwrap();

        let outcome = delete_review(&store, ListingKind::Service, &first, "s1", "owner").await.unwrap();
        assert_eq!(outcome.rating, Some(5.0));
    }

    #[tokio::test]
    async fn test_refused_profile_write_is_skipped() {
        let store = setup();
        store.deny_writes(Collection::Profiles, "owner");

        let (_, outcome) = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", Some(4), ""))
            .await
            .unwrap();
        assert!(outcome.listing_updated);
        assert!(!outcome.profile_updated);

        let profile = store.get(Collection::Profiles, "owner").await.unwrap().unwrap();
        assert!(profile.get("rating").is_none());
    }

    #[tokio::test]
    async fn test_deleted_listing_is_skipped() {
        let store = setup();
        store.delete(Collection::Services, "s1").await.unwrap();
        let (_, outcome) = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", Some(3), ""))
            .await
            .unwrap();
        assert!(!outcome.listing_updated);
        assert!(outcome.profile_updated);
    }

    #[tokio::test]
    async fn test_invalid_reviews_rejected() {
        let store = setup();
        let err = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", Some(6), ""))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));

        let err = submit_review(&store, ListingKind::Service, "s1", "owner", &new_review("a", None, "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }
}
