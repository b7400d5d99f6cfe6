//! Listing gateway.
//!
//! The lifecycle engine is the only writer of `availability_status`; both
//! writes happen inside the engine's transaction, so the setter takes the
//! open transaction rather than the pool.

use bookswap_database::{BookListing, ListingStatus};
use sqlx::{SqlitePool, Transaction};

use super::error::ServiceError;

/// Load a listing by id, or `NotFound`.
pub async fn fetch_listing(
    pool: &SqlitePool,
    listing_id: i64,
) -> Result<BookListing, ServiceError> {
    let listing = sqlx::query_as::<_, BookListing>(
        r#"
        SELECT listing_id, owner_id, title, author, availability_status, created_at
        FROM book_listings
        WHERE listing_id = ?
        "#,
    )
    .bind(listing_id)
    .fetch_optional(pool)
    .await?;

    listing.ok_or_else(|| ServiceError::not_found("Listing not found"))
}

/// Transition a listing's availability status inside an open transaction.
pub(crate) async fn set_listing_status(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    listing_id: i64,
    status: ListingStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE book_listings SET availability_status = ? WHERE listing_id = ?")
        .bind(status)
        .bind(listing_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::{create_test_db, create_test_listing, create_test_user};

    #[tokio::test]
    async fn fetch_listing_returns_row() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 1, "owner").await;
        let listing_id = create_test_listing(&pool, 1, "The Left Hand of Darkness").await;

        let listing = fetch_listing(&pool, listing_id).await.unwrap();
        assert_eq!(listing.owner_id, 1);
        assert_eq!(listing.title, "The Left Hand of Darkness");
        assert_eq!(listing.availability_status, ListingStatus::Available);
    }

    #[tokio::test]
    async fn fetch_listing_missing_is_not_found() {
        let (pool, _temp_dir) = create_test_db().await;

        let result = fetch_listing(&pool, 42).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn set_listing_status_is_transactional() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 1, "owner").await;
        let listing_id = create_test_listing(&pool, 1, "Hyperion").await;

        // A dropped transaction must leave the listing untouched
        {
            let mut tx = pool.begin().await.unwrap();
            set_listing_status(&mut tx, listing_id, ListingStatus::Exchanged)
                .await
                .unwrap();
        }
        let listing = fetch_listing(&pool, listing_id).await.unwrap();
        assert_eq!(listing.availability_status, ListingStatus::Available);

        // A committed transaction persists the change
        let mut tx = pool.begin().await.unwrap();
        set_listing_status(&mut tx, listing_id, ListingStatus::PendingExchange)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let listing = fetch_listing(&pool, listing_id).await.unwrap();
        assert_eq!(listing.availability_status, ListingStatus::PendingExchange);
    }
}
