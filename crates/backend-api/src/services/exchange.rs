//! Exchange lifecycle engine: request creation, listing, and the state
//! machine applying `approve | reject | cancel | complete`.
//!
//! Role checks run before state checks, so callers outside the exchange
//! never learn its current state from an error. Status updates are
//! compare-and-set on the previously observed status; a racing writer makes
//! the update match zero rows and the loser sees `InvalidTransition`.

use bookswap_database::{
    ExchangeAction, ExchangeRequest, ExchangeStatus, ListingStatus, ParticipantRole,
};
use sqlx::SqlitePool;
use tracing::info;

use super::error::ServiceError;
use super::{access, listing, notification};
use crate::routes::models::RequestSummary;

/// Which side of the exchange a listing query asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRole {
    Owner,
    Requester,
}

impl RequestRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(RequestRole::Owner),
            "requester" => Some(RequestRole::Requester),
            _ => None,
        }
    }
}

/// Create a pending exchange request against an available listing.
pub async fn create_request(
    pool: &SqlitePool,
    requester_id: i64,
    listing_id: i64,
    message: Option<String>,
) -> Result<i64, ServiceError> {
    let listing = listing::fetch_listing(pool, listing_id).await?;

    if listing.availability_status != ListingStatus::Available {
        return Err(ServiceError::conflict("Listing is not available"));
    }
    if listing.owner_id == requester_id {
        return Err(ServiceError::conflict("You cannot request your own listing"));
    }

    let duplicate: Option<i64> = sqlx::query_scalar(
        "SELECT request_id FROM exchange_requests \
         WHERE requester_id = ? AND requested_listing_id = ? AND status = ?",
    )
    .bind(requester_id)
    .bind(listing_id)
    .bind(ExchangeStatus::Pending)
    .fetch_optional(pool)
    .await?;

    if duplicate.is_some() {
        return Err(ServiceError::conflict(
            "You already have a pending request for this listing",
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let request_id = sqlx::query(
        r#"
        INSERT INTO exchange_requests
            (requester_id, owner_id, requested_listing_id, status, request_message, request_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(requester_id)
    .bind(listing.owner_id)
    .bind(listing_id)
    .bind(ExchangeStatus::Pending)
    .bind(&message)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!(
        request_id = request_id,
        requester_id = requester_id,
        listing_id = listing_id,
        "created exchange request"
    );

    // Fire-and-forget; a failed notification must not fail the request
    let _ = notification::notify_request_received(pool, listing.owner_id, &listing.title).await;

    Ok(request_id)
}

/// List a user's exchange requests from one side, optionally filtered by
/// status. Read-only.
pub async fn list_requests(
    pool: &SqlitePool,
    user_id: i64,
    role: RequestRole,
    status: Option<ExchangeStatus>,
) -> Result<Vec<RequestSummary>, ServiceError> {
    let column = match role {
        RequestRole::Owner => "er.owner_id",
        RequestRole::Requester => "er.requester_id",
    };

    let mut sql = format!(
        "SELECT er.request_id, er.requester_id, er.owner_id, er.requested_listing_id, \
                er.status, er.request_message, er.request_date, er.response_date, \
                er.completion_date, bl.title AS listing_title \
         FROM exchange_requests er \
         JOIN book_listings bl ON bl.listing_id = er.requested_listing_id \
         WHERE {column} = ?"
    );
    if status.is_some() {
        sql.push_str(" AND er.status = ?");
    }
    sql.push_str(" ORDER BY er.request_date DESC, er.request_id DESC");

    let mut query = sqlx::query_as::<_, RequestSummary>(&sql).bind(user_id);
    if let Some(status) = status {
        query = query.bind(status);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Apply a lifecycle action to a request on behalf of a user.
pub async fn transition_request(
    pool: &SqlitePool,
    user_id: i64,
    request_id: i64,
    action: ExchangeAction,
) -> Result<ExchangeRequest, ServiceError> {
    let request = access::load_exchange(pool, request_id).await?;

    let role = ParticipantRole::resolve(&request, user_id);
    if !action.permits(role) {
        return Err(ServiceError::forbidden("Not allowed to perform this action"));
    }
    if !action.applies_from(request.status) {
        return Err(ServiceError::InvalidTransition);
    }

    let now = chrono::Utc::now().to_rfc3339();
    match action {
        ExchangeAction::Approve => approve(pool, &request, &now).await?,
        ExchangeAction::Reject | ExchangeAction::Cancel => {
            respond(pool, &request, action, &now).await?
        }
        ExchangeAction::Complete => complete(pool, &request, &now).await?,
    }

    info!(
        request_id = request_id,
        action = %action,
        actor = user_id,
        "exchange request transitioned"
    );

    let _ = notification::notify_request_update(
        pool,
        access::counterpart(&request, role),
        action.target_status().as_str(),
    )
    .await;

    access::load_exchange(pool, request_id).await
}

/// Approve: request → approved and listing → pending_exchange, atomically.
async fn approve(
    pool: &SqlitePool,
    request: &ExchangeRequest,
    now: &str,
) -> Result<(), ServiceError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE exchange_requests SET status = ?, response_date = ? \
         WHERE request_id = ? AND status = ?",
    )
    .bind(ExchangeStatus::Approved)
    .bind(now)
    .bind(request.request_id)
    .bind(ExchangeStatus::Pending)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::transition_failed)?;

    if updated.rows_affected() == 0 {
        // Lost a concurrent race; dropping the transaction rolls back
        return Err(ServiceError::InvalidTransition);
    }

    listing::set_listing_status(
        &mut tx,
        request.requested_listing_id,
        ListingStatus::PendingExchange,
    )
    .await
    .map_err(ServiceError::transition_failed)?;

    tx.commit().await.map_err(ServiceError::transition_failed)?;
    Ok(())
}

/// Reject or cancel: a single compare-and-set row write, no listing effect.
async fn respond(
    pool: &SqlitePool,
    request: &ExchangeRequest,
    action: ExchangeAction,
    now: &str,
) -> Result<(), ServiceError> {
    let updated = sqlx::query(
        "UPDATE exchange_requests SET status = ?, response_date = ? \
         WHERE request_id = ? AND status = ?",
    )
    .bind(action.target_status())
    .bind(now)
    .bind(request.request_id)
    .bind(request.status)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ServiceError::InvalidTransition);
    }
    Ok(())
}

/// Complete: request → completed, listing → exchanged, and the archive copy,
/// all in one transaction.
async fn complete(
    pool: &SqlitePool,
    request: &ExchangeRequest,
    now: &str,
) -> Result<(), ServiceError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE exchange_requests SET status = ?, completion_date = ? \
         WHERE request_id = ? AND status = ?",
    )
    .bind(ExchangeStatus::Completed)
    .bind(now)
    .bind(request.request_id)
    .bind(ExchangeStatus::Approved)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::transition_failed)?;

    if updated.rows_affected() == 0 {
        return Err(ServiceError::InvalidTransition);
    }

    listing::set_listing_status(&mut tx, request.requested_listing_id, ListingStatus::Exchanged)
        .await
        .map_err(ServiceError::transition_failed)?;

    sqlx::query(
        r#"
        INSERT INTO exchange_requests_archive
            (request_id, requester_id, owner_id, requested_listing_id, status,
             request_message, request_date, response_date, completion_date, archived_date)
        SELECT request_id, requester_id, owner_id, requested_listing_id, status,
               request_message, request_date, response_date, completion_date, ?
        FROM exchange_requests
        WHERE request_id = ?
        "#,
    )
    .bind(now)
    .bind(request.request_id)
    .execute(&mut *tx)
    .await
    .map_err(ServiceError::transition_failed)?;

    tx.commit().await.map_err(ServiceError::transition_failed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::{
        create_test_db, create_test_listing, create_test_user, listing_status,
        set_test_listing_status,
    };

    async fn setup_pending(pool: &SqlitePool) -> (i64, i64) {
        create_test_user(pool, 1, "owner").await;
        create_test_user(pool, 2, "requester").await;
        let listing_id = create_test_listing(pool, 1, "Solaris").await;
        let request_id = create_request(pool, 2, listing_id, Some("Interested!".into()))
            .await
            .expect("request should be created");
        (request_id, listing_id)
    }

    #[tokio::test]
    async fn create_request_leaves_listing_available() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, listing_id) = setup_pending(&pool).await;

        let request = access::load_exchange(&pool, request_id).await.unwrap();
        assert_eq!(request.status, ExchangeStatus::Pending);
        assert_eq!(request.requester_id, 2);
        assert_eq!(request.owner_id, 1);
        assert!(request.response_date.is_none());

        // Creation must not lock the listing; only an approval does
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::Available
        );
    }

    #[tokio::test]
    async fn create_request_rejects_missing_listing() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 2, "requester").await;

        let result = create_request(&pool, 2, 404, None).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn create_request_rejects_unavailable_listing() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 1, "owner").await;
        create_test_user(&pool, 2, "requester").await;
        let listing_id = create_test_listing(&pool, 1, "Solaris").await;
        set_test_listing_status(&pool, listing_id, ListingStatus::PendingExchange).await;

        let result = create_request(&pool, 2, listing_id, None).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_request_rejects_self_request() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 1, "owner").await;
        let listing_id = create_test_listing(&pool, 1, "Solaris").await;

        let result = create_request(&pool, 1, listing_id, None).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_request_rejects_duplicate_pending() {
        let (pool, _temp_dir) = create_test_db().await;
        let (_, listing_id) = setup_pending(&pool).await;

        let second = create_request(&pool, 2, listing_id, None).await;
        assert!(matches!(second, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn approve_locks_listing() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, listing_id) = setup_pending(&pool).await;

        let request = transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();

        assert_eq!(request.status, ExchangeStatus::Approved);
        assert!(request.response_date.is_some());
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::PendingExchange
        );
    }

    #[tokio::test]
    async fn approve_by_requester_is_forbidden() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        let result = transition_request(&pool, 2, request_id, ExchangeAction::Approve).await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn transition_by_outsider_is_forbidden_before_state_is_consulted() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;
        create_test_user(&pool, 3, "stranger").await;

        // Even for an action whose state precondition would also fail
        transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();
        let result = transition_request(&pool, 3, request_id, ExchangeAction::Approve).await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn second_approve_loses_with_invalid_transition() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();
        let second = transition_request(&pool, 1, request_id, ExchangeAction::Approve).await;
        assert!(matches!(second, Err(ServiceError::InvalidTransition)));
    }

    #[tokio::test]
    async fn concurrent_approves_admit_exactly_one_winner() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        let a = transition_request(&pool, 1, request_id, ExchangeAction::Approve);
        let b = transition_request(&pool, 1, request_id, ExchangeAction::Approve);
        let (first, second) = tokio::join!(a, b);

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(
            outcomes.iter().filter(|ok| **ok).count(),
            1,
            "exactly one approval must win"
        );
        for result in [first, second] {
            if let Err(err) = result {
                assert!(matches!(err, ServiceError::InvalidTransition));
            }
        }
    }

    #[tokio::test]
    async fn complete_requires_approved_state() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        let result = transition_request(&pool, 1, request_id, ExchangeAction::Complete).await;
        assert!(matches!(result, Err(ServiceError::InvalidTransition)));
    }

    #[tokio::test]
    async fn complete_archives_and_releases_listing_as_exchanged() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, listing_id) = setup_pending(&pool).await;

        transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();
        // Either party may complete; here the requester does
        let request = transition_request(&pool, 2, request_id, ExchangeAction::Complete)
            .await
            .unwrap();

        assert_eq!(request.status, ExchangeStatus::Completed);
        assert!(request.completion_date.is_some());
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::Exchanged
        );

        let archived: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT request_id, status, archived_date FROM exchange_requests_archive WHERE request_id = ?",
        )
        .bind(request_id)
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(archived.len(), 1, "exactly one archive row");
        assert_eq!(archived[0].1, "completed");
        assert!(!archived[0].2.is_empty());
    }

    #[tokio::test]
    async fn owner_may_withdraw_approval_with_reject() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, listing_id) = setup_pending(&pool).await;

        transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();
        let request = transition_request(&pool, 1, request_id, ExchangeAction::Reject)
            .await
            .unwrap();

        assert_eq!(request.status, ExchangeStatus::Rejected);
        // Rejection has no listing effect, even after approval
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::PendingExchange
        );
    }

    #[tokio::test]
    async fn cancel_is_requester_only_and_pending_only() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        let by_owner = transition_request(&pool, 1, request_id, ExchangeAction::Cancel).await;
        assert!(matches!(by_owner, Err(ServiceError::Forbidden)));

        let request = transition_request(&pool, 2, request_id, ExchangeAction::Cancel)
            .await
            .unwrap();
        assert_eq!(request.status, ExchangeStatus::Cancelled);
        assert!(request.response_date.is_some());

        let again = transition_request(&pool, 2, request_id, ExchangeAction::Cancel).await;
        assert!(matches!(again, Err(ServiceError::InvalidTransition)));
    }

    #[tokio::test]
    async fn transition_on_missing_request_is_not_found() {
        let (pool, _temp_dir) = create_test_db().await;
        create_test_user(&pool, 1, "owner").await;

        let result = transition_request(&pool, 1, 999, ExchangeAction::Approve).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn list_requests_filters_by_role_and_status() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, _) = setup_pending(&pool).await;

        let as_owner = list_requests(&pool, 1, RequestRole::Owner, None).await.unwrap();
        assert_eq!(as_owner.len(), 1);
        assert_eq!(as_owner[0].request_id, request_id);
        assert_eq!(as_owner[0].listing_title, "Solaris");

        let as_requester = list_requests(&pool, 2, RequestRole::Requester, None)
            .await
            .unwrap();
        assert_eq!(as_requester.len(), 1);

        let completed_only = list_requests(
            &pool,
            1,
            RequestRole::Owner,
            Some(ExchangeStatus::Completed),
        )
        .await
        .unwrap();
        assert!(completed_only.is_empty());

        // The owner has no requests where they are the requester
        let other_side = list_requests(&pool, 1, RequestRole::Requester, None)
            .await
            .unwrap();
        assert!(other_side.is_empty());
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let (pool, _temp_dir) = create_test_db().await;
        let (request_id, listing_id) = setup_pending(&pool).await;

        // B approves, listing locks
        transition_request(&pool, 1, request_id, ExchangeAction::Approve)
            .await
            .unwrap();
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::PendingExchange
        );

        // Owner completes, listing exchanged, archive written
        let request = transition_request(&pool, 1, request_id, ExchangeAction::Complete)
            .await
            .unwrap();
        assert_eq!(request.status, ExchangeStatus::Completed);
        assert_eq!(
            listing_status(&pool, listing_id).await,
            ListingStatus::Exchanged
        );

        let archive_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM exchange_requests_archive WHERE request_id = ?",
        )
        .bind(request_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(archive_count, 1);
    }
}
