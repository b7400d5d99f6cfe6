//! Shared authorization gate for exchange-scoped resources.
//!
//! Messaging and rating both need the same two answers: is the acting user a
//! participant of the exchange, and which side are they on. Role resolution
//! happens exactly once here; callers consume the returned
//! [`ParticipantRole`].

use bookswap_database::{ExchangeRequest, ParticipantRole};
use sqlx::SqlitePool;

use super::error::ServiceError;

/// Load an exchange request by id, or `NotFound`.
pub async fn load_exchange(
    pool: &SqlitePool,
    request_id: i64,
) -> Result<ExchangeRequest, ServiceError> {
    let request = sqlx::query_as::<_, ExchangeRequest>(
        r#"
        SELECT request_id, requester_id, owner_id, requested_listing_id, status,
               request_message, request_date, response_date, completion_date
        FROM exchange_requests
        WHERE request_id = ?
        "#,
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?;

    request.ok_or_else(|| ServiceError::not_found("Exchange request not found"))
}

/// Load an exchange request and verify the acting user participates in it.
pub async fn load_participant_exchange(
    pool: &SqlitePool,
    request_id: i64,
    user_id: i64,
) -> Result<(ExchangeRequest, ParticipantRole), ServiceError> {
    let request = load_exchange(pool, request_id).await?;
    let role = ParticipantRole::resolve(&request, user_id);
    if !role.is_participant() {
        return Err(ServiceError::forbidden("Not a participant in this exchange"));
    }
    Ok((request, role))
}

/// The other participant of the exchange. Message receivers and rated users
/// are always derived this way, never taken from the caller.
pub fn counterpart(request: &ExchangeRequest, role: ParticipantRole) -> i64 {
    match role {
        ParticipantRole::Requester => request.owner_id,
        _ => request.requester_id,
    }
}
