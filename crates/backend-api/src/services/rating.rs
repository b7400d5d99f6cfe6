//! Post-completion counterparty ratings.

use sqlx::SqlitePool;
use tracing::info;

use super::error::ServiceError;
use super::access;
use bookswap_database::ExchangeStatus;

use crate::routes::models::{RatingView, UserRatingsResponse};

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// Submit a rating for the counterpart of a completed exchange.
///
/// Score validation runs before any lookup; the rated user is always
/// computed as the other participant.
pub async fn submit_rating(
    pool: &SqlitePool,
    user_id: i64,
    request_id: i64,
    score: i64,
    review: Option<&str>,
) -> Result<i64, ServiceError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ServiceError::invalid_input(format!(
            "rating must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }

    let (request, role) = access::load_participant_exchange(pool, request_id, user_id).await?;

    if request.status != ExchangeStatus::Completed {
        return Err(ServiceError::conflict("Request is not completed"));
    }

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT rating_id FROM user_ratings WHERE exchange_request_id = ? AND rater_id = ?",
    )
    .bind(request_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        return Err(ServiceError::conflict("You already rated this exchange"));
    }

    let rated_user_id = access::counterpart(&request, role);
    let now = chrono::Utc::now().to_rfc3339();

    let rating_id = sqlx::query(
        r#"
        INSERT INTO user_ratings
            (exchange_request_id, rater_id, rated_user_id, rating, review_text, rating_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(request_id)
    .bind(user_id)
    .bind(rated_user_id)
    .bind(score)
    .bind(review)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!(
        rating_id = rating_id,
        request_id = request_id,
        rater_id = user_id,
        rated_user_id = rated_user_id,
        "submitted rating"
    );

    Ok(rating_id)
}

/// Rating summary for a user: average (one decimal, 0 when unrated), count,
/// and the reviews newest first.
pub async fn get_user_ratings(
    pool: &SqlitePool,
    target_user_id: i64,
) -> Result<UserRatingsResponse, ServiceError> {
    let (average, count): (Option<f64>, i64) = sqlx::query_as(
        "SELECT AVG(rating), COUNT(*) FROM user_ratings WHERE rated_user_id = ?",
    )
    .bind(target_user_id)
    .fetch_one(pool)
    .await?;

    let average = average.map(|avg| (avg * 10.0).round() / 10.0).unwrap_or(0.0);

    let reviews = sqlx::query_as::<_, RatingView>(
        r#"
        SELECT r.rating, r.review_text, r.rating_date,
               COALESCE(u.display_name, u.email, '') AS rater_name
        FROM user_ratings r
        JOIN users u ON u.id = r.rater_id
        WHERE r.rated_user_id = ?
        ORDER BY r.rating_date DESC, r.rating_id DESC
        "#,
    )
    .bind(target_user_id)
    .fetch_all(pool)
    .await?;

    Ok(UserRatingsResponse {
        average,
        count,
        reviews,
    })
}
