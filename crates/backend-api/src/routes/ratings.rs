use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::{SubmitRatingRequest, SubmitRatingResponse, UserRatingsResponse},
    services::rating,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "Ratings",
    security(("bearerAuth" = [])),
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating recorded for the counterpart", body = SubmitRatingResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Exchange not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Exchange not completed or already rated", body = crate::error::ErrorResponse),
        (status = 422, description = "Score out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitRatingRequest>,
) -> Result<Json<SubmitRatingResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let rating_id = rating::submit_rating(
        state.db_pool(),
        user.id,
        req.request_id,
        req.rating,
        req.review.as_deref(),
    )
    .await?;

    Ok(Json(SubmitRatingResponse { rating_id }))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/ratings",
    tag = "Ratings",
    security(("bearerAuth" = [])),
    params(
        ("user_id" = i64, Path, description = "User whose ratings to summarize")
    ),
    responses(
        (status = 200, description = "Average, count, and reviews", body = UserRatingsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<UserRatingsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    let summary = rating::get_user_ratings(state.db_pool(), user_id).await?;

    Ok(Json(summary))
}
