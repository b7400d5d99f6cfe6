use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use bookswap_database::{ExchangeAction, ExchangeStatus};

use crate::{
    routes::models::{
        CreateExchangeRequest, CreateExchangeResponse, ExchangesResponse, ListExchangesQuery,
        TransitionResponse,
    },
    services::exchange::{self, RequestRole},
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/exchanges",
    tag = "Exchanges",
    security(("bearerAuth" = [])),
    request_body = CreateExchangeRequest,
    responses(
        (status = 200, description = "Exchange request created", body = CreateExchangeResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Listing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Listing unavailable, own listing, or duplicate pending request", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateExchangeRequest>,
) -> Result<Json<CreateExchangeResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    if req.listing_id <= 0 {
        return Err(ApiError::invalid_input("listing_id is required"));
    }

    let message = req
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let request_id =
        exchange::create_request(state.db_pool(), user.id, req.listing_id, message).await?;

    Ok(Json(CreateExchangeResponse { request_id }))
}

#[utoipa::path(
    get,
    path = "/api/exchanges",
    tag = "Exchanges",
    security(("bearerAuth" = [])),
    params(ListExchangesQuery),
    responses(
        (status = 200, description = "Exchange requests for one side of the exchange", body = ExchangesResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown role or status value", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListExchangesQuery>,
) -> Result<Json<ExchangesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let role = match query.role.as_deref() {
        None => RequestRole::Owner,
        Some(value) => RequestRole::parse(value)
            .ok_or_else(|| ApiError::invalid_input("role must be 'owner' or 'requester'"))?,
    };

    let status = match query.status.as_deref() {
        None => None,
        Some(value) => Some(
            ExchangeStatus::parse(value)
                .ok_or_else(|| ApiError::invalid_input("unknown status value"))?,
        ),
    };

    let requests = exchange::list_requests(state.db_pool(), user.id, role, status).await?;

    Ok(Json(ExchangesResponse { requests }))
}

#[utoipa::path(
    post,
    path = "/api/exchanges/{request_id}/{action}",
    tag = "Exchanges",
    security(("bearerAuth" = [])),
    params(
        ("request_id" = i64, Path, description = "Exchange request identifier"),
        ("action" = String, Path, description = "One of approve, reject, cancel, complete")
    ),
    responses(
        (status = 200, description = "Transition applied", body = TransitionResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Actor lacks the role for this action", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "State does not admit this action", body = crate::error::ErrorResponse),
        (status = 422, description = "Unknown action", body = crate::error::ErrorResponse),
        (status = 500, description = "Transition rolled back", body = crate::error::ErrorResponse)
    )
)]
pub async fn transition_request(
    State(state): State<AppState>,
    Path((request_id, action)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Result<Json<TransitionResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let action = ExchangeAction::parse(&action)
        .ok_or_else(|| ApiError::invalid_input("action must be approve, reject, cancel, or complete"))?;

    let request =
        exchange::transition_request(state.db_pool(), user.id, request_id, action).await?;

    Ok(Json(TransitionResponse {
        request_id: request.request_id,
        status: request.status.to_string(),
    }))
}
