use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    routes::models::{
        ConversationsResponse, MarkReadResponse, MessagesResponse, SendMessageRequest,
        SendMessageResponse,
    },
    services::message,
    util::require_bearer,
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "Messages",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Conversation summaries for the caller's exchanges", body = ConversationsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConversationsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let conversations = message::list_conversations(state.db_pool(), user.id).await?;

    Ok(Json(ConversationsResponse { conversations }))
}

#[utoipa::path(
    get,
    path = "/api/exchanges/{request_id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(
        ("request_id" = i64, Path, description = "Exchange request identifier")
    ),
    responses(
        (status = 200, description = "Message history, oldest first", body = MessagesResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Exchange not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let messages = message::get_messages(state.db_pool(), user.id, request_id).await?;

    Ok(Json(MessagesResponse { messages }))
}

#[utoipa::path(
    post,
    path = "/api/exchanges/{request_id}/messages",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(
        ("request_id" = i64, Path, description = "Exchange request identifier")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent to the other participant", body = SendMessageResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Exchange not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Messaging closed in this state", body = crate::error::ErrorResponse),
        (status = 422, description = "Empty message", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let message_id =
        message::send_message(state.db_pool(), user.id, request_id, &req.message).await?;

    Ok(Json(SendMessageResponse { message_id }))
}

#[utoipa::path(
    post,
    path = "/api/exchanges/{request_id}/messages/read",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(
        ("request_id" = i64, Path, description = "Exchange request identifier")
    ),
    responses(
        (status = 200, description = "Unread messages addressed to the caller marked read", body = MarkReadResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let updated = message::mark_read(state.db_pool(), user.id, request_id).await?;

    Ok(Json(MarkReadResponse { updated }))
}
