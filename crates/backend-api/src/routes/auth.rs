use axum::{extract::State, Json};

use crate::{
    routes::models::{LoginRequest, RegisterRequest, SessionResponse},
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and session issued", body = SessionResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid registration payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::invalid_input("a valid email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::invalid_input("password must not be empty"));
    }

    let user = state
        .authenticator()
        .register_with_password(email, &payload.password, payload.display_name.as_deref())
        .await?;

    let session = state
        .authenticator()
        .login_with_password(email, &payload.password)
        .await?;

    Ok(Json(SessionResponse {
        token: session.token,
        user: user.into(),
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .authenticator()
        .login_with_password(payload.email.trim(), &payload.password)
        .await?;

    let user = state.authenticator().user_profile(session.user_id).await?;

    Ok(Json(SessionResponse {
        token: session.token,
        user: user.into(),
        expires_at: session.expires_at.to_rfc3339(),
    }))
}
