use axum::http::StatusCode;

#[derive(Debug)]
pub enum ServiceError {
    NotFound,
    Forbidden,
    InvalidInput(String),
    Conflict(String),
    /// The request was well-formed but its lifecycle state does not admit
    /// the attempted action (including compare-and-set losers).
    InvalidTransition,
    /// An atomic multi-table transition aborted mid-way; the transaction was
    /// rolled back and no partial state persists.
    TransitionFailed(String),
    Database(sqlx::Error),
    Auth(bookswap_auth::AuthError),
    Internal(String),
}

impl ServiceError {
    pub fn not_found(_msg: impl Into<String>) -> Self {
        Self::NotFound
    }

    pub fn forbidden(_msg: impl Into<String>) -> Self {
        Self::Forbidden
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn transition_failed(err: sqlx::Error) -> Self {
        Self::TransitionFailed(err.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => crate::ApiError::not_found("Resource not found"),
            ServiceError::Forbidden => crate::ApiError::forbidden("Access denied"),
            ServiceError::InvalidInput(msg) => crate::ApiError::invalid_input(msg),
            ServiceError::Conflict(msg) => crate::ApiError::conflict(msg),
            ServiceError::InvalidTransition => crate::ApiError::new(
                StatusCode::CONFLICT,
                "invalid_state_transition",
                "The request is not in a state that allows this action",
            ),
            ServiceError::TransitionFailed(msg) => {
                tracing::error!("transition aborted: {}", msg);
                crate::ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "transition_failed",
                    "The operation was rolled back; no changes were applied",
                )
            }
            ServiceError::Database(db_err) => {
                tracing::error!("Database error: {}", db_err);
                crate::ApiError::internal_server_error("Database operation failed")
            }
            ServiceError::Auth(auth_err) => crate::ApiError::from(auth_err),
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                crate::ApiError::internal_server_error(&msg)
            }
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<bookswap_auth::AuthError> for ServiceError {
    fn from(err: bookswap_auth::AuthError) -> Self {
        Self::Auth(err)
    }
}
