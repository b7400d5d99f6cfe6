use bookswap_auth::{AuthSession, Authenticator, User};
use sqlx::SqlitePool;

use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    authenticator: Authenticator,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, authenticator: Authenticator) -> Self {
        Self {
            db_pool,
            authenticator,
        }
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), ApiError> {
        self.authenticator
            .authenticate_token(token)
            .await
            .map_err(ApiError::from)
    }
}
