mod docs;
mod error;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi as _;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        // Exchange lifecycle routes
        .route("/api/exchanges", get(routes::exchanges::list_requests))
        .route("/api/exchanges", post(routes::exchanges::create_request))
        .route(
            "/api/exchanges/:request_id/:action",
            post(routes::exchanges::transition_request),
        )
        // Messaging routes
        .route(
            "/api/conversations",
            get(routes::messages::list_conversations),
        )
        .route(
            "/api/exchanges/:request_id/messages",
            get(routes::messages::get_messages),
        )
        .route(
            "/api/exchanges/:request_id/messages",
            post(routes::messages::send_message),
        )
        .route(
            "/api/exchanges/:request_id/messages/read",
            post(routes::messages::mark_read),
        )
        // Rating routes
        .route("/api/ratings", post(routes::ratings::submit_rating))
        .route(
            "/api/users/:user_id/ratings",
            get(routes::ratings::get_user_ratings),
        )
        // Notification routes
        .route(
            "/api/notifications",
            get(routes::notifications::get_notifications),
        )
        .route(
            "/api/notifications/unread_count",
            get(routes::notifications::get_unread_count),
        )
        .route(
            "/api/notifications/:notification_id/read",
            post(routes::notifications::mark_notification_read),
        )
        .route(
            "/api/notifications/read_all",
            post(routes::notifications::mark_all_read),
        )
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
