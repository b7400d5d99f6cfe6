use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::exchanges::create_request,
        crate::routes::exchanges::list_requests,
        crate::routes::exchanges::transition_request,
        crate::routes::messages::list_conversations,
        crate::routes::messages::get_messages,
        crate::routes::messages::send_message,
        crate::routes::messages::mark_read,
        crate::routes::ratings::submit_rating,
        crate::routes::ratings::get_user_ratings,
        crate::routes::notifications::get_notifications,
        crate::routes::notifications::get_unread_count,
        crate::routes::notifications::mark_notification_read,
        crate::routes::notifications::mark_all_read
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::RegisterRequest,
            crate::routes::models::LoginRequest,
            crate::routes::models::SessionResponse,
            crate::routes::models::UserResponse,
            crate::routes::models::CreateExchangeRequest,
            crate::routes::models::CreateExchangeResponse,
            crate::routes::models::RequestSummary,
            crate::routes::models::ExchangesResponse,
            crate::routes::models::TransitionResponse,
            crate::routes::models::ConversationSummary,
            crate::routes::models::ConversationsResponse,
            crate::routes::models::MessageView,
            crate::routes::models::MessagesResponse,
            crate::routes::models::SendMessageRequest,
            crate::routes::models::SendMessageResponse,
            crate::routes::models::MarkReadResponse,
            crate::routes::models::SubmitRatingRequest,
            crate::routes::models::SubmitRatingResponse,
            crate::routes::models::RatingView,
            crate::routes::models::UserRatingsResponse,
            crate::routes::models::Notification,
            crate::routes::models::NotificationsResponse,
            crate::routes::models::NotificationResponse,
            crate::routes::models::UnreadCountResponse,
            crate::routes::models::MarkAllReadResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Registration and sessions"),
        (name = "Exchanges", description = "Exchange request lifecycle"),
        (name = "Messages", description = "Per-exchange messaging"),
        (name = "Ratings", description = "Post-exchange ratings"),
        (name = "Notifications", description = "User notifications")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
