use bookswap_auth::User;
use bookswap_database::ExchangeStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// ===== Auth =====

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.public_id,
            email: value.email,
            display_name: value.display_name,
        }
    }
}

// ===== Exchanges =====

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExchangeRequest {
    pub listing_id: i64,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateExchangeResponse {
    pub request_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListExchangesQuery {
    /// Which side of the exchange to list: `owner` or `requester`
    pub role: Option<String>,
    /// Optional status filter
    pub status: Option<String>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct RequestSummary {
    pub request_id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    pub requested_listing_id: i64,
    #[schema(value_type = String)]
    pub status: ExchangeStatus,
    pub request_message: Option<String>,
    pub request_date: String,
    pub response_date: Option<String>,
    pub completion_date: Option<String>,
    pub listing_title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangesResponse {
    pub requests: Vec<RequestSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub request_id: i64,
    pub status: String,
}

// ===== Messaging =====

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ConversationSummary {
    pub request_id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    #[schema(value_type = String)]
    pub status: ExchangeStatus,
    pub listing_title: String,
    pub last_message: Option<String>,
    pub last_time: Option<String>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MessageView {
    pub message_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub sender_name: String,
    pub message_content: String,
    pub sent_date: String,
    pub is_read: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub message_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    pub updated: u64,
}

// ===== Ratings =====

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRatingRequest {
    pub request_id: i64,
    pub rating: i64,
    pub review: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitRatingResponse {
    pub rating_id: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct RatingView {
    pub rating: i64,
    pub review_text: Option<String>,
    pub rating_date: String,
    pub rater_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRatingsResponse {
    pub average: f64,
    pub count: i64,
    pub reviews: Vec<RatingView>,
}

// ===== Notifications =====

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub notification: Notification,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
