//! Per-exchange messaging.
//!
//! Sending is gated on participation and an open lifecycle state; reading
//! history only requires participation, so a collapsed negotiation stays
//! auditable without admitting new traffic.

use sqlx::SqlitePool;
use tracing::info;

use super::error::ServiceError;
use super::{access, notification};
use crate::routes::models::{ConversationSummary, MessageView};

/// Every exchange the user participates in, with last-message and unread
/// bookkeeping, most recently active first.
pub async fn list_conversations(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ConversationSummary>, ServiceError> {
    let conversations = sqlx::query_as::<_, ConversationSummary>(
        r#"
        SELECT er.request_id, er.requester_id, er.owner_id, er.status,
               bl.title AS listing_title,
               (SELECT m.message_content FROM messages m
                WHERE m.exchange_request_id = er.request_id
                ORDER BY m.sent_date DESC, m.message_id DESC LIMIT 1) AS last_message,
               (SELECT m.sent_date FROM messages m
                WHERE m.exchange_request_id = er.request_id
                ORDER BY m.sent_date DESC, m.message_id DESC LIMIT 1) AS last_time,
               (SELECT COUNT(*) FROM messages m
                WHERE m.exchange_request_id = er.request_id
                  AND m.receiver_id = ? AND m.is_read = 0) AS unread_count
        FROM exchange_requests er
        JOIN book_listings bl ON bl.listing_id = er.requested_listing_id
        WHERE er.requester_id = ? OR er.owner_id = ?
        ORDER BY last_time DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(conversations)
}

/// Message history for an exchange, oldest first. Allowed in any lifecycle
/// state, but only to participants.
pub async fn get_messages(
    pool: &SqlitePool,
    user_id: i64,
    request_id: i64,
) -> Result<Vec<MessageView>, ServiceError> {
    access::load_participant_exchange(pool, request_id, user_id).await?;

    let messages = sqlx::query_as::<_, MessageView>(
        r#"
        SELECT m.message_id, m.sender_id, m.receiver_id,
               COALESCE(u.display_name, u.email, '') AS sender_name,
               m.message_content, m.sent_date, m.is_read
        FROM messages m
        JOIN users u ON u.id = m.sender_id
        WHERE m.exchange_request_id = ?
        ORDER BY m.sent_date ASC, m.message_id ASC
        "#,
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Send a message within an exchange. The receiver is always the other
/// participant, never caller-supplied.
pub async fn send_message(
    pool: &SqlitePool,
    user_id: i64,
    request_id: i64,
    content: &str,
) -> Result<i64, ServiceError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::invalid_input("message must not be empty"));
    }

    let (request, role) = access::load_participant_exchange(pool, request_id, user_id).await?;

    if !request.status.messaging_open() {
        return Err(ServiceError::conflict(
            "Messaging is not allowed in this state",
        ));
    }

    let receiver_id = access::counterpart(&request, role);
    let now = chrono::Utc::now().to_rfc3339();

    let message_id = sqlx::query(
        r#"
        INSERT INTO messages (exchange_request_id, sender_id, receiver_id, message_content, sent_date, is_read)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(request_id)
    .bind(user_id)
    .bind(receiver_id)
    .bind(content)
    .bind(&now)
    .execute(pool)
    .await?
    .last_insert_rowid();

    info!(
        message_id = message_id,
        request_id = request_id,
        sender_id = user_id,
        "sent exchange message"
    );

    let _ = notification::notify_new_message(pool, receiver_id).await;

    Ok(message_id)
}

/// Mark all of the caller's unread messages in an exchange as read; returns
/// how many rows changed. Calling again is a no-op reporting zero.
pub async fn mark_read(
    pool: &SqlitePool,
    user_id: i64,
    request_id: i64,
) -> Result<u64, ServiceError> {
    let updated = sqlx::query(
        "UPDATE messages SET is_read = 1 \
         WHERE exchange_request_id = ? AND receiver_id = ? AND is_read = 0",
    )
    .bind(request_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(updated.rows_affected())
}
