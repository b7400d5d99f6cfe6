//! User notifications. Lifecycle hooks call the typed helpers fire-and-forget;
//! delivery failure never fails the operation that triggered it.

use sqlx::SqlitePool;

use super::error::ServiceError;
use crate::routes::models::Notification;

pub async fn list_notifications(
    pool: &SqlitePool,
    user_id: i64,
    unread_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>, ServiceError> {
    let notifications = if unread_only {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, type, title, body, read, created_at
            FROM notifications
            WHERE user_id = ? AND read = FALSE
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, type, title, body, read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    };

    Ok(notifications)
}

pub async fn get_unread_count(pool: &SqlitePool, user_id: i64) -> Result<i64, ServiceError> {
    let count =
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = FALSE")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

pub async fn mark_notification_read(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: i64,
) -> Result<Notification, ServiceError> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM notifications WHERE id = ? AND user_id = ?")
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    if existing.is_none() {
        return Err(ServiceError::NotFound);
    }

    sqlx::query("UPDATE notifications SET read = TRUE WHERE id = ? AND user_id = ?")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    let notification = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, type, title, body, read, created_at
        FROM notifications
        WHERE id = ?
        "#,
    )
    .bind(notification_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ServiceError::internal("Failed to fetch updated notification"))?;

    Ok(notification)
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> Result<u64, ServiceError> {
    let result =
        sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = ? AND read = FALSE")
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

pub async fn create_notification(
    pool: &SqlitePool,
    user_id: i64,
    notification_type: &str,
    title: &str,
    body: &str,
) -> Result<i64, ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, type, title, body, read, created_at)
        VALUES (?, ?, ?, ?, FALSE, ?)
        "#,
    )
    .bind(user_id)
    .bind(notification_type)
    .bind(title)
    .bind(body)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn notify_request_received(
    pool: &SqlitePool,
    owner_id: i64,
    listing_title: &str,
) -> Result<i64, ServiceError> {
    let title = format!("New exchange request: {listing_title}");
    let body = "Someone wants to exchange for your listing".to_string();

    create_notification(pool, owner_id, "request_received", &title, &body).await
}

pub async fn notify_request_update(
    pool: &SqlitePool,
    user_id: i64,
    new_status: &str,
) -> Result<i64, ServiceError> {
    let title = format!("Exchange request {new_status}");
    let body = format!("One of your exchange requests is now {new_status}");

    create_notification(pool, user_id, "request_update", &title, &body).await
}

pub async fn notify_new_message(
    pool: &SqlitePool,
    receiver_id: i64,
) -> Result<i64, ServiceError> {
    create_notification(
        pool,
        receiver_id,
        "new_message",
        "New message",
        "You received a new message in one of your exchanges",
    )
    .await
}
