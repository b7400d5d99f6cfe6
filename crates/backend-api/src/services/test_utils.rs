//! Test utilities for service layer testing

use bookswap_database::{ExchangeStatus, ListingStatus};
use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqliteJournalMode, SqlitePool};
use tempfile::TempDir;

/// Creates a test database with the migrated schema
pub async fn create_test_db() -> (SqlitePool, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Memory)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(connect_options)
        .await
        .expect("Failed to create test database");

    bookswap_database::migrations::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

/// Creates a test user with a fixed id; the display name doubles as the
/// public id to keep fixtures readable.
pub async fn create_test_user(pool: &SqlitePool, id: i64, name: &str) {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (id, public_id, email, display_name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(format!("user-{id}"))
    .bind(format!("{name}@example.com"))
    .bind(name)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to create test user");
}

/// Creates an available listing owned by the given user
pub async fn create_test_listing(pool: &SqlitePool, owner_id: i64, title: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO book_listings (owner_id, title, availability_status, created_at)
        VALUES (?, ?, 'available', ?)
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to create test listing")
    .last_insert_rowid()
}

/// Inserts an exchange request directly in the given status, bypassing the
/// lifecycle engine, for tests that need a fixed starting point.
pub async fn create_test_exchange(
    pool: &SqlitePool,
    requester_id: i64,
    owner_id: i64,
    listing_id: i64,
    status: ExchangeStatus,
) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO exchange_requests
            (requester_id, owner_id, requested_listing_id, status, request_message, request_date)
        VALUES (?, ?, ?, ?, NULL, ?)
        "#,
    )
    .bind(requester_id)
    .bind(owner_id)
    .bind(listing_id)
    .bind(status)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to create test exchange request")
    .last_insert_rowid()
}

/// Overwrites a listing's availability status directly
pub async fn set_test_listing_status(pool: &SqlitePool, listing_id: i64, status: ListingStatus) {
    sqlx::query("UPDATE book_listings SET availability_status = ? WHERE listing_id = ?")
        .bind(status)
        .bind(listing_id)
        .execute(pool)
        .await
        .expect("Failed to set listing status");
}

/// Reads a listing's availability status back
pub async fn listing_status(pool: &SqlitePool, listing_id: i64) -> ListingStatus {
    sqlx::query_scalar("SELECT availability_status FROM book_listings WHERE listing_id = ?")
        .bind(listing_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read listing status")
}
