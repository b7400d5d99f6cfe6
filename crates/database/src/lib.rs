//! Bookswap Database Crate
//!
//! This crate provides database functionality for the Bookswap application,
//! including connection management, migrations, and the entity types shared
//! by the exchange lifecycle engine.

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export entities
pub use entities::{
    exchange::{ExchangeAction, ExchangeRequest, ExchangeStatus, ParticipantRole},
    listing::{BookListing, ListingStatus},
};

// Re-export types
pub use types::{errors::DatabaseError, DatabaseResult};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(
    config: &bookswap_config::DatabaseConfig,
) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
