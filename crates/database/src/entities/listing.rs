//! Book listing entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BookListing {
    pub listing_id: i64,
    pub owner_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub availability_status: ListingStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    PendingExchange,
    Exchanged,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::PendingExchange => "pending_exchange",
            ListingStatus::Exchanged => "exchanged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ListingStatus::Available),
            "pending_exchange" => Some(ListingStatus::PendingExchange),
            "exchanged" => Some(ListingStatus::Exchanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
