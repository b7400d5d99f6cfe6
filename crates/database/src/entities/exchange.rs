//! Exchange request entity and lifecycle rules.
//!
//! The transition table lives here as pure methods on [`ExchangeAction`] so
//! the service layer applies exactly one rule set and the table can be tested
//! without a database.

use serde::{Deserialize, Serialize};

/// A request by one user to obtain another user's listed book.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ExchangeRequest {
    pub request_id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    pub requested_listing_id: i64,
    pub status: ExchangeStatus,
    pub request_message: Option<String>,
    pub request_date: String,
    pub response_date: Option<String>,
    pub completion_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ExchangeStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "pending",
            ExchangeStatus::Approved => "approved",
            ExchangeStatus::Rejected => "rejected",
            ExchangeStatus::Cancelled => "cancelled",
            ExchangeStatus::Completed => "completed",
        }
    }

    /// Strict boundary parse; anything outside the enumeration is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ExchangeStatus::Pending),
            "approved" => Some(ExchangeStatus::Approved),
            "rejected" => Some(ExchangeStatus::Rejected),
            "cancelled" => Some(ExchangeStatus::Cancelled),
            "completed" => Some(ExchangeStatus::Completed),
            _ => None,
        }
    }

    /// Participants may exchange new messages while the request is live or
    /// after a completed exchange; rejected and cancelled requests only keep
    /// their history readable.
    pub fn messaging_open(self) -> bool {
        matches!(
            self,
            ExchangeStatus::Pending | ExchangeStatus::Approved | ExchangeStatus::Completed
        )
    }
}

impl std::fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user's relationship to an exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Owner,
    Requester,
    Neither,
}

impl ParticipantRole {
    pub fn resolve(request: &ExchangeRequest, user_id: i64) -> Self {
        if user_id == request.owner_id {
            ParticipantRole::Owner
        } else if user_id == request.requester_id {
            ParticipantRole::Requester
        } else {
            ParticipantRole::Neither
        }
    }

    pub fn is_participant(self) -> bool {
        !matches!(self, ParticipantRole::Neither)
    }
}

/// The four lifecycle actions a participant can take on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeAction {
    Approve,
    Reject,
    Cancel,
    Complete,
}

impl ExchangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeAction::Approve => "approve",
            ExchangeAction::Reject => "reject",
            ExchangeAction::Cancel => "cancel",
            ExchangeAction::Complete => "complete",
        }
    }

    /// Strict boundary parse of the action vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(ExchangeAction::Approve),
            "reject" => Some(ExchangeAction::Reject),
            "cancel" => Some(ExchangeAction::Cancel),
            "complete" => Some(ExchangeAction::Complete),
            _ => None,
        }
    }

    /// Role check, evaluated before any state inspection.
    pub fn permits(self, role: ParticipantRole) -> bool {
        match self {
            ExchangeAction::Approve | ExchangeAction::Reject => role == ParticipantRole::Owner,
            ExchangeAction::Cancel => role == ParticipantRole::Requester,
            ExchangeAction::Complete => role.is_participant(),
        }
    }

    /// Valid precondition states for this action.
    pub fn applies_from(self, status: ExchangeStatus) -> bool {
        match self {
            ExchangeAction::Approve => status == ExchangeStatus::Pending,
            ExchangeAction::Reject => {
                matches!(status, ExchangeStatus::Pending | ExchangeStatus::Approved)
            }
            ExchangeAction::Cancel => status == ExchangeStatus::Pending,
            ExchangeAction::Complete => status == ExchangeStatus::Approved,
        }
    }

    pub fn target_status(self) -> ExchangeStatus {
        match self {
            ExchangeAction::Approve => ExchangeStatus::Approved,
            ExchangeAction::Reject => ExchangeStatus::Rejected,
            ExchangeAction::Cancel => ExchangeStatus::Cancelled,
            ExchangeAction::Complete => ExchangeStatus::Completed,
        }
    }
}

impl std::fmt::Display for ExchangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
