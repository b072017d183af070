use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Charge states as the gateway reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
    Abandoned,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown transaction status: {0}")]
pub struct UnknownStatus(String);

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Abandoned => "abandoned",
        }
    }

    /// Everything except `pending` is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// The gateway stays authoritative, so any reported state is accepted
    /// except one that would drag a settled charge back to pending.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        !(self.is_terminal() && next == TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            "abandoned" => Ok(TransactionStatus::Abandoned),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Locally persisted record of one payment attempt. The gateway's view wins
/// on every conflict; these rows are a best-effort cache of it.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub reference: String,
    pub access_code: Option<String>,
    pub email: Option<String>,
    /// Major currency units.
    pub amount: Decimal,
    pub currency: Option<String>,
    pub status: TransactionStatus,
    pub channel: Option<String>,
    /// Last full gateway payload seen for this charge, kept for audit.
    pub raw_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a transaction; id and timestamps are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: String,
    pub access_code: Option<String>,
    pub email: Option<String>,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub status: TransactionStatus,
    pub channel: Option<String>,
    pub raw_response: Option<String>,
}

/// Printable confirmation artifact for one successful charge. Immutable once
/// written; `accessed` exists for single-use tracking but nothing enforces it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Receipt {
    pub id: String,
    pub content: String,
    pub at: DateTime<Utc>,
    pub accessed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Success,
            TransactionStatus::Failed,
            TransactionStatus::Abandoned,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_an_error() {
        let err = "reversed".parse::<TransactionStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown transaction status: reversed");
    }

    #[test]
    fn terminal_statuses_never_regress_to_pending() {
        for terminal in [
            TransactionStatus::Success,
            TransactionStatus::Failed,
            TransactionStatus::Abandoned,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(TransactionStatus::Pending));
        }
    }

    #[test]
    fn pending_can_reach_every_state() {
        let pending = TransactionStatus::Pending;
        assert!(!pending.is_terminal());
        for next in [
            TransactionStatus::Pending,
            TransactionStatus::Success,
            TransactionStatus::Failed,
            TransactionStatus::Abandoned,
        ] {
            assert!(pending.can_transition_to(next));
        }
    }

    #[test]
    fn terminal_states_may_overwrite_each_other() {
        // The gateway remains the source of truth even after settlement.
        assert!(TransactionStatus::Failed.can_transition_to(TransactionStatus::Success));
        assert!(TransactionStatus::Success.can_transition_to(TransactionStatus::Success));
    }
}
