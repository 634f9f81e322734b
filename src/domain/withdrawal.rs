//! Withdrawal requests.

use crate::domain::{AccountId, Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// Review state of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Denied,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Denied => "denied",
        }
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "denied" => Ok(WithdrawalStatus::Denied),
            other => Err(format!("unknown withdrawal status: {}", other)),
        }
    }
}

/// A withdrawal request. The amount is debited from the balance when the
/// request is created, not when it is reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Store-assigned row id (0 until persisted).
    pub id: i64,
    pub account: AccountId,
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    pub message: Option<String>,
    pub created_at: TimeMs,
}
