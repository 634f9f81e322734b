//! Deposit records for the external payment flow.

use crate::domain::{AccountId, Decimal, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settlement state of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Initiated,
    Pending,
    Success,
    Failed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Initiated => "initiated",
            DepositStatus::Pending => "pending",
            DepositStatus::Success => "success",
            DepositStatus::Failed => "failed",
        }
    }

    /// Whether the deposit is still awaiting a settlement callback.
    pub fn is_settleable(&self) -> bool {
        matches!(self, DepositStatus::Initiated | DepositStatus::Pending)
    }
}

impl std::str::FromStr for DepositStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(DepositStatus::Initiated),
            "pending" => Ok(DepositStatus::Pending),
            "success" => Ok(DepositStatus::Success),
            "failed" => Ok(DepositStatus::Failed),
            other => Err(format!("unknown deposit status: {}", other)),
        }
    }
}

/// A deposit awaiting or past settlement.
///
/// The account is credited only when the gateway callback settles the
/// deposit as successful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Stable unique identifier for this event.
    ///
    /// Derived from the order id, falling back to a hash of deterministic
    /// fields when no order id was supplied.
    pub event_key: String,
    pub account: AccountId,
    pub amount: Decimal,
    /// Gateway order id used to correlate the settlement callback.
    pub order_id: String,
    pub status: DepositStatus,
    pub initiated_at: TimeMs,
}

impl Deposit {
    /// Create a pending deposit, generating an order id when none is given.
    pub fn new(
        account: AccountId,
        amount: Decimal,
        order_id: Option<String>,
        initiated_at: TimeMs,
    ) -> Self {
        let order_id = order_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let event_key = Self::compute_event_key(&account, &amount, &order_id, initiated_at);
        Deposit {
            event_key,
            account,
            amount,
            order_id,
            status: DepositStatus::Pending,
            initiated_at,
        }
    }

    /// Compute a stable unique key for this deposit.
    ///
    /// A SHA-256 over the deterministic fields, truncated to 128 bits. The
    /// birthday bound leaves collisions far beyond realistic deposit counts.
    pub fn compute_event_key(
        account: &AccountId,
        amount: &Decimal,
        order_id: &str,
        initiated_at: TimeMs,
    ) -> String {
        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, account.as_str());
        hash_var(&mut hasher, &amount.to_canonical_string());
        hash_var(&mut hasher, order_id);
        hasher.update(initiated_at.as_ms().to_le_bytes());

        let hash = hasher.finalize();
        format!("dep:{}", hex::encode(&hash[..16]))
    }
}
