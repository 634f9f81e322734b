//! Referral commission records.

use crate::domain::{AccountId, Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// Commission layer: direct parent or grandparent of the earning account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralLayer {
    /// Direct upline (layer 1).
    Direct,
    /// Second-degree upline (layer 2).
    Second,
}

impl ReferralLayer {
    pub fn as_i64(&self) -> i64 {
        match self {
            ReferralLayer::Direct => 1,
            ReferralLayer::Second => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(ReferralLayer::Direct),
            2 => Some(ReferralLayer::Second),
            _ => None,
        }
    }
}

/// Immutable audit record of one commission event.
///
/// Appended once per accrual tick per eligible (beneficiary, origin) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralPayout {
    pub beneficiary: AccountId,
    pub origin: AccountId,
    pub layer: ReferralLayer,
    pub amount: Decimal,
    pub time_ms: TimeMs,
}
