//! Rig positions: purchased yield instruments with a fixed daily return.

use crate::domain::{AccountId, Decimal, RigId, TimeMs, MS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a rig.
///
/// Legal transitions: Stopped -> Active, Active -> Stopped, and either of
/// those to Completed. Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RigStatus {
    Stopped,
    Active,
    Completed,
}

impl RigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RigStatus::Stopped => "stopped",
            RigStatus::Active => "active",
            RigStatus::Completed => "completed",
        }
    }

    /// Whether a transition to `next` is permitted.
    ///
    /// Re-entering the current state is allowed (Start on an active rig and
    /// Stop on a stopped rig are idempotent no-ops).
    pub fn can_transition_to(self, next: RigStatus) -> bool {
        match (self, next) {
            (RigStatus::Completed, _) => false,
            (a, b) if a == b => true,
            (_, RigStatus::Completed) => true,
            (RigStatus::Stopped, RigStatus::Active) => true,
            (RigStatus::Active, RigStatus::Stopped) => true,
            _ => false,
        }
    }
}

impl std::str::FromStr for RigStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopped" => Ok(RigStatus::Stopped),
            "active" => Ok(RigStatus::Active),
            "completed" => Ok(RigStatus::Completed),
            other => Err(format!("unknown rig status: {}", other)),
        }
    }
}

impl std::fmt::Display for RigStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchased rig.
///
/// `daily_return` is fixed at purchase time from the catalog tier and never
/// recalculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rig {
    pub id: RigId,
    pub owner: AccountId,
    pub rig_type: String,
    pub price: Decimal,
    pub daily_return: Decimal,
    pub purchased_at: TimeMs,
    pub mining_days: u32,
    pub status: RigStatus,
}

impl Rig {
    /// Whole days elapsed since purchase, floored. Never negative.
    pub fn days_elapsed(&self, now: TimeMs) -> i64 {
        (now.as_ms() - self.purchased_at.as_ms()).max(0) / MS_PER_DAY
    }

    /// Whether the rig has reached its configured mining duration.
    pub fn is_expired(&self, now: TimeMs) -> bool {
        self.days_elapsed(now) >= i64::from(self.mining_days)
    }
}
