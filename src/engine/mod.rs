//! The accrual engine: deterministic tick computation plus the scheduler
//! that applies it against the stores.

use crate::domain::Decimal;

pub mod accrual;
pub mod commission;
pub mod scheduler;

pub use accrual::{plan_tick, OwnerAccrual, RigAccrual, TickPlan};
pub use commission::{commission_for, layer_rate};
pub use scheduler::{AccrualScheduler, TickError};

/// Summary of one applied accrual tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Rigs that were still active when re-checked and received an increment.
    pub rigs_processed: usize,
    /// Rigs transitioned to completed this tick.
    pub rigs_completed: usize,
    /// Owners whose balance was credited.
    pub owners_credited: usize,
    /// Sum of all owner credits this tick.
    pub total_credited: Decimal,
    /// Referral payout records appended.
    pub referral_payouts: usize,
    /// Owners whose processing failed and was skipped.
    pub owner_failures: usize,
}
