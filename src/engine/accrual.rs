//! Pure per-tick accrual computation.
//!
//! Given a set of active rigs and the current time, computes what one tick
//! credits: a rounded increment per rig, completion transitions for rigs
//! past their mining duration, and per-owner totals. Applying the plan
//! against the stores is the scheduler's job.

use std::collections::BTreeMap;

use crate::domain::{AccountId, Decimal, Rig, RigId, TimeMs};

/// One rig's share of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigAccrual {
    pub rig: RigId,
    /// Increment credited this tick, already rounded to cents.
    pub increment: Decimal,
    /// Whether the rig reaches its mining duration this tick.
    pub completes: bool,
}

/// Everything one owner earns in a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAccrual {
    pub owner: AccountId,
    /// Sum of the rounded per-rig increments.
    pub earned: Decimal,
    pub rigs: Vec<RigAccrual>,
}

/// The full plan for one tick, owners in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickPlan {
    pub owners: Vec<OwnerAccrual>,
}

/// Per-tick increment for a single rig: its fixed daily return spread over
/// the day's ticks, rounded to cents.
///
/// The rounding happens per rig per tick, before any accumulation. Rigs
/// whose per-tick share is under half a cent therefore accrue nothing —
/// the platform's fixed truncation policy, not an artifact to correct.
pub fn per_tick_increment(daily_return: Decimal, ticks_per_day: i64) -> Decimal {
    (daily_return / Decimal::from_i64(ticks_per_day)).round_cents()
}

/// Compute the accrual plan for one tick over the given active rigs.
///
/// Rigs whose elapsed whole days reach their mining duration are marked for
/// completion; the completing tick's increment is still credited. Owners are
/// grouped and emitted in sorted order so repeated runs over the same input
/// produce identical plans.
pub fn plan_tick(rigs: &[Rig], now: TimeMs, ticks_per_day: i64) -> TickPlan {
    let mut by_owner: BTreeMap<AccountId, Vec<RigAccrual>> = BTreeMap::new();

    for rig in rigs {
        let accrual = RigAccrual {
            rig: rig.id.clone(),
            increment: per_tick_increment(rig.daily_return, ticks_per_day),
            completes: rig.is_expired(now),
        };
        by_owner.entry(rig.owner.clone()).or_default().push(accrual);
    }

    let owners = by_owner
        .into_iter()
        .map(|(owner, rigs)| {
            let mut earned = Decimal::zero();
            for rig in &rigs {
                earned = earned + rig.increment;
            }
            OwnerAccrual { owner, earned, rigs }
        })
        .collect();

    TickPlan { owners }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RigStatus, MS_PER_DAY};

    fn rig(id: &str, owner: &str, daily_return: i64, purchased_at: i64) -> Rig {
        Rig {
            id: RigId::new(id.to_string()),
            owner: AccountId::new(owner.to_string()),
            rig_type: "rig_4000".to_string(),
            price: Decimal::from_i64(daily_return * 50),
            daily_return: Decimal::from_i64(daily_return),
            purchased_at: TimeMs::new(purchased_at),
            mining_days: 90,
            status: RigStatus::Active,
        }
    }

    #[test]
    fn test_reference_increment_truncates_to_zero() {
        // dailyReturn 80 over 28800 ticks/day is below half a cent.
        let increment = per_tick_increment(Decimal::from_i64(80), 28800);
        assert_eq!(increment, Decimal::zero());
    }

    #[test]
    fn test_increment_rounds_to_cents() {
        // 4000 / 28800 = 0.1388... -> 0.14
        let increment = per_tick_increment(Decimal::from_i64(4000), 28800);
        assert_eq!(increment, Decimal::from_str_canonical("0.14").unwrap());
    }

    #[test]
    fn test_plan_groups_by_owner_and_sums_rounded_increments() {
        let rigs = vec![
            rig("r1", "alice", 1000, 0),
            rig("r2", "alice", 2000, 0),
            rig("r3", "bob", 1000, 0),
        ];
        // 10 ticks/day: increments 100, 200, 100.
        let plan = plan_tick(&rigs, TimeMs::new(MS_PER_DAY), 10);

        assert_eq!(plan.owners.len(), 2);
        let alice = &plan.owners[0];
        assert_eq!(alice.owner.as_str(), "alice");
        assert_eq!(alice.earned, Decimal::from_i64(300));
        assert_eq!(alice.rigs.len(), 2);

        let bob = &plan.owners[1];
        assert_eq!(bob.owner.as_str(), "bob");
        assert_eq!(bob.earned, Decimal::from_i64(100));
    }

    #[test]
    fn test_owner_total_conserves_rig_increments() {
        let rigs = vec![
            rig("r1", "alice", 777, 0),
            rig("r2", "alice", 333, 0),
            rig("r3", "alice", 50, 0),
        ];
        let plan = plan_tick(&rigs, TimeMs::new(0), 28800);

        let owner = &plan.owners[0];
        let mut sum = Decimal::zero();
        for r in &owner.rigs {
            sum = sum + r.increment;
        }
        assert_eq!(owner.earned, sum);
    }

    #[test]
    fn test_expired_rig_marked_complete_with_final_increment() {
        let rigs = vec![rig("r1", "alice", 1000, 0)];
        let plan = plan_tick(&rigs, TimeMs::new(91 * MS_PER_DAY), 10);

        let accrual = &plan.owners[0].rigs[0];
        assert!(accrual.completes);
        // The completing tick still credits its increment.
        assert_eq!(accrual.increment, Decimal::from_i64(100));
    }

    #[test]
    fn test_rig_not_expired_before_mining_days() {
        let rigs = vec![rig("r1", "alice", 1000, 0)];
        let plan = plan_tick(&rigs, TimeMs::new(89 * MS_PER_DAY), 10);
        assert!(!plan.owners[0].rigs[0].completes);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let rigs = vec![
            rig("r2", "bob", 1000, 0),
            rig("r1", "alice", 1000, 0),
        ];
        let a = plan_tick(&rigs, TimeMs::new(0), 10);
        let b = plan_tick(&rigs, TimeMs::new(0), 10);
        assert_eq!(a, b);
        assert_eq!(a.owners[0].owner.as_str(), "alice");
    }
}
