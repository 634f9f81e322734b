//! The accrual scheduler: one system-wide periodic tick loop.
//!
//! At most one loop runs per process, started lazily by the first Start()
//! on any rig and resumed at boot when active rigs already exist. Each tick
//! snapshots the active rigs, re-checks every rig against the store before
//! crediting (the snapshot is eventually consistent, not tick-exact),
//! credits owners atomically, and cascades referral commissions. A failure
//! while processing one owner is logged and skipped; only a store that stays
//! unavailable through the retry window aborts the tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff::future::retry;
use backoff::ExponentialBackoff;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::Repository;
use crate::domain::{AccountId, Decimal, ReferralLayer, ReferralPayout, Rig, RigStatus, TimeMs};
use crate::engine::accrual::{plan_tick, OwnerAccrual};
use crate::engine::commission::commission_for;
use crate::engine::TickReport;

/// Seconds in one day, the basis for the per-tick increment split.
const SECONDS_PER_DAY: i64 = 86_400;

/// How long a tick keeps retrying the active-set snapshot before giving up.
const SNAPSHOT_RETRY_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TickError {
    /// The active-rig snapshot stayed unavailable through the retry window.
    /// The tick is skipped; the scheduler keeps running.
    #[error("active position snapshot unavailable: {0}")]
    Snapshot(sqlx::Error),
}

/// Periodic accrual driver.
///
/// Holds the single running/stopped flag for the whole process; concurrent
/// `ensure_running` calls spawn at most one loop.
pub struct AccrualScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    repo: Arc<Repository>,
    tick_interval: Duration,
    ticks_per_day: i64,
    running: AtomicBool,
    shutdown: Notify,
}

impl AccrualScheduler {
    pub fn new(repo: Arc<Repository>, config: &Config) -> Self {
        AccrualScheduler {
            inner: Arc::new(SchedulerInner {
                repo,
                tick_interval: Duration::from_secs(config.tick_interval_secs),
                ticks_per_day: SECONDS_PER_DAY / config.tick_interval_secs as i64,
                running: AtomicBool::new(false),
                shutdown: Notify::new(),
            }),
        }
    }

    /// Start the tick loop if it is not already running.
    ///
    /// Returns whether this call started it. The compare-exchange guard means
    /// any number of concurrent Start() calls yield exactly one loop — a
    /// duplicate loop would double-credit every active rig.
    pub fn ensure_running(&self) -> bool {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.tick_loop().await });
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Request the tick loop to stop after the in-flight tick, if any.
    pub fn shutdown(&self) {
        self.inner.shutdown.notify_one();
    }

    /// Run one tick at the current wall-clock time.
    pub async fn run_tick(&self) -> Result<TickReport, TickError> {
        self.inner.run_tick_at(TimeMs::now()).await
    }

    /// Run one tick as of `now`. Public so tests can drive ticks
    /// deterministically without waiting on the interval.
    pub async fn run_tick_at(&self, now: TimeMs) -> Result<TickReport, TickError> {
        self.inner.run_tick_at(now).await
    }
}

impl SchedulerInner {
    async fn tick_loop(self: Arc<Self>) {
        info!(
            interval_secs = self.tick_interval.as_secs(),
            ticks_per_day = self.ticks_per_day,
            "accrual scheduler started"
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        // A tick that runs long delays the next one; ticks never overlap and
        // never burst to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_tick_at(TimeMs::now()).await {
                        Ok(report) if report.rigs_processed > 0 || report.owner_failures > 0 => {
                            debug!(
                                rigs = report.rigs_processed,
                                completed = report.rigs_completed,
                                owners = report.owners_credited,
                                credited = %report.total_credited,
                                payouts = report.referral_payouts,
                                failures = report.owner_failures,
                                "accrual tick applied"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(error = %e, "accrual tick skipped");
                        }
                    }
                }
                _ = self.shutdown.notified() => break,
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("accrual scheduler stopped");
    }

    async fn run_tick_at(&self, now: TimeMs) -> Result<TickReport, TickError> {
        let snapshot = self.load_active_snapshot().await?;
        if snapshot.is_empty() {
            return Ok(TickReport::default());
        }

        // The snapshot only nominates candidates; each owner's rigs are
        // re-read before crediting.
        let candidates = plan_tick(&snapshot, now, self.ticks_per_day);

        let mut report = TickReport::default();
        for candidate in &candidates.owners {
            match self.apply_owner(candidate, now).await {
                Ok(owner_report) => {
                    report.rigs_processed += owner_report.rigs_processed;
                    report.rigs_completed += owner_report.rigs_completed;
                    report.owners_credited += owner_report.owners_credited;
                    report.total_credited = report.total_credited + owner_report.total_credited;
                    report.referral_payouts += owner_report.referral_payouts;
                }
                Err(e) => {
                    report.owner_failures += 1;
                    warn!(
                        owner = %candidate.owner,
                        error = %e,
                        "owner accrual failed, continuing tick"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn load_active_snapshot(&self) -> Result<Vec<Rig>, TickError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(SNAPSHOT_RETRY_WINDOW),
            ..Default::default()
        };

        retry(backoff, || async {
            self.repo
                .find_rigs_by_status(RigStatus::Active)
                .await
                .map_err(backoff::Error::transient)
        })
        .await
        .map_err(TickError::Snapshot)
    }

    /// Apply one owner's share of the tick: re-check each candidate rig,
    /// complete expired ones, credit the owner's total, cascade commissions.
    async fn apply_owner(
        &self,
        candidate: &OwnerAccrual,
        now: TimeMs,
    ) -> Result<TickReport, sqlx::Error> {
        let mut report = TickReport::default();
        let mut earned = Decimal::zero();

        for rig_accrual in &candidate.rigs {
            // Re-check against the store: a rig stopped or completed since
            // the snapshot must not accrue again.
            let Some(rig) = self.repo.find_rig(&rig_accrual.rig).await? else {
                continue;
            };
            if rig.status != RigStatus::Active {
                continue;
            }

            if rig.is_expired(now) {
                // The completing tick's increment is still credited.
                if self.repo.set_rig_status(&rig.id, RigStatus::Completed).await? {
                    report.rigs_completed += 1;
                }
            }

            earned = earned + rig_accrual.increment;
            report.rigs_processed += 1;
        }

        if earned.is_positive() {
            if !self.repo.credit_balance(&candidate.owner, earned).await? {
                warn!(owner = %candidate.owner, "accrual credit for missing account dropped");
                return Ok(report);
            }
            report.owners_credited = 1;
            report.total_credited = earned;
            report.referral_payouts = self.cascade_referrals(&candidate.owner, earned, now).await?;
        }

        Ok(report)
    }

    /// Pay the upline: 5% of the owner's tick earnings to the direct parent,
    /// 2.5% to the grandparent. Zero-amount commissions append nothing.
    async fn cascade_referrals(
        &self,
        origin: &AccountId,
        earned: Decimal,
        now: TimeMs,
    ) -> Result<usize, sqlx::Error> {
        let Some(origin_account) = self.repo.find_account(origin).await? else {
            return Ok(0);
        };
        let Some(parent_id) = origin_account.referred_by else {
            return Ok(0);
        };

        let mut payouts = 0;
        payouts += self
            .pay_commission(&parent_id, origin, ReferralLayer::Direct, earned, now)
            .await?;

        if let Some(parent) = self.repo.find_account(&parent_id).await? {
            if let Some(grandparent_id) = parent.referred_by {
                payouts += self
                    .pay_commission(&grandparent_id, origin, ReferralLayer::Second, earned, now)
                    .await?;
            }
        }

        Ok(payouts)
    }

    async fn pay_commission(
        &self,
        beneficiary: &AccountId,
        origin: &AccountId,
        layer: ReferralLayer,
        earned: Decimal,
        now: TimeMs,
    ) -> Result<usize, sqlx::Error> {
        let amount = commission_for(layer, earned);
        if !amount.is_positive() {
            return Ok(0);
        }

        if !self.repo.credit_balance(beneficiary, amount).await? {
            warn!(
                beneficiary = %beneficiary,
                layer = layer.as_i64(),
                "referral credit for missing account dropped"
            );
            return Ok(0);
        }

        self.repo
            .append_referral_payout(&ReferralPayout {
                beneficiary: beneficiary.clone(),
                origin: origin.clone(),
                layer,
                amount,
                time_ms: now,
            })
            .await?;

        Ok(1)
    }
}
