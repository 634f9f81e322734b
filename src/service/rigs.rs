//! Rig lifecycle operations: open, start, stop, list.

use std::sync::Arc;

use tracing::info;

use crate::db::Repository;
use crate::domain::{AccountId, Decimal, Rig, RigCatalog, RigId, RigStatus, TimeMs};
use crate::engine::AccrualScheduler;
use crate::error::AppError;

#[derive(Clone)]
pub struct RigService {
    repo: Arc<Repository>,
    catalog: Arc<RigCatalog>,
    scheduler: Arc<AccrualScheduler>,
}

impl RigService {
    pub fn new(
        repo: Arc<Repository>,
        catalog: Arc<RigCatalog>,
        scheduler: Arc<AccrualScheduler>,
    ) -> Self {
        Self {
            repo,
            catalog,
            scheduler,
        }
    }

    /// Purchase a rig for `owner`.
    ///
    /// The requested (rig_type, price) pair must match a catalog tier
    /// exactly, and the owner's balance must cover the price. The debit and
    /// the rig insert are one transaction. New rigs start stopped; mining
    /// begins with an explicit `start`.
    pub async fn open(
        &self,
        owner: &AccountId,
        rig_type: &str,
        price: Decimal,
    ) -> Result<Rig, AppError> {
        let tier = self
            .catalog
            .find(rig_type, price)
            .ok_or_else(|| AppError::InvalidRigType(rig_type.to_string()))?;

        self.repo
            .find_account(owner)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", owner)))?;

        let rig = Rig {
            id: RigId::generate(),
            owner: owner.clone(),
            rig_type: tier.rig_type.clone(),
            price: tier.price,
            daily_return: tier.daily_return,
            purchased_at: TimeMs::now(),
            mining_days: tier.mining_days,
            status: RigStatus::Stopped,
        };

        let funded = self.repo.open_rig(&rig).await?;
        if !funded {
            return Err(AppError::InsufficientFunds);
        }

        info!(rig = %rig.id, owner = %owner, rig_type = %rig.rig_type, "rig opened");
        Ok(rig)
    }

    /// Start (or resume) mining on a rig.
    ///
    /// Idempotent on an already-active rig. Ensures the accrual scheduler is
    /// running; the first start system-wide is what brings it up.
    pub async fn start(&self, rig_id: &RigId, caller: &AccountId) -> Result<Rig, AppError> {
        let mut rig = self.authorize(rig_id, caller).await?;

        self.repo.set_rig_status(rig_id, RigStatus::Active).await?;
        rig.status = RigStatus::Active;

        if self.scheduler.ensure_running() {
            info!(rig = %rig_id, "first active rig, accrual scheduler started");
        }

        Ok(rig)
    }

    /// Stop mining on a rig. No-op if already stopped.
    ///
    /// The rig leaves the active set on the next tick's snapshot; an
    /// in-flight tick may still apply one final increment.
    pub async fn stop(&self, rig_id: &RigId, caller: &AccountId) -> Result<Rig, AppError> {
        let mut rig = self.authorize(rig_id, caller).await?;

        self.repo.set_rig_status(rig_id, RigStatus::Stopped).await?;
        rig.status = RigStatus::Stopped;

        Ok(rig)
    }

    /// All rigs owned by `owner`.
    pub async fn list(&self, owner: &AccountId) -> Result<Vec<Rig>, AppError> {
        Ok(self.repo.find_rigs_by_owner(owner).await?)
    }

    /// Shared ownership and terminal-state checks for start/stop.
    async fn authorize(&self, rig_id: &RigId, caller: &AccountId) -> Result<Rig, AppError> {
        let rig = self
            .repo
            .find_rig(rig_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rig {}", rig_id)))?;

        if &rig.owner != caller {
            return Err(AppError::Forbidden(
                "rig does not belong to this account".to_string(),
            ));
        }
        if rig.status == RigStatus::Completed {
            return Err(AppError::AlreadyCompleted);
        }

        Ok(rig)
    }
}
