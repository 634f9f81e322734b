//! Deposit and withdrawal operations.
//!
//! Deposits record a pending entry and are credited only when the gateway
//! settlement callback arrives; the gateway call itself is outside this
//! service.

use std::sync::Arc;

use tracing::info;

use crate::db::Repository;
use crate::domain::{AccountId, Decimal, Deposit, TimeMs, Withdrawal};
use crate::error::AppError;

#[derive(Clone)]
pub struct WalletService {
    repo: Arc<Repository>,
}

impl WalletService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Record a pending deposit awaiting gateway settlement.
    pub async fn create_deposit(
        &self,
        account: &AccountId,
        amount: Decimal,
        order_id: Option<String>,
    ) -> Result<Deposit, AppError> {
        if !amount.is_positive() {
            return Err(AppError::BadRequest(
                "deposit amount must be positive".to_string(),
            ));
        }
        self.require_account(account).await?;

        let deposit = Deposit::new(account.clone(), amount, order_id, TimeMs::now());
        let inserted = self.repo.insert_deposit(&deposit).await?;
        if !inserted {
            return Err(AppError::BadRequest("duplicate deposit".to_string()));
        }

        info!(account = %account, order_id = %deposit.order_id, "deposit initiated");
        Ok(deposit)
    }

    /// Handle the gateway settlement callback.
    ///
    /// Credits the account exactly once: only a deposit still awaiting
    /// settlement transitions, so replayed callbacks change nothing.
    pub async fn confirm_deposit(
        &self,
        order_id: &str,
        success: bool,
        amount: Decimal,
    ) -> Result<Deposit, AppError> {
        if !amount.is_positive() {
            return Err(AppError::BadRequest(
                "callback amount must be positive".to_string(),
            ));
        }

        let deposit = self
            .repo
            .find_deposit_by_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("deposit order {}", order_id)))?;

        let settled = self.repo.settle_deposit(order_id, success, amount).await?;
        if settled {
            info!(order_id = %order_id, success, "deposit settled");
        } else {
            info!(
                order_id = %order_id,
                status = deposit.status.as_str(),
                "deposit callback replay ignored"
            );
        }

        self.repo
            .find_deposit_by_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("deposit order {}", order_id)))
    }

    /// Create a withdrawal request, debiting the balance up front.
    pub async fn withdraw(
        &self,
        account: &AccountId,
        amount: Decimal,
    ) -> Result<Withdrawal, AppError> {
        if !amount.is_positive() {
            return Err(AppError::BadRequest(
                "withdrawal amount must be positive".to_string(),
            ));
        }
        self.require_account(account).await?;

        let withdrawal = self
            .repo
            .create_withdrawal(account, amount, TimeMs::now())
            .await?
            .ok_or(AppError::InsufficientFunds)?;

        info!(account = %account, amount = %amount, "withdrawal requested");
        Ok(withdrawal)
    }

    /// Deposits for an account, oldest first.
    pub async fn deposits(&self, account: &AccountId) -> Result<Vec<Deposit>, AppError> {
        self.require_account(account).await?;
        Ok(self.repo.query_deposits(account).await?)
    }

    /// Withdrawals for an account, oldest first.
    pub async fn withdrawals(&self, account: &AccountId) -> Result<Vec<Withdrawal>, AppError> {
        self.require_account(account).await?;
        Ok(self.repo.query_withdrawals(account).await?)
    }

    async fn require_account(&self, id: &AccountId) -> Result<(), AppError> {
        self.repo
            .find_account(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("account {}", id)))
    }
}
