//! Account registration, balance, and referral queries.

use std::sync::Arc;

use tracing::info;

use crate::db::Repository;
use crate::domain::{Account, AccountId, Decimal, ReferralPayout};
use crate::error::AppError;

#[derive(Clone)]
pub struct AccountService {
    repo: Arc<Repository>,
}

impl AccountService {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Register a new account.
    ///
    /// A supplied referral code links the new account under its owner; an
    /// unknown code is ignored and the account is created without a parent.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        referral_code: Option<&str>,
    ) -> Result<Account, AppError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::BadRequest("name and email are required".to_string()));
        }

        if self.repo.find_account_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest("account already exists".to_string()));
        }

        let referred_by = match referral_code {
            Some(code) => self
                .repo
                .find_account_by_referral_code(code)
                .await?
                .map(|parent| parent.id),
            None => None,
        };

        let account = Account::new(name.to_string(), email.to_string(), referred_by);
        self.repo.insert_account(&account).await?;

        info!(account = %account.id, referred = account.referred_by.is_some(), "account registered");
        Ok(account)
    }

    /// Current balance of an account.
    pub async fn balance(&self, id: &AccountId) -> Result<Decimal, AppError> {
        let account = self
            .repo
            .find_account(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", id)))?;
        Ok(account.balance)
    }

    /// Accounts registered under this account's referral code.
    pub async fn referred_users(&self, id: &AccountId) -> Result<Vec<Account>, AppError> {
        self.require_account(id).await?;
        Ok(self.repo.referred_accounts(id).await?)
    }

    /// Total referral earnings plus the full payout log.
    pub async fn referral_earnings(
        &self,
        id: &AccountId,
    ) -> Result<(Decimal, Vec<ReferralPayout>), AppError> {
        self.require_account(id).await?;
        let total = self.repo.sum_referral_earnings(id).await?;
        let payouts = self.repo.query_referral_payouts(id).await?;
        Ok((total, payouts))
    }

    async fn require_account(&self, id: &AccountId) -> Result<Account, AppError> {
        self.repo
            .find_account(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {}", id)))
    }
}
