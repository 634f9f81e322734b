//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all store operations.
//! Methods are organized across submodules by domain:
//! - `rigs.rs` - Rig position operations
//! - `referrals.rs` - Referral payout log and upline queries
//! - `wallet.rs` - Deposit and withdrawal operations
//!
//! Balance columns hold whole cents so that credits and debits are atomic
//! SQL arithmetic rather than read-modify-write cycles.

mod referrals;
mod rigs;
mod wallet;

use crate::domain::{Account, AccountId, Decimal, TimeMs};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Account operations
    // =========================================================================

    /// Insert a new account.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including unique-email and
    /// unique-referral-code violations).
    pub async fn insert_account(&self, account: &Account) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, balance_cents, referral_code, referred_by, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.balance.to_cents())
        .bind(&account.referral_code)
        .bind(account.referred_by.as_ref().map(|id| id.as_str().to_string()))
        .bind(account.created_at.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find an account by id.
    pub async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| row_to_account(&r)))
    }

    /// Find an account by email.
    pub async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| row_to_account(&r)))
    }

    /// Find an account by its referral code.
    pub async fn find_account_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE referral_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| row_to_account(&r)))
    }

    /// List all accounts, oldest first.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY created_at_ms ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_account).collect())
    }

    /// Accounts whose `referred_by` points at the given parent.
    pub async fn referred_accounts(
        &self,
        parent: &AccountId,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM accounts WHERE referred_by = ? ORDER BY created_at_ms ASC, id ASC",
        )
        .bind(parent.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_account).collect())
    }

    /// Atomically add `amount` to an account's balance.
    ///
    /// Returns whether the account existed. Uses SQL arithmetic so a credit
    /// racing a concurrent debit can never lose an update.
    pub async fn credit_balance(
        &self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET balance_cents = balance_cents + ? WHERE id = ?")
                .bind(amount.to_cents())
                .bind(id.as_str())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically debit `amount` from an account's balance, only if the
    /// balance covers it.
    ///
    /// Returns whether the debit applied. The balance check and the debit are
    /// one statement, so concurrent debits cannot overdraw the account.
    pub async fn try_debit_balance(
        &self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let cents = amount.to_cents();
        let result = sqlx::query(
            r#"
            UPDATE accounts SET balance_cents = balance_cents - ?
            WHERE id = ? AND balance_cents >= ?
            "#,
        )
        .bind(cents)
        .bind(id.as_str())
        .bind(cents)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn row_to_account(row: &SqliteRow) -> Account {
    let balance_cents: i64 = row.get("balance_cents");
    let referred_by: Option<String> = row.get("referred_by");

    Account {
        id: AccountId::new(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
        balance: Decimal::from_cents(balance_cents),
        referral_code: row.get("referral_code"),
        referred_by: referred_by.map(AccountId::new),
        created_at: TimeMs::new(row.get("created_at_ms")),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{insert_test_account, setup_test_db};
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_account() {
        let (repo, _temp) = setup_test_db().await;
        let account = insert_test_account(&repo, "alice").await;

        let found = repo
            .find_account(&account.id)
            .await
            .expect("query failed")
            .expect("account missing");
        assert_eq!(found, account);

        let by_email = repo
            .find_account_by_email("alice@example.com")
            .await
            .unwrap()
            .expect("lookup by email failed");
        assert_eq!(by_email.id, account.id);

        let by_code = repo
            .find_account_by_referral_code(&account.referral_code)
            .await
            .unwrap()
            .expect("lookup by code failed");
        assert_eq!(by_code.id, account.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (repo, _temp) = setup_test_db().await;
        insert_test_account(&repo, "alice").await;

        let dup = Account::new("alice2".to_string(), "alice@example.com".to_string(), None);
        assert!(repo.insert_account(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_credit_and_debit_balance() {
        let (repo, _temp) = setup_test_db().await;
        let account = insert_test_account(&repo, "bob").await;

        assert!(repo
            .credit_balance(&account.id, Decimal::from_i64(5000))
            .await
            .unwrap());

        let debited = repo
            .try_debit_balance(&account.id, Decimal::from_i64(4000))
            .await
            .unwrap();
        assert!(debited);

        let balance = repo
            .find_account(&account.id)
            .await
            .unwrap()
            .unwrap()
            .balance;
        assert_eq!(balance, Decimal::from_i64(1000));
    }

    #[tokio::test]
    async fn test_debit_refuses_overdraft() {
        let (repo, _temp) = setup_test_db().await;
        let account = insert_test_account(&repo, "carol").await;
        repo.credit_balance(&account.id, Decimal::from_i64(100))
            .await
            .unwrap();

        let debited = repo
            .try_debit_balance(&account.id, Decimal::from_i64(101))
            .await
            .unwrap();
        assert!(!debited);

        let balance = repo
            .find_account(&account.id)
            .await
            .unwrap()
            .unwrap()
            .balance;
        assert_eq!(balance, Decimal::from_i64(100));
    }

    #[tokio::test]
    async fn test_credit_unknown_account_reports_missing() {
        let (repo, _temp) = setup_test_db().await;
        let credited = repo
            .credit_balance(&AccountId::new("ghost".to_string()), Decimal::from_i64(1))
            .await
            .unwrap();
        assert!(!credited);
    }

    #[tokio::test]
    async fn test_referred_accounts() {
        let (repo, _temp) = setup_test_db().await;
        let parent = insert_test_account(&repo, "parent").await;

        let mut child = Account::new("child".to_string(), "child@example.com".to_string(), None);
        child.referred_by = Some(parent.id.clone());
        repo.insert_account(&child).await.unwrap();

        let referred = repo.referred_accounts(&parent.id).await.unwrap();
        assert_eq!(referred.len(), 1);
        assert_eq!(referred[0].id, child.id);
    }
}
