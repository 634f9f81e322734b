//! Deposit and withdrawal store operations.

use crate::domain::{
    AccountId, Decimal, Deposit, DepositStatus, TimeMs, Withdrawal, WithdrawalStatus,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::Repository;

impl Repository {
    /// Insert a deposit idempotently. Returns whether a new row was created.
    pub async fn insert_deposit(&self, deposit: &Deposit) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO deposits (event_key, account, amount_cents, order_id, status, initiated_at_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_key) DO NOTHING
            "#,
        )
        .bind(&deposit.event_key)
        .bind(deposit.account.as_str())
        .bind(deposit.amount.to_cents())
        .bind(&deposit.order_id)
        .bind(deposit.status.as_str())
        .bind(deposit.initiated_at.as_ms())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find a deposit by its gateway order id.
    pub async fn find_deposit_by_order(
        &self,
        order_id: &str,
    ) -> Result<Option<Deposit>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM deposits WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|r| row_to_deposit(&r)))
    }

    /// Deposits for an account, oldest first.
    pub async fn query_deposits(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Deposit>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM deposits WHERE account = ? ORDER BY initiated_at_ms ASC, id ASC",
        )
        .bind(account.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(row_to_deposit).collect())
    }

    /// Settle a deposit by order id: move it out of its awaiting state and,
    /// on success, credit the account — one transaction, exactly once.
    ///
    /// Only a deposit still awaiting settlement transitions; a replayed
    /// callback affects zero rows and credits nothing. Returns whether this
    /// call performed the settlement.
    pub async fn settle_deposit(
        &self,
        order_id: &str,
        success: bool,
        amount: Decimal,
    ) -> Result<bool, sqlx::Error> {
        let status = if success {
            DepositStatus::Success
        } else {
            DepositStatus::Failed
        };

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE deposits SET status = ?
            WHERE order_id = ? AND status IN ('initiated', 'pending')
            "#,
        )
        .bind(status.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if success {
            sqlx::query(
                r#"
                UPDATE accounts SET balance_cents = balance_cents + ?
                WHERE id = (SELECT account FROM deposits WHERE order_id = ?)
                "#,
            )
            .bind(amount.to_cents())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Create a withdrawal request: conditional debit plus the pending record
    /// in a single transaction.
    ///
    /// Returns the stored withdrawal, or None when the balance does not cover
    /// the amount (nothing is written in that case).
    pub async fn create_withdrawal(
        &self,
        account: &AccountId,
        amount: Decimal,
        created_at: TimeMs,
    ) -> Result<Option<Withdrawal>, sqlx::Error> {
        let cents = amount.to_cents();
        let mut tx = self.pool().begin().await?;

        let debit = sqlx::query(
            r#"
            UPDATE accounts SET balance_cents = balance_cents - ?
            WHERE id = ? AND balance_cents >= ?
            "#,
        )
        .bind(cents)
        .bind(account.as_str())
        .bind(cents)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO withdrawals (account, amount_cents, status, created_at_ms)
            VALUES (?, ?, 'pending', ?)
            "#,
        )
        .bind(account.as_str())
        .bind(cents)
        .bind(created_at.as_ms())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(Withdrawal {
            id: inserted.last_insert_rowid(),
            account: account.clone(),
            amount,
            status: WithdrawalStatus::Pending,
            message: None,
            created_at,
        }))
    }

    /// Withdrawals for an account, oldest first.
    pub async fn query_withdrawals(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Withdrawal>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM withdrawals WHERE account = ? ORDER BY created_at_ms ASC, id ASC",
        )
        .bind(account.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(row_to_withdrawal).collect())
    }
}

fn row_to_deposit(row: &SqliteRow) -> Deposit {
    let status_str: String = row.get("status");
    let status = status_str.parse().unwrap_or_else(|e: String| {
        warn!(error = %e, "failed to parse deposit status, treating as failed");
        DepositStatus::Failed
    });

    Deposit {
        event_key: row.get("event_key"),
        account: AccountId::new(row.get("account")),
        amount: Decimal::from_cents(row.get("amount_cents")),
        order_id: row.get("order_id"),
        status,
        initiated_at: TimeMs::new(row.get("initiated_at_ms")),
    }
}

fn row_to_withdrawal(row: &SqliteRow) -> Withdrawal {
    let status_str: String = row.get("status");
    let status = status_str.parse().unwrap_or_else(|e: String| {
        warn!(error = %e, "failed to parse withdrawal status, treating as pending");
        WithdrawalStatus::Pending
    });

    Withdrawal {
        id: row.get("id"),
        account: AccountId::new(row.get("account")),
        amount: Decimal::from_cents(row.get("amount_cents")),
        status,
        message: row.get("message"),
        created_at: TimeMs::new(row.get("created_at_ms")),
    }
}
