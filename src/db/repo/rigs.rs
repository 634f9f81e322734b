//! Rig position store operations.

use crate::domain::{AccountId, Decimal, Rig, RigId, RigStatus, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::Repository;

impl Repository {
    /// Purchase a rig: debit the owner and insert the position in a single
    /// transaction.
    ///
    /// Returns whether the purchase was funded. When the conditional debit
    /// does not apply the transaction is rolled back and no rig is created.
    pub async fn open_rig(&self, rig: &Rig) -> Result<bool, sqlx::Error> {
        let price_cents = rig.price.to_cents();
        let mut tx = self.pool().begin().await?;

        let debit = sqlx::query(
            r#"
            UPDATE accounts SET balance_cents = balance_cents - ?
            WHERE id = ? AND balance_cents >= ?
            "#,
        )
        .bind(price_cents)
        .bind(rig.owner.as_str())
        .bind(price_cents)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO rigs
            (id, owner, rig_type, price_cents, daily_return_cents, purchased_at_ms, mining_days, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rig.id.as_str())
        .bind(rig.owner.as_str())
        .bind(&rig.rig_type)
        .bind(price_cents)
        .bind(rig.daily_return.to_cents())
        .bind(rig.purchased_at.as_ms())
        .bind(i64::from(rig.mining_days))
        .bind(rig.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Insert a rig without touching any balance. Used by tests and
    /// administrative backfills; purchases go through `open_rig`.
    pub async fn insert_rig(&self, rig: &Rig) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO rigs
            (id, owner, rig_type, price_cents, daily_return_cents, purchased_at_ms, mining_days, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rig.id.as_str())
        .bind(rig.owner.as_str())
        .bind(&rig.rig_type)
        .bind(rig.price.to_cents())
        .bind(rig.daily_return.to_cents())
        .bind(rig.purchased_at.as_ms())
        .bind(i64::from(rig.mining_days))
        .bind(rig.status.as_str())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Find a rig by id.
    pub async fn find_rig(&self, id: &RigId) -> Result<Option<Rig>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM rigs WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|r| row_to_rig(&r)))
    }

    /// All rigs in the given status, ordered by purchase time.
    pub async fn find_rigs_by_status(&self, status: RigStatus) -> Result<Vec<Rig>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM rigs WHERE status = ? ORDER BY purchased_at_ms ASC, id ASC",
        )
        .bind(status.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(row_to_rig).collect())
    }

    /// All rigs owned by an account, ordered by purchase time.
    pub async fn find_rigs_by_owner(&self, owner: &AccountId) -> Result<Vec<Rig>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM rigs WHERE owner = ? ORDER BY purchased_at_ms ASC, id ASC",
        )
        .bind(owner.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(row_to_rig).collect())
    }

    /// All rigs on the platform, ordered by purchase time.
    pub async fn list_rigs(&self) -> Result<Vec<Rig>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM rigs ORDER BY purchased_at_ms ASC, id ASC")
            .fetch_all(self.pool())
            .await?;

        Ok(rows.iter().map(row_to_rig).collect())
    }

    /// Set a rig's status, refusing to move a completed rig.
    ///
    /// Completed is terminal: the guard is part of the statement, so a stale
    /// caller racing the accrual engine's completion cannot resurrect a rig.
    /// Returns whether the update applied.
    pub async fn set_rig_status(
        &self,
        id: &RigId,
        status: RigStatus,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE rigs SET status = ? WHERE id = ? AND status != 'completed'")
                .bind(status.as_str())
                .bind(id.as_str())
                .execute(self.pool())
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_rig(row: &SqliteRow) -> Rig {
    let status_str: String = row.get("status");
    let status = status_str.parse().unwrap_or_else(|e: String| {
        warn!(error = %e, "failed to parse rig status, treating as stopped");
        RigStatus::Stopped
    });
    let mining_days: i64 = row.get("mining_days");

    Rig {
        id: RigId::new(row.get("id")),
        owner: AccountId::new(row.get("owner")),
        rig_type: row.get("rig_type"),
        price: Decimal::from_cents(row.get("price_cents")),
        daily_return: Decimal::from_cents(row.get("daily_return_cents")),
        purchased_at: TimeMs::new(row.get("purchased_at_ms")),
        mining_days: mining_days as u32,
        status,
    }
}
