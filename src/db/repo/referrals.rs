//! Referral payout log operations.

use crate::domain::{AccountId, Decimal, ReferralLayer, ReferralPayout, TimeMs};
use sqlx::Row;
use tracing::warn;

use super::Repository;

impl Repository {
    /// Append a commission event to the audit log.
    pub async fn append_referral_payout(
        &self,
        payout: &ReferralPayout,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO referral_payouts (beneficiary, origin, layer, amount_cents, time_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(payout.beneficiary.as_str())
        .bind(payout.origin.as_str())
        .bind(payout.layer.as_i64())
        .bind(payout.amount.to_cents())
        .bind(payout.time_ms.as_ms())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// All payouts credited to a beneficiary, oldest first.
    pub async fn query_referral_payouts(
        &self,
        beneficiary: &AccountId,
    ) -> Result<Vec<ReferralPayout>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT beneficiary, origin, layer, amount_cents, time_ms
            FROM referral_payouts
            WHERE beneficiary = ?
            ORDER BY time_ms ASC, id ASC
            "#,
        )
        .bind(beneficiary.as_str())
        .fetch_all(self.pool())
        .await?;

        let payouts = rows
            .iter()
            .filter_map(|row| {
                let layer_raw: i64 = row.get("layer");
                let Some(layer) = ReferralLayer::from_i64(layer_raw) else {
                    warn!(layer = layer_raw, "skipping payout row with unknown layer");
                    return None;
                };
                Some(ReferralPayout {
                    beneficiary: AccountId::new(row.get("beneficiary")),
                    origin: AccountId::new(row.get("origin")),
                    layer,
                    amount: Decimal::from_cents(row.get("amount_cents")),
                    time_ms: TimeMs::new(row.get("time_ms")),
                })
            })
            .collect();

        Ok(payouts)
    }

    /// Total commission ever credited to a beneficiary.
    ///
    /// Integer cents sum exactly in SQL, so the aggregate is lossless.
    pub async fn sum_referral_earnings(
        &self,
        beneficiary: &AccountId,
    ) -> Result<Decimal, sqlx::Error> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount_cents), 0) AS total FROM referral_payouts WHERE beneficiary = ?",
        )
        .bind(beneficiary.as_str())
        .fetch_one(self.pool())
        .await?;

        let total: i64 = row.get("total");
        Ok(Decimal::from_cents(total))
    }
}
