use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::accounts::{AccountDto, AccountQuery};
use crate::api::AppState;
use crate::domain::{AccountId, ReferralPayout};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralPayoutDto {
    pub origin: String,
    pub layer: i64,
    pub amount: String,
    pub time_ms: i64,
}

impl From<ReferralPayout> for ReferralPayoutDto {
    fn from(payout: ReferralPayout) -> Self {
        ReferralPayoutDto {
            origin: payout.origin.as_str().to_string(),
            layer: payout.layer.as_i64(),
            amount: payout.amount.to_canonical_string(),
            time_ms: payout.time_ms.as_ms(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralEarningsResponse {
    pub total_earnings: String,
    pub payout_count: usize,
    pub payouts: Vec<ReferralPayoutDto>,
}

pub async fn get_referred_users(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountDto>>, AppError> {
    let account = AccountId::new(params.account);
    let referred = state.accounts.referred_users(&account).await?;
    Ok(Json(referred.into_iter().map(AccountDto::from).collect()))
}

pub async fn get_earnings(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<ReferralEarningsResponse>, AppError> {
    let account = AccountId::new(params.account);
    let (total, payouts) = state.accounts.referral_earnings(&account).await?;

    Ok(Json(ReferralEarningsResponse {
        total_earnings: total.to_canonical_string(),
        payout_count: payouts.len(),
        payouts: payouts.into_iter().map(ReferralPayoutDto::from).collect(),
    }))
}
