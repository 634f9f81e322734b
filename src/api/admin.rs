//! Read-only administrative views.

use axum::extract::State;
use axum::Json;
use futures::future::try_join_all;
use serde::Serialize;

use crate::api::accounts::AccountDto;
use crate::api::rigs::RigDto;
use crate::api::AppState;
use crate::domain::{Decimal, RigStatus};
use crate::error::AppError;

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountDto>>, AppError> {
    let accounts = state.repo.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountDto::from).collect()))
}

pub async fn list_rigs(State(state): State<AppState>) -> Result<Json<Vec<RigDto>>, AppError> {
    let rigs = state.repo.list_rigs().await?;
    Ok(Json(rigs.into_iter().map(RigDto::from).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardDto {
    pub account: String,
    /// Sum of daily returns across the account's active rigs.
    pub reward: String,
}

pub async fn daily_rewards(
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyRewardDto>>, AppError> {
    let accounts = state.repo.list_accounts().await?;

    let rewards = try_join_all(accounts.into_iter().map(|account| {
        let repo = state.repo.clone();
        async move {
            let rigs = repo.find_rigs_by_owner(&account.id).await?;
            let mut reward = Decimal::zero();
            for rig in rigs.iter().filter(|r| r.status == RigStatus::Active) {
                reward = reward + rig.daily_return;
            }
            Ok::<_, sqlx::Error>(DailyRewardDto {
                account: account.id.as_str().to_string(),
                reward: reward.to_canonical_string(),
            })
        }
    }))
    .await?;

    Ok(Json(rewards))
}
