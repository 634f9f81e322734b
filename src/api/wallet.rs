use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::accounts::AccountQuery;
use crate::api::AppState;
use crate::domain::{AccountId, Decimal, Deposit, Withdrawal};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositDto {
    pub order_id: String,
    pub account: String,
    pub amount: String,
    pub status: String,
    pub initiated_at_ms: i64,
}

impl From<Deposit> for DepositDto {
    fn from(deposit: Deposit) -> Self {
        DepositDto {
            order_id: deposit.order_id,
            account: deposit.account.as_str().to_string(),
            amount: deposit.amount.to_canonical_string(),
            status: deposit.status.as_str().to_string(),
            initiated_at_ms: deposit.initiated_at.as_ms(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDto {
    pub id: i64,
    pub account: String,
    pub amount: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at_ms: i64,
}

impl From<Withdrawal> for WithdrawalDto {
    fn from(withdrawal: Withdrawal) -> Self {
        WithdrawalDto {
            id: withdrawal.id,
            account: withdrawal.account.as_str().to_string(),
            amount: withdrawal.amount.to_canonical_string(),
            status: withdrawal.status.as_str().to_string(),
            message: withdrawal.message,
            created_at_ms: withdrawal.created_at.as_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositRequest {
    pub account: String,
    pub amount: String,
    pub order_id: Option<String>,
}

pub async fn create_deposit(
    State(state): State<AppState>,
    Json(req): Json<CreateDepositRequest>,
) -> Result<Json<DepositDto>, AppError> {
    let account = AccountId::new(req.account);
    let amount = Decimal::from_str(&req.amount)
        .map_err(|_| AppError::BadRequest("invalid amount".to_string()))?;

    let deposit = state
        .wallet
        .create_deposit(&account, amount, req.order_id)
        .await?;
    Ok(Json(deposit.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositCallbackRequest {
    pub order_id: String,
    pub status: String,
    pub amount: String,
}

pub async fn deposit_callback(
    State(state): State<AppState>,
    Json(req): Json<DepositCallbackRequest>,
) -> Result<Json<DepositDto>, AppError> {
    let amount = Decimal::from_str(&req.amount)
        .map_err(|_| AppError::BadRequest("invalid amount".to_string()))?;
    let success = req.status == "success";

    let deposit = state
        .wallet
        .confirm_deposit(&req.order_id, success, amount)
        .await?;
    Ok(Json(deposit.into()))
}

pub async fn get_deposits(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DepositDto>>, AppError> {
    let account = AccountId::new(params.account);
    let deposits = state.wallet.deposits(&account).await?;
    Ok(Json(deposits.into_iter().map(DepositDto::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalRequest {
    pub account: String,
    pub amount: String,
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    Json(req): Json<CreateWithdrawalRequest>,
) -> Result<Json<WithdrawalDto>, AppError> {
    let account = AccountId::new(req.account);
    let amount = Decimal::from_str(&req.amount)
        .map_err(|_| AppError::BadRequest("invalid amount".to_string()))?;

    let withdrawal = state.wallet.withdraw(&account, amount).await?;
    Ok(Json(withdrawal.into()))
}

pub async fn get_withdrawals(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<WithdrawalDto>>, AppError> {
    let account = AccountId::new(params.account);
    let withdrawals = state.wallet.withdrawals(&account).await?;
    Ok(Json(
        withdrawals.into_iter().map(WithdrawalDto::from).collect(),
    ))
}
