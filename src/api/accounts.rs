use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Account, AccountId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub balance: String,
    pub referral_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    pub created_at_ms: i64,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        AccountDto {
            id: account.id.as_str().to_string(),
            name: account.name,
            email: account.email,
            balance: account.balance.to_canonical_string(),
            referral_code: account.referral_code,
            referred_by: account.referred_by.map(|id| id.as_str().to_string()),
            created_at_ms: account.created_at.as_ms(),
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AccountDto>, AppError> {
    let account = state
        .accounts
        .register(&req.name, &req.email, req.referral_code.as_deref())
        .await?;
    Ok(Json(account.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    pub account: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: String,
}

pub async fn get_balance(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = AccountId::new(params.account);
    let balance = state.accounts.balance(&account).await?;
    Ok(Json(BalanceResponse {
        balance: balance.to_canonical_string(),
    }))
}
