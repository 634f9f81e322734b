use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::accounts::AccountQuery;
use crate::api::AppState;
use crate::domain::{AccountId, Decimal, Rig, RigId, RigTier};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RigDto {
    pub id: String,
    pub owner: String,
    pub rig_type: String,
    pub price: String,
    pub daily_return: String,
    pub purchased_at_ms: i64,
    pub mining_days: u32,
    pub status: String,
}

impl From<Rig> for RigDto {
    fn from(rig: Rig) -> Self {
        RigDto {
            id: rig.id.as_str().to_string(),
            owner: rig.owner.as_str().to_string(),
            rig_type: rig.rig_type,
            price: rig.price.to_canonical_string(),
            daily_return: rig.daily_return.to_canonical_string(),
            purchased_at_ms: rig.purchased_at.as_ms(),
            mining_days: rig.mining_days,
            status: rig.status.as_str().to_string(),
        }
    }
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<Vec<RigTier>> {
    Json(state.catalog.tiers().to_vec())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRigRequest {
    pub account: String,
    pub rig_type: String,
    /// Requested price; must match the catalog tier exactly.
    pub price: String,
}

pub async fn open_rig(
    State(state): State<AppState>,
    Json(req): Json<OpenRigRequest>,
) -> Result<Json<RigDto>, AppError> {
    let owner = AccountId::new(req.account);
    let price = Decimal::from_str(&req.price)
        .map_err(|_| AppError::BadRequest("invalid price".to_string()))?;

    let rig = state.rigs.open(&owner, &req.rig_type, price).await?;
    Ok(Json(rig.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigActionRequest {
    pub account: String,
}

pub async fn start_rig(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<RigActionRequest>,
) -> Result<Json<RigDto>, AppError> {
    let rig = state
        .rigs
        .start(&RigId::new(id), &AccountId::new(req.account))
        .await?;
    Ok(Json(rig.into()))
}

pub async fn stop_rig(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<RigActionRequest>,
) -> Result<Json<RigDto>, AppError> {
    let rig = state
        .rigs
        .stop(&RigId::new(id), &AccountId::new(req.account))
        .await?;
    Ok(Json(rig.into()))
}

pub async fn list_rigs(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RigDto>>, AppError> {
    let owner = AccountId::new(params.account);
    let rigs = state.rigs.list(&owner).await?;
    Ok(Json(rigs.into_iter().map(RigDto::from).collect()))
}
