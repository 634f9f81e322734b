pub mod accounts;
pub mod admin;
pub mod health;
pub mod referrals;
pub mod rigs;
pub mod wallet;

use crate::config::Config;
use crate::db::Repository;
use crate::domain::RigCatalog;
use crate::engine::AccrualScheduler;
use crate::service::{AccountService, RigService, WalletService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub catalog: Arc<RigCatalog>,
    pub scheduler: Arc<AccrualScheduler>,
    pub accounts: AccountService,
    pub rigs: RigService,
    pub wallet: WalletService,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        catalog: Arc<RigCatalog>,
        scheduler: Arc<AccrualScheduler>,
    ) -> Self {
        Self {
            accounts: AccountService::new(repo.clone()),
            rigs: RigService::new(repo.clone(), catalog.clone(), scheduler.clone()),
            wallet: WalletService::new(repo.clone()),
            repo,
            config,
            catalog,
            scheduler,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/accounts", post(accounts::register))
        .route("/v1/balance", get(accounts::get_balance))
        .route("/v1/rigs/catalog", get(rigs::get_catalog))
        .route("/v1/rigs", get(rigs::list_rigs).post(rigs::open_rig))
        .route("/v1/rigs/:id/start", post(rigs::start_rig))
        .route("/v1/rigs/:id/stop", post(rigs::stop_rig))
        .route("/v1/deposits", get(wallet::get_deposits).post(wallet::create_deposit))
        .route("/v1/deposits/callback", post(wallet::deposit_callback))
        .route(
            "/v1/withdrawals",
            get(wallet::get_withdrawals).post(wallet::create_withdrawal),
        )
        .route("/v1/referrals/users", get(referrals::get_referred_users))
        .route("/v1/referrals/earnings", get(referrals::get_earnings))
        .route("/v1/admin/accounts", get(admin::list_accounts))
        .route("/v1/admin/rigs", get(admin::list_rigs))
        .route("/v1/admin/daily-rewards", get(admin::daily_rewards))
        .layer(cors)
        .with_state(state)
}
