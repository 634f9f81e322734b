use axum::http::StatusCode;
use hashfarm::api::{self, AppState};
use hashfarm::config::Config;
use hashfarm::db::init_db;
use hashfarm::domain::RigCatalog;
use hashfarm::engine::AccrualScheduler;
use hashfarm::{Decimal, Repository, TimeMs};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, Arc<Repository>, Arc<AccrualScheduler>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        tick_interval_secs: 3,
    };
    let catalog = Arc::new(RigCatalog::standard());
    let scheduler = Arc::new(AccrualScheduler::new(repo.clone(), &config));
    let state = AppState::new(repo.clone(), config, catalog, scheduler.clone());

    (api::create_router(state), repo, scheduler, temp_dir)
}

async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &axum::Router, name: &str, referral_code: Option<&str>) -> Value {
    let mut body = json!({
        "name": name,
        "email": format!("{}@example.com", name),
    });
    if let Some(code) = referral_code {
        body["referralCode"] = json!(code);
    }
    let (status, account) = send_json(app, "POST", "/v1/accounts", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    account
}

#[tokio::test]
async fn test_health_and_ready_endpoints() {
    let (app, _repo, _scheduler, _temp) = setup_test_app().await;

    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send_json(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_register_and_duplicate_email() {
    let (app, _repo, _scheduler, _temp) = setup_test_app().await;

    let account = register(&app, "alice", None).await;
    assert_eq!(account["name"], "alice");
    assert_eq!(account["balance"], "0");
    assert!(account["referralCode"].as_str().unwrap().len() == 8);

    let (status, body) = send_json(
        &app,
        "POST",
        "/v1/accounts",
        Some(json!({"name": "alice2", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_with_referral_code_links_parent() {
    let (app, _repo, _scheduler, _temp) = setup_test_app().await;

    let parent = register(&app, "parent", None).await;
    let code = parent["referralCode"].as_str().unwrap();

    let child = register(&app, "child", Some(code)).await;
    assert_eq!(child["referredBy"], parent["id"]);

    // Unknown codes are ignored, not rejected.
    let orphan = register(&app, "orphan", Some("nope1234")).await;
    assert!(orphan.get("referredBy").is_none());

    let uri = format!("/v1/referrals/users?account={}", parent["id"].as_str().unwrap());
    let (status, referred) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(referred.as_array().unwrap().len(), 1);
    assert_eq!(referred[0]["id"], child["id"]);
}

#[tokio::test]
async fn test_catalog_lists_reference_tiers() {
    let (app, _repo, _scheduler, _temp) = setup_test_app().await;

    let (status, tiers) = send_json(&app, "GET", "/v1/rigs/catalog", None).await;
    assert_eq!(status, StatusCode::OK);

    let tiers = tiers.as_array().unwrap();
    assert_eq!(tiers.len(), 6);
    let rig_4000 = tiers.iter().find(|t| t["rigType"] == "rig_4000").unwrap();
    assert_eq!(rig_4000["dailyReturn"], 80.0);
    assert_eq!(rig_4000["miningDays"], 90);
}

#[tokio::test]
async fn test_purchase_start_and_subcent_tick() {
    let (app, repo, scheduler, _temp) = setup_test_app().await;

    let account = register(&app, "alice", None).await;
    let account_id = account["id"].as_str().unwrap().to_string();

    // Fund via the settlement path.
    send_json(
        &app,
        "POST",
        "/v1/deposits",
        Some(json!({"account": account_id, "amount": "5000", "orderId": "order-1"})),
    )
    .await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/v1/deposits/callback",
        Some(json!({"orderId": "order-1", "status": "success", "amount": "5000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Open a 4000 rig: balance drops to 1000, rig starts stopped.
    let (status, rig) = send_json(
        &app,
        "POST",
        "/v1/rigs",
        Some(json!({"account": account_id, "rigType": "rig_4000", "price": "4000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rig["status"], "stopped");
    assert_eq!(rig["dailyReturn"], "80");

    let uri = format!("/v1/balance?account={}", account_id);
    let (_, body) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(body["balance"], "1000");

    // Start mining.
    let start_uri = format!("/v1/rigs/{}/start", rig["id"].as_str().unwrap());
    let (status, started) = send_json(
        &app,
        "POST",
        &start_uri,
        Some(json!({"account": account_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "active");
    assert!(scheduler.is_running());

    // One 3-second tick: 80 / 28800 rounds to 0.00, balance unchanged.
    scheduler.run_tick_at(TimeMs::now()).await.unwrap();
    let (_, body) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(body["balance"], "1000");

    // The ledger agrees with the HTTP view.
    let stored = repo
        .find_account(&hashfarm::AccountId::new(account_id.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.balance, Decimal::from_i64(1000));

    scheduler.shutdown();
}

#[tokio::test]
async fn test_insufficient_balance_rejected_over_http() {
    let (app, _repo, _scheduler, _temp) = setup_test_app().await;
    let account = register(&app, "alice", None).await;
    let account_id = account["id"].as_str().unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/v1/rigs",
        Some(json!({"account": account_id, "rigType": "rig_4000", "price": "4000"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));
}

#[tokio::test]
async fn test_start_foreign_rig_is_forbidden() {
    let (app, repo, _scheduler, _temp) = setup_test_app().await;
    let alice = register(&app, "alice", None).await;
    let bob = register(&app, "bob", None).await;
    let alice_id = alice["id"].as_str().unwrap().to_string();

    repo.credit_balance(
        &hashfarm::AccountId::new(alice_id.clone()),
        Decimal::from_i64(1000),
    )
    .await
    .unwrap();

    let (_, rig) = send_json(
        &app,
        "POST",
        "/v1/rigs",
        Some(json!({"account": alice_id, "rigType": "rig_1000", "price": "1000"})),
    )
    .await;

    let start_uri = format!("/v1/rigs/{}/start", rig["id"].as_str().unwrap());
    let (status, _) = send_json(
        &app,
        "POST",
        &start_uri,
        Some(json!({"account": bob["id"].as_str().unwrap()})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        "POST",
        "/v1/rigs/missing/start",
        Some(json!({"account": alice_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_withdrawal_flow_over_http() {
    let (app, repo, _scheduler, _temp) = setup_test_app().await;
    let account = register(&app, "alice", None).await;
    let account_id = account["id"].as_str().unwrap().to_string();

    repo.credit_balance(
        &hashfarm::AccountId::new(account_id.clone()),
        Decimal::from_i64(500),
    )
    .await
    .unwrap();

    let (status, withdrawal) = send_json(
        &app,
        "POST",
        "/v1/withdrawals",
        Some(json!({"account": account_id, "amount": "200"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(withdrawal["status"], "pending");

    let (status, body) = send_json(
        &app,
        "POST",
        "/v1/withdrawals",
        Some(json!({"account": account_id, "amount": "400"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));

    let uri = format!("/v1/withdrawals?account={}", account_id);
    let (_, listed) = send_json(&app, "GET", &uri, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_views() {
    let (app, repo, scheduler, _temp) = setup_test_app().await;
    let account = register(&app, "alice", None).await;
    let account_id = account["id"].as_str().unwrap().to_string();

    repo.credit_balance(
        &hashfarm::AccountId::new(account_id.clone()),
        Decimal::from_i64(1000),
    )
    .await
    .unwrap();
    let (_, rig) = send_json(
        &app,
        "POST",
        "/v1/rigs",
        Some(json!({"account": account_id, "rigType": "rig_1000", "price": "1000"})),
    )
    .await;
    let start_uri = format!("/v1/rigs/{}/start", rig["id"].as_str().unwrap());
    send_json(&app, "POST", &start_uri, Some(json!({"account": account_id}))).await;

    let (status, accounts) = send_json(&app, "GET", "/v1/admin/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accounts.as_array().unwrap().len(), 1);

    let (status, rigs) = send_json(&app, "GET", "/v1/admin/rigs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rigs.as_array().unwrap().len(), 1);

    let (status, rewards) = send_json(&app, "GET", "/v1/admin/daily-rewards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rewards[0]["reward"], "20");

    scheduler.shutdown();
}
