use hashfarm::api;
use hashfarm::domain::{RigCatalog, RigStatus};
use hashfarm::engine::AccrualScheduler;
use hashfarm::{config::Config, db::init_db, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let catalog = Arc::new(RigCatalog::standard());
    let scheduler = Arc::new(AccrualScheduler::new(repo.clone(), &config));

    // Rigs left active by a previous run must not be stranded without accrual.
    match repo.find_rigs_by_status(RigStatus::Active).await {
        Ok(active) if !active.is_empty() => {
            tracing::info!(count = active.len(), "active rigs found, resuming accrual");
            scheduler.ensure_running();
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("Failed to query active rigs: {}", e);
            std::process::exit(1);
        }
    }

    // Create router
    let app = api::create_router(api::AppState::new(repo, config, catalog, scheduler));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
