//! GalangDana - Withdrawal Engine Service
//!
//! Entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Gateway  │───▶│  Withdrawal  │───▶│ Postgres │
//! │  (YAML)  │    │  (axum)   │    │   Service    │    │ (sqlx)   │
//! └──────────┘    └───────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Without `postgres_url` in the config the service runs on the in-memory
//! store, which is only meant for local development.

use std::sync::Arc;

use galang_dana::config::AppConfig;
use galang_dana::db::Database;
use galang_dana::gateway::{self, state::AppState};
use galang_dana::withdrawal::{LogNotifier, MemoryStore, PgStore, WithdrawalService};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env);
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }

    let _log_guard = galang_dana::logging::init_logging(&config);
    tracing::info!("Starting GalangDana withdrawal engine in {} mode", env);

    let notifier = Arc::new(LogNotifier);

    let (service, db) = match &config.postgres_url {
        Some(url) => {
            let db = Arc::new(Database::connect(url).await?);
            let store = Arc::new(PgStore::new(db.pool().clone()));
            let service = WithdrawalService::new(
                store.clone(),
                store,
                notifier,
                config.withdrawal,
                config.base_url.clone(),
            );
            (service, Some(db))
        }
        None => {
            tracing::warn!("No postgres_url configured, running on the in-memory store");
            let store = Arc::new(MemoryStore::new());
            let service = WithdrawalService::new(
                store.clone(),
                store,
                notifier,
                config.withdrawal,
                config.base_url.clone(),
            );
            (service, None)
        }
    };

    let state = Arc::new(AppState::new(Arc::new(service), db));
    gateway::serve(&config.gateway, state).await
}
