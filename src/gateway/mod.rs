//! HTTP Gateway
//!
//! axum router exposing the withdrawal lifecycle operations, plus the
//! Swagger UI. Request authentication proper is handled upstream; the
//! gateway resolves `X-User-ID` into an [`crate::account::Actor`] and
//! hands it to the engine, which enforces authorization per operation.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;

use openapi::ApiDoc;
use state::AppState;

/// Build the gateway router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/withdrawals", post(handlers::request_withdrawal))
        .route("/api/v1/withdrawals/{id}", get(handlers::get_withdrawal))
        .route(
            "/api/v1/withdrawals/{id}/approve",
            post(handlers::approve_withdrawal),
        )
        .route(
            "/api/v1/withdrawals/{id}/reject",
            post(handlers::reject_withdrawal),
        )
        .route(
            "/api/v1/withdrawals/{id}/process",
            post(handlers::process_withdrawal),
        )
        .route(
            "/api/v1/withdrawals/{id}/complete",
            post(handlers::complete_withdrawal),
        )
        .route(
            "/api/v1/withdrawals/{id}/cancel",
            post(handlers::cancel_withdrawal),
        )
        .route(
            "/api/v1/campaigns/{id}/withdrawals",
            get(handlers::campaign_withdrawals),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Bind and serve the gateway until shutdown
pub async fn serve(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);

    let router = build_router(state);
    axum::serve(listener, router).await?;
    Ok(())
}
