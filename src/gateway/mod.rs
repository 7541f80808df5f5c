//! HTTP Gateway
//!
//! Axum router exposing the transfer engine. All state is shared via
//! [`AppState`]; handlers stay thin and the orchestrator owns the
//! pipeline.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

use state::AppState;

/// Build the application router.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/transactions", post(handlers::create_transaction))
        .route("/transactions/{transaction_id}", get(handlers::get_transaction))
        .route("/accounts/{account_number}", get(handlers::get_account));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("gateway listening on http://{}", addr);
    info!("api docs at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
