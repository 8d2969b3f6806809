//! HTTP surface of the notification controller.
//!
//! Two planes share one listener: the ingress plane accepts events from
//! other controllers on `POST /` and fans them out to providers, and the
//! webhook plane authenticates external hooks on `POST /hook/<digest>` and
//! requests reconciliation of the receiver's resources.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::{info, Level};

use notify_store::ObjectStore;

mod hooks;
mod ingress;
mod matcher;
mod notifiers;
mod reconcile;
mod state;

pub use reconcile::reconcile_receivers;
pub use state::AppState;

pub struct GatewaySettings {
    pub bind: SocketAddr,
    /// Reject events whose involved object lives outside the alert's
    /// namespace.
    pub no_cross_namespace_refs: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(ingress::handle_event))
        .route("/hook/:digest", post(hooks::handle_hook))
        .route("/healthz", get(probe))
        .route("/readyz", get(probe))
        .with_state(state)
}

pub async fn run_gateway_server(
    store: Arc<dyn ObjectStore>,
    settings: GatewaySettings,
) -> Result<()> {
    let state = AppState::new(store, settings.no_cross_namespace_refs);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    let app = build_router(state).layer(trace_layer);

    info!("Starting notification gateway on {}", settings.bind);
    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn probe() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
