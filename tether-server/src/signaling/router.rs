use crate::signaling::{SignalingRelay, ws_handler};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub connections: usize,
    pub rooms: usize,
}

/// `/ws` for the relay, `/api/health` for probes. CORS is open to any origin.
pub fn router(relay: SignalingRelay) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(relay)
}

async fn health(State(relay): State<SignalingRelay>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        connections: relay.connection_count(),
        rooms: relay.room_count(),
    })
}

/// Serve the relay on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, relay: SignalingRelay) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Signaling relay listening on http://{}", addr);
    }
    axum::serve(listener, router(relay)).await
}
