pub mod api;
pub mod dashboard;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};
use bet_etf_core::EtfCalculator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The calculator shared by all handlers; its snapshot is replaced wholesale.
pub type SharedCalculator = Arc<RwLock<EtfCalculator>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub calculator: SharedCalculator,
}

impl AppState {
    pub fn new(calculator: SharedCalculator) -> Self {
        Self { calculator }
    }

    pub fn from_calculator(calculator: EtfCalculator) -> Self {
        Self::new(Arc::new(RwLock::new(calculator)))
    }
}

/// All dashboard and API routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/health", get(api::health_handler))
        .route("/api/symbols", get(api::symbols_handler))
        .route("/api/symbols/{symbol}", get(api::symbol_handler))
        .route("/api/allocation", post(api::allocation_handler))
        .route("/api/orders", post(api::orders_handler))
        .route("/api/reload", post(api::reload_handler))
        .with_state(state)
}

/// Start the axum server on `0.0.0.0:port`.
pub async fn serve(state: AppState, port: u16) -> Result<(), std::io::Error> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET  /?amount=10000&fee=0.49&size=20");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/symbols?size=20");
    tracing::info!("  GET  /api/symbols/{{symbol}}");
    tracing::info!("  POST /api/allocation");
    tracing::info!("  POST /api/orders");
    tracing::info!("  POST /api/reload");

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
