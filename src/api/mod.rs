//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// HTTP surface of the ingest service, built on Axum.
//
// | Component      | Description                                                |
// |----------------|------------------------------------------------------------|
// | Api            | Binds the listener and serves the router                   |
// | Routes         | Ingest and health handlers                                 |
// | Error          | Mapping from ingest outcomes to HTTP responses             |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|-------------------|
// | AppState       | Shared application state                          | new               |
// | Api            | Main API structure                                | routes, serve     |
//--------------------------------------------------------------------------------------------------

mod error;
mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{any, get},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::inbounds::handlers::telemetry_handler::IngestServices;

pub use error::{
    BAD_REQUEST_MESSAGE, SERVER_ERROR_MESSAGE, TOKEN_PARSE_MESSAGE, TOKEN_VERIFY_MESSAGE,
    into_response,
};

/// Shared application state accessible by all handlers
pub struct AppState {
    pub services: Arc<IngestServices>,
    /// Upper bound on an accepted request body
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(services: IngestServices, max_body_bytes: usize) -> Self {
        Self {
            services: Arc::new(services),
            max_body_bytes,
        }
    }
}

/// Main API structure
pub struct Api {
    addr: SocketAddr,
    ingest_path: String,
    state: Arc<AppState>,
}

impl Api {
    pub fn new(addr: SocketAddr, ingest_path: &str, state: AppState) -> Self {
        Self {
            addr,
            ingest_path: ingest_path.to_string(),
            state: Arc::new(state),
        }
    }

    /// Creates all routes for the API
    ///
    /// The ingest route accepts every method so that non-POST requests get a 405
    /// carrying the `Allow` header rather than the router's default response.
    pub fn routes(&self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route(&self.ingest_path, any(routes::ingest))
            .layer(Extension(self.state.clone()))
            .layer(TraceLayer::new_for_http())
    }

    /// Serves until `shutdown` resolves, then lets in-flight requests finish.
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.routes();

        let listener = TcpListener::bind(self.addr).await?;
        info!(
            "Telemetry ingest listening on {} at {}",
            listener.local_addr()?,
            self.ingest_path
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
