//! HTTP server for exposing Prometheus metrics.
//!
//! Serves the registry's current snapshot on `/metrics`. A scrape never
//! triggers a poll; collectors refresh the registry on their own schedule.

use crate::error::{OneViewError, Result};
use crate::metrics::ExporterMetrics;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Build the exporter's router.
pub fn router(metrics: ExporterMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

/// Start the HTTP server. Returns only if binding or serving fails.
///
/// # Examples
///
/// ```no_run
/// use oneview_exporter::metrics::ExporterMetrics;
/// use oneview_exporter::server::start_server;
///
/// #[tokio::main]
/// async fn main() {
///     let metrics = ExporterMetrics::new().unwrap();
///     start_server("0.0.0.0:8080", metrics).await.unwrap();
/// }
/// ```
pub async fn start_server(listen_address: &str, metrics: ExporterMetrics) -> Result<()> {
    let app = router(metrics);

    info!("Starting HTTP server on {}", listen_address);

    let listener = TcpListener::bind(listen_address).await?;

    axum::serve(listener, app)
        .await
        .map_err(|e| OneViewError::Server(e.to_string()))?;

    Ok(())
}

/// Handler for /metrics endpoint.
async fn metrics_handler(State(metrics): State<ExporterMetrics>) -> Response {
    debug!("Received metrics scrape request");

    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}
