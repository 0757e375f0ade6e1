//! HTTP endpoint for Prometheus scrapes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tcstat::exposition::{self, TEXT_CONTENT_TYPE};
use tcstat::{HostResolver, QdiscCollector, QdiscSource};

const LANDING_PAGE: &str = r#"<html>
<head><title>tcstat exporter</title></head>
<body>
<h1>tcstat exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;

/// Build the router serving `/` and `/metrics`.
pub fn router<S, H>(collector: Arc<QdiscCollector<S, H>>) -> Router
where
    S: QdiscSource + 'static,
    H: HostResolver + 'static,
{
    Router::new()
        .route("/", get(landing_handler))
        .route("/metrics", get(metrics_handler::<S, H>))
        .with_state(collector)
}

async fn landing_handler() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Handler for GET /metrics - runs one collection and encodes it.
async fn metrics_handler<S, H>(State(collector): State<Arc<QdiscCollector<S, H>>>) -> Response
where
    S: QdiscSource + 'static,
    H: HostResolver + 'static,
{
    let snapshot = collector.snapshot().await;
    tracing::debug!(
        samples = snapshot.samples.len(),
        failures = snapshot.failures.len(),
        "scrape"
    );

    match exposition::encode_text(collector.describe(), &snapshot.samples) {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve until Ctrl-C.
pub async fn serve<S, H>(
    addr: SocketAddr,
    collector: Arc<QdiscCollector<S, H>>,
) -> anyhow::Result<()>
where
    S: QdiscSource + 'static,
    H: HostResolver + 'static,
{
    let app = router(collector);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Prometheus HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
