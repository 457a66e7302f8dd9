//! HTTP exposition of the metrics snapshot.

use crate::metrics::PrometheusSink;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::io;
use tokio::net::TcpListener;

/// Default path the snapshot is served on.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Build the router serving `sink` at `path`.
pub fn router(sink: PrometheusSink, path: &str) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(sink)
}

/// Serve `router` on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, router: Router) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Serving metrics on http://{addr}");
    }
    axum::serve(listener, router).await
}

async fn render_metrics(State(sink): State<PrometheusSink>) -> Response {
    match sink.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, sink.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            log::error!("failed to render metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Validate a metrics path given on the command line.
///
/// The path must be absolute and must not contain route pattern syntax.
pub fn parse_metrics_path(src: &str) -> Result<String, String> {
    if !src.starts_with('/') {
        return Err(format!("metrics path must start with '/': {src}"));
    }
    if src.contains([':', '{', '}', '*']) {
        return Err(format!("metrics path must be a literal path: {src}"));
    }
    Ok(src.to_string())
}
