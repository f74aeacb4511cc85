//! HTTP request handlers: metrics scrape, landing page and health.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::LatencyUnit;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error};

use extfilter_core::exposition::{TEXT_CONTENT_TYPE, encode_text};

use crate::state::{AppState, SharedState};

/// Paths served besides the telemetry path.
pub(crate) const RESERVED_PATHS: [&str; 2] = ["/", "/health"];

/// Router with request tracing (debug level) and response compression.
pub(crate) fn app(state: SharedState) -> Router {
    router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::DEBUG)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(CompressionLayer::new())
}

pub(crate) fn router(state: SharedState) -> Router {
    let telemetry_path = state.telemetry_path.clone();
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route(&telemetry_path, get(handle_metrics))
        .with_state(state)
}

// ============================================================
// Metrics
// ============================================================

/// Runs one scrape of the stats file and returns the text exposition.
///
/// The file is read on the blocking pool so slow storage does not stall
/// the runtime.
pub(crate) async fn handle_metrics(State(state): AppState) -> Response {
    let encoded = tokio::task::spawn_blocking(move || encode_text(&state.registry)).await;

    match encoded {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {e}"),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "scrape task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "scrape failed").into_response()
        }
    }
}

// ============================================================
// Landing page / health
// ============================================================

pub(crate) async fn handle_index(State(state): AppState) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>ExtFilter Exporter</title></head>\n\
         <body>\n\
         <h1>ExtFilter Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.telemetry_path
    ))
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}
