//! System handlers: health, capabilities, OpenAPI, events.

use super::HealthResponse;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /capabilities - Query engine and ledger capabilities
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current capabilities", body = crate::types::Capabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.pipeline.capabilities()))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// GET /events - Server-sent events stream
///
/// Carries status events for every request handled by this server.
#[utoipa::path(
    get,
    path = "/events",
    tag = "system",
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let stream = BroadcastStream::new(state.pipeline.subscribe());

    let sse_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json_data) => Some(Ok(SseEvent::default().event(event.kind()).data(json_data))),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE client lagged");
            Some(Ok(SseEvent::default()
                .event("error")
                .data(serde_json::json!({ "error": "lagged", "skipped": skipped }).to_string())))
        }
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
