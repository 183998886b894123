//! HTTP boundary
//!
//! Serves the single-page form and the endpoint it posts to, plus a few
//! system endpoints for monitoring.

use crate::{Config, FetchPipeline, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod caller;
pub mod error_response;
pub mod openapi;
pub mod page;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use caller::resolve_caller;
pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Form
/// - `GET /` - The form page
/// - `POST /fetch` - Turn a link or search phrase into an MP3 download
///
/// ## System
/// - `GET /capabilities` - Engine and ledger capabilities
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream of pipeline status
pub fn create_router(pipeline: Arc<FetchPipeline>, config: Arc<Config>) -> Router {
    let state = AppState::new(pipeline, config.clone());

    let router = Router::new()
        // Form
        .route("/", get(routes::form_page))
        .route("/fetch", post(routes::fetch_audio))
        // System
        .route("/capabilities", get(routes::get_capabilities))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = if config.server.api.swagger_ui {
        // SwaggerUi registers its own spec route, which must not overlap /openapi.json
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/swagger-ui/openapi.json", ApiDoc::openapi()),
        )
    } else {
        router
    };

    let router = router.with_state(state);

    // The last layer applied is the outermost
    let router = if config.server.api.rate_limit.enabled {
        let limiter = Arc::new(rate_limit::RateLimiter::new(
            config.server.api.rate_limit.clone(),
        ));
        router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ))
    } else {
        router
    };

    let router = if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. See [`start_api_server_with_shutdown`] for a
/// variant that stops on request.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use yt_fetch::{Config, FetchPipeline};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let pipeline = Arc::new(FetchPipeline::from_config(config.clone()).await?);
///
/// yt_fetch::api::start_api_server(pipeline, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(pipeline: Arc<FetchPipeline>, config: Arc<Config>) -> Result<()> {
    start_api_server_with_shutdown(pipeline, config, CancellationToken::new()).await
}

/// Start the API server and stop gracefully once `shutdown` is cancelled
///
/// In-flight requests are allowed to finish. A [`crate::types::Event::Shutdown`]
/// is broadcast so `/events` subscribers can disconnect.
pub async fn start_api_server_with_shutdown(
    pipeline: Arc<FetchPipeline>,
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(pipeline.clone(), config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    // ConnectInfo<SocketAddr> is required by the rate limiting middleware
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.cancelled().await;
        tracing::info!("Shutdown requested, draining in-flight requests");
        pipeline.emit_event(crate::types::Event::Shutdown);
    })
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
