//! OpenAPI documentation and schema generation
//!
//! Generated at compile time with utoipa. Served at `/openapi.json` and,
//! when enabled, browsable at `/swagger-ui`.

use utoipa::OpenApi;

/// OpenAPI documentation for the yt-fetch HTTP API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "yt-fetch API",
        version = "0.1.0",
        description = "Turn a video link or search phrase into a downloadable MP3",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8501", description = "Local development server")
    ),
    paths(
        // Form
        crate::api::routes::form_page,
        crate::api::routes::fetch_audio,

        // System
        crate::api::routes::get_capabilities,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::Capabilities,
        crate::types::EngineCapabilitiesInfo,
        crate::types::Event,
        crate::types::JobToken,

        crate::api::routes::FetchRequest,
        crate::api::routes::HealthResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "form", description = "The form page and the fetch endpoint it posts to"),
        (name = "system", description = "Health checks, capabilities, OpenAPI spec, status events"),
    )
)]
pub struct ApiDoc;
