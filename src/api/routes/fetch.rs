//! Form handlers: the page and the fetch endpoint.

use super::FetchRequest;
use crate::api::{AppState, page, resolve_caller};
use crate::error::{ApiError, Error};
use crate::utils::content_disposition;
use axum::{
    Form, Json,
    async_trait,
    extract::{FromRequest, Request, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
};

/// Header carrying the URL-encoded resolved title
pub const MEDIA_TITLE_HEADER: &str = "x-media-title";

/// GET / - The form page
#[utoipa::path(
    get,
    path = "/",
    tag = "form",
    responses(
        (status = 200, description = "HTML form page", content_type = "text/html")
    )
)]
pub async fn form_page(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.config.download.direct_markers))
}

#[async_trait]
impl<S> FromRequest<S> for FetchRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let parsed = if is_json {
            Json::<FetchRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else {
            Form::<FetchRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| rejection.body_text())
        };

        parsed.map_err(|message| {
            (StatusCode::BAD_REQUEST, Json(ApiError::validation(message))).into_response()
        })
    }
}

/// POST /fetch - Turn a link or search phrase into an MP3 download
///
/// Blocks until the engine finishes. The response body is the audio file.
#[utoipa::path(
    post,
    path = "/fetch",
    tag = "form",
    request_body(
        content = FetchRequest,
        description = "Link or search phrase, as JSON or urlencoded form",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "The converted audio file", content_type = "audio/mpeg"),
        (status = 400, description = "Empty query or malformed body", body = crate::error::ApiError),
        (status = 404, description = "Engine succeeded but no output file was found", body = crate::error::ApiError),
        (status = 502, description = "Engine reported an error", body = crate::error::ApiError),
        (status = 503, description = "Engine could not be started", body = crate::error::ApiError)
    )
)]
pub async fn fetch_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: FetchRequest,
) -> Result<Response, Error> {
    let caller = resolve_caller(&headers);
    tracing::debug!(caller = %caller, "Fetch requested");

    let artifact = state.pipeline.fetch(&request.query, &caller).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&artifact.file_name))
        .map_err(|e| Error::Other(format!("invalid Content-Disposition header: {e}")))?;
    let title = HeaderValue::from_str(&urlencoding::encode(&artifact.title))
        .map_err(|e| Error::Other(format!("invalid title header: {e}")))?;

    let mut response = (StatusCode::OK, artifact.bytes).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    response_headers.insert(CONTENT_DISPOSITION, disposition);
    response_headers.insert(HeaderName::from_static(MEDIA_TITLE_HEADER), title);

    Ok(response)
}
