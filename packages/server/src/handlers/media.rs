use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::MediaRef;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{name}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Serve an uploaded image",
    description = "Streams an image stored by the section image upload. Names are content \
        hashes, so responses are cacheable forever. Supports `If-None-Match`. Public.",
    params(("name" = String, Path, description = "Stored file name, `{sha256}.{ext}`")),
    responses(
        (status = 200, description = "Image content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let media =
        MediaRef::parse(&name).map_err(|_| AppError::NotFound("Media not found".into()))?;

    let etag_value = format!("\"{}\"", media.digest_hex());
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let size = state.media.size(&media).await?;
    let reader = state.media.get_stream(&media).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(media.file_name()).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
