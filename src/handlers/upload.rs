use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::errors::{AppError, Result};
use crate::services::storage::content_type_for;
use crate::state::AppState;

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response> {
    let path = state
        .uploads
        .resolve(&file_name)
        .await
        .ok_or_else(|| AppError::not_found("File not found"))?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| AppError::not_found("File not found"))?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&path).as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=31536000")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("failed to build file response: {}", e)))
}
