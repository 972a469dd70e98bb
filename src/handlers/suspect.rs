use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use super::resource::{parse_id, repository};
use crate::database::models::Suspect;
use crate::error::ApiError;
use crate::AppState;

async fn blob_response(state: &AppState, id: &str, column: &str) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    match repository::<Suspect>(state).blob(id, column).await? {
        Some(data) => Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data).into_response()),
        None => Err(ApiError::not_found(format!("Suspect {} has no {}", id, column))),
    }
}

/// GET /api/suspect/:id/photo
pub async fn photo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    blob_response(&state, &id, Suspect::PHOTO).await
}

/// GET /api/suspect/:id/fingerprints
pub async fn fingerprints(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    blob_response(&state, &id, Suspect::FINGERPRINTS).await
}
