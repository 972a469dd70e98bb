use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::auth::{AuthError, Claims, TokenKeys, TokenPair};
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or username
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v).map_err(|e| ApiError::bad_request(e.body_text()))
}

/// POST /api/login - exchange officer credentials for a token pair
///
/// Unknown identifiers and wrong passwords produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let request = json_body(body)?;
    let identifier = request.identifier.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("identifier and password are required"));
    }

    let officer = service::find_officer_by_identifier(&state.pool, identifier)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !crate::auth::verify_password(&request.password, &officer.password) {
        tracing::warn!("Failed login for '{}'", identifier);
        return Err(AuthError::InvalidCredentials.into());
    }

    let roles = service::find_role_names(&state.pool, officer.id).await?;
    let pair = TokenKeys::global().issue_pair(officer.id, &officer.email, &roles)?;
    tracing::info!("Officer {} logged in", officer.id);
    Ok(ApiResponse::success("Login successful", pair))
}

/// POST /api/refresh-token - trade a refresh token for a new pair
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let request = json_body(body)?;
    let keys = TokenKeys::global();
    let claims = keys.decode_refresh(request.refresh_token.trim())?;

    // Roles are re-read so revoked officers and role changes take effect
    let officer = service::find_officer_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
    let roles = service::find_role_names(&state.pool, officer.id).await?;

    let pair = keys.issue_pair(officer.id, &officer.email, &roles)?;
    Ok(ApiResponse::success("Token refreshed", pair))
}

/// GET /api/me - claims of the calling officer
pub async fn me(user: AuthUser) -> ApiResult<Claims> {
    Ok(ApiResponse::success("Authenticated officer", user.claims))
}
