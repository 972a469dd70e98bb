//! Generic handlers shared by every resource route group.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::Value;

use crate::database::{Record, Repository, Resource};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pagination::PageParams;
use crate::record::Payload;
use crate::AppState;

pub(crate) fn repository<R: Resource>(state: &AppState) -> Repository<R> {
    Repository::with_options(state.pool.clone(), state.options.clone())
}

/// Parse the `:id` path segment
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!("Invalid id '{}'", raw))),
    }
}

fn page_params(query: &HashMap<String, String>) -> PageParams {
    PageParams::parse(
        query.get("page").map(String::as_str),
        query.get("limit").map(String::as_str),
    )
}

/// GET {collection}
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<R>> {
    let (pagination, rows) = repository::<R>(&state).list(page_params(&query)).await?;
    Ok(ApiResponse::page(format!("{} records retrieved", R::LABEL), rows, pagination))
}

/// GET {collection}/search
pub async fn search<R: Resource>(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Vec<R>> {
    let (pagination, rows) = repository::<R>(&state).search(&query, page_params(&query)).await?;
    Ok(ApiResponse::page(format!("{} search results", R::LABEL), rows, pagination))
}

/// POST {item}
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Payload,
) -> ApiResult<Record<R>> {
    let record = repository::<R>(&state).create(payload, &user.actor()).await?;
    tracing::info!("{} {} created by {}", R::LABEL, record.row.id(), user.email);
    Ok(ApiResponse::created(format!("{} created", R::LABEL), record))
}

/// GET {item}/:id
pub async fn get<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Record<R>> {
    let id = parse_id(&id)?;
    let record = repository::<R>(&state).get_by_id(id).await?;
    Ok(ApiResponse::success(format!("{} retrieved", R::LABEL), record))
}

/// PUT {item}/:id
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Payload,
) -> ApiResult<Record<R>> {
    let id = parse_id(&id)?;
    let record = repository::<R>(&state).update(id, payload, &user.actor()).await?;
    tracing::info!("{} {} updated by {}", R::LABEL, id, user.email);
    Ok(ApiResponse::success(format!("{} updated", R::LABEL), record))
}

/// DELETE {item}/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    repository::<R>(&state).delete(id).await?;
    tracing::info!("{} {} deleted by {}", R::LABEL, id, user.email);
    Ok(ApiResponse::success(format!("{} deleted", R::LABEL), Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
    }

    #[test]
    fn page_params_come_from_query() {
        let query: HashMap<String, String> =
            [("page".to_string(), "2".to_string()), ("limit".to_string(), "500".to_string())].into();
        assert_eq!(page_params(&query), PageParams { page: 2, limit: 100 });
        assert_eq!(page_params(&HashMap::new()), PageParams::default());
    }
}
