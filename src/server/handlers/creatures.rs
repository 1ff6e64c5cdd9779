//! Catalog handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{info, instrument};

use super::{blocking, json_body};
use crate::catalog::{Creature, CreatureFilter, CreatureQuery, Page, Pagination, SortOrder};
use crate::server::dto::ListParams;
use crate::server::{ApiError, AppState, AuthUser};

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid creature id '{}'", raw)))
}

/// Turns raw query parameters into a listing request.
///
/// Malformed page numbers fall back to defaults; an unknown sort field is an error.
pub fn listing_query(params: ListParams) -> Result<CreatureQuery, ApiError> {
    let sort = params
        .sort
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<SortOrder>())
        .transpose()?;
    let number = |raw: Option<String>| raw.and_then(|v| v.trim().parse::<i64>().ok());
    let pagination = Pagination::new(number(params.page), number(params.limit));
    let filter = CreatureFilter::new(params.creature_type, params.name);
    Ok(CreatureQuery::new(filter, sort, pagination))
}

/// `GET /api/creatures`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Creature>>, ApiError> {
    let query = listing_query(params)?;
    let catalog = state.catalog().clone();
    let page = blocking(move || catalog.list(&query)).await?;
    Ok(Json(page))
}

/// `GET /api/creatures/{id}`.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Creature>, ApiError> {
    let id = parse_id(&id)?;
    let catalog = state.catalog().clone();
    let creature = blocking(move || catalog.get(id)).await?;
    Ok(Json(creature))
}

/// `POST /api/creatures`.
#[instrument(skip_all, fields(user_id = user.user_id()))]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<Creature>, JsonRejection>,
) -> Result<(StatusCode, Json<Creature>), ApiError> {
    let creature = json_body(payload)?;
    let catalog = state.catalog().clone();
    let stored = blocking(move || catalog.create(creature)).await?;
    info!(id = stored.id(), "Creature created");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `PUT /api/creatures/{id}`.
#[instrument(skip_all, fields(user_id = user.user_id()))]
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<Creature>, JsonRejection>,
) -> Result<Json<Creature>, ApiError> {
    let id = parse_id(&id)?;
    let creature = json_body(payload)?;
    let catalog = state.catalog().clone();
    let stored = blocking(move || catalog.update(id, creature)).await?;
    info!(id, "Creature replaced");
    Ok(Json(stored))
}

/// `DELETE /api/creatures/{id}`.
#[instrument(skip_all, fields(user_id = user.user_id()))]
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Creature>, ApiError> {
    let id = parse_id(&id)?;
    let catalog = state.catalog().clone();
    let removed = blocking(move || catalog.delete(id)).await?;
    info!(id, "Creature deleted");
    Ok(Json(removed))
}
