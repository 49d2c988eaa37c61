use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::Resource;
use crate::{error::ApiError, state::AppState, store::parse_id};

fn resolve_id<R: Resource>(raw: &str) -> Result<u64, ApiError> {
    parse_id(raw).ok_or_else(|| ApiError::NotFound(format!("{} not found", R::KIND)))
}

#[instrument(skip(state, query), fields(kind = R::KIND))]
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    query: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<Vec<R>>, ApiError> {
    let Query(filter) = query?;
    let records = R::store(&state).list(&filter).await?;
    Ok(Json(records))
}

#[instrument(skip(state), fields(kind = R::KIND))]
pub async fn fetch<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    let id = resolve_id::<R>(&id)?;
    let record = R::store(&state).get(id).await?;
    Ok(Json(record))
}

#[instrument(skip(state, payload), fields(kind = R::KIND))]
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let Json(draft) = payload?;
    let record = R::store(&state).create(draft).await?;
    info!(id = record.id(), "created");
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state, payload), fields(kind = R::KIND))]
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, ApiError> {
    let id = resolve_id::<R>(&id)?;
    let Json(patch) = payload?;
    let record = R::store(&state).update(id, patch).await?;
    info!(id, "updated");
    Ok(Json(record))
}

#[instrument(skip(state), fields(kind = R::KIND))]
pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = resolve_id::<R>(&id)?;
    R::store(&state).delete(id).await?;
    info!(id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}
