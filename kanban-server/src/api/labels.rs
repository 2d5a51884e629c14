//! Label handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath};
use crate::domain::{DomainError, Label, RowId};
use crate::repository::Repository;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LabelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// PUT /api/labels/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(patch): ApiJson<LabelPatch>,
) -> ApiResult<Json<Label>> {
    let mut label = state
        .labels
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Label", id))?;
    if let Some(name) = patch.name {
        label.name = name;
    }
    if let Some(color) = patch.color {
        label.color = color;
    }
    Ok(Json(state.labels.update(&label).await?))
}

/// DELETE /api/labels/{id} - also drops its card links
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Value>> {
    state.labels.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
