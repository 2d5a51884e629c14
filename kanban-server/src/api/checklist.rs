//! Checklist item handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::cards::{add_checklist_item, checklist_of, NewChecklistItem};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::{ChecklistItem, ChecklistPatch, RowId};
use crate::repository::Repository;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFilter {
    pub card_id: RowId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemOnCard {
    pub card_id: RowId,
    #[serde(flatten)]
    pub item: NewChecklistItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItem {
    pub new_order: i32,
    /// When present, must match the item's card
    pub card_id: Option<RowId>,
}

/// GET /api/checklist-items?cardId=
pub async fn list_for_card(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CardFilter>,
) -> ApiResult<Json<Vec<ChecklistItem>>> {
    Ok(Json(checklist_of(&state, filter.card_id).await?))
}

/// POST /api/checklist-items
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewItemOnCard>,
) -> ApiResult<(StatusCode, Json<ChecklistItem>)> {
    let created = add_checklist_item(&state, body.card_id, body.item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/checklist-items/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(patch): ApiJson<ChecklistPatch>,
) -> ApiResult<Json<ChecklistItem>> {
    Ok(Json(state.checklist.apply_patch(id, &patch).await?))
}

/// PUT /api/checklist-items/{id}/reorder
pub async fn reorder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<ReorderItem>,
) -> ApiResult<Json<ChecklistItem>> {
    let item = state
        .checklist
        .reorder_in_card(id, body.card_id, body.new_order)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/checklist-items/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Value>> {
    state.checklist.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
