//! Card handlers
//!
//! Card CRUD, moves between lists, and the card's checklist and labels.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath};
use super::lists::NewCard;
use crate::domain::{
    Card, CardDetail, CardLabel, CardPatch, ChecklistItem, DomainError, Label, Priority, RowId,
};
use crate::repository::{OrderedRepository, Repository};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCardInList {
    pub list_id: RowId,
    #[serde(flatten)]
    pub card: NewCard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCard {
    pub target_list_id: RowId,
    /// Omitted means append to the target list
    pub new_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChecklistItem {
    #[serde(default)]
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachLabel {
    pub label_id: RowId,
}

/// GET /api/cards
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Card>>> {
    Ok(Json(state.cards.list().await?))
}

/// POST /api/cards
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewCardInList>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let created = state.cards.create(&body.card.into_card(body.list_id)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/cards/{id} - with checklist and labels
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<CardDetail>> {
    let card = state
        .cards
        .detail(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Card", id))?;
    Ok(Json(card))
}

/// PUT /api/cards/{id} - fields, and optionally `listId` / `order`
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(patch): ApiJson<CardPatch>,
) -> ApiResult<Json<Card>> {
    Ok(Json(state.cards.apply_patch(id, &patch).await?))
}

/// PUT /api/cards/{id}/move
pub async fn move_card(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<MoveCard>,
) -> ApiResult<Json<Card>> {
    let moved = state
        .cards
        .move_to(id, body.target_list_id, body.new_order)
        .await?;
    Ok(Json(moved))
}

/// DELETE /api/cards/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Value>> {
    state.cards.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/cards/{id}/checklist-items
pub async fn checklist(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Vec<ChecklistItem>>> {
    Ok(Json(checklist_of(&state, id).await?))
}

/// POST /api/cards/{id}/checklist-items
pub async fn create_checklist_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<NewChecklistItem>,
) -> ApiResult<(StatusCode, Json<ChecklistItem>)> {
    let created = add_checklist_item(&state, id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Items of a card in order, 404 when the card is missing
pub(super) async fn checklist_of(state: &AppState, card_id: RowId) -> ApiResult<Vec<ChecklistItem>> {
    if state.cards.find_by_id(card_id).await?.is_none() {
        return Err(DomainError::not_found("Card", card_id));
    }
    Ok(state.checklist.children(card_id).await?)
}

pub(super) async fn add_checklist_item(
    state: &AppState,
    card_id: RowId,
    body: NewChecklistItem,
) -> ApiResult<ChecklistItem> {
    let mut item = ChecklistItem::new(body.title, card_id);
    item.priority = body.priority.unwrap_or_default();
    item.due_date = body.due_date;
    state.checklist.create(&item).await
}

/// GET /api/cards/{id}/labels
pub async fn labels(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(state.labels.for_card(id).await?))
}

/// POST /api/cards/{id}/labels
pub async fn attach_label(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<AttachLabel>,
) -> ApiResult<(StatusCode, Json<CardLabel>)> {
    let link = state.labels.attach(id, body.label_id).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/cards/{id}/labels/{label_id}
pub async fn detach_label(
    State(state): State<AppState>,
    ApiPath((id, label_id)): ApiPath<(RowId, RowId)>,
) -> ApiResult<Json<Value>> {
    state.labels.detach(id, label_id).await?;
    Ok(Json(json!({ "success": true })))
}
