//! List handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath};
use crate::domain::{Card, DomainError, List, ListPatch, ListWithCards, Priority, RowId};
use crate::repository::Repository;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListInBoard {
    #[serde(default)]
    pub title: String,
    pub board_id: RowId,
    pub description: Option<String>,
}

/// Card fields accepted on creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewCard {
    pub fn into_card(self, list_id: RowId) -> Card {
        let mut card = Card::new(self.title, list_id);
        card.description = self.description;
        card.priority = self.priority.unwrap_or_default();
        card.due_date = self.due_date;
        card
    }
}

/// GET /api/lists
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<List>>> {
    Ok(Json(state.lists.list().await?))
}

/// POST /api/lists
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewListInBoard>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let mut list = List::new(body.title, body.board_id);
    list.description = body.description;
    let created = state.lists.create(&list).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/lists/{id}
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<ListWithCards>> {
    let list = state
        .lists
        .with_cards(id)
        .await?
        .ok_or_else(|| DomainError::not_found("List", id))?;
    Ok(Json(list))
}

/// PUT /api/lists/{id} - `order` repositions within the board
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(patch): ApiJson<ListPatch>,
) -> ApiResult<Json<List>> {
    Ok(Json(state.lists.apply_patch(id, &patch).await?))
}

/// DELETE /api/lists/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Value>> {
    state.lists.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/lists/{id}/cards
pub async fn cards(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Vec<Card>>> {
    let list = state
        .lists
        .with_cards(id)
        .await?
        .ok_or_else(|| DomainError::not_found("List", id))?;
    Ok(Json(list.cards))
}

/// POST /api/lists/{id}/cards
pub async fn create_card(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<NewCard>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let created = state.cards.create(&body.into_card(id)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
