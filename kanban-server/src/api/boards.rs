//! Board handlers
//!
//! Boards, plus the lists and labels created underneath them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::{ApiJson, ApiPath};
use crate::domain::{
    Board, BoardPatch, BoardTree, DomainError, Label, List, ListWithCards, RowId,
};
use crate::repository::Repository;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewBoard {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewList {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewLabel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// GET /api/boards
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.boards.list().await?))
}

/// POST /api/boards - seeds the configured default lists
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewBoard>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    let board = Board::new(body.title, body.description);
    let created = state
        .boards
        .create_with_lists(
            &board,
            &state.config.default_lists,
            state.config.max_lists_per_board,
        )
        .await?;
    log::info!("Created board {} '{}'", created.id, created.title);
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/boards/{id} - the whole tree
pub async fn get_tree(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<BoardTree>> {
    let tree = state
        .boards
        .find_tree(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Board", id))?;
    Ok(Json(tree))
}

/// PUT /api/boards/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(patch): ApiJson<BoardPatch>,
) -> ApiResult<Json<Board>> {
    Ok(Json(state.boards.apply_patch(id, &patch).await?))
}

/// DELETE /api/boards/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Value>> {
    state.boards.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/boards/{id}/lists
pub async fn lists(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Vec<ListWithCards>>> {
    if state.boards.find_by_id(id).await?.is_none() {
        return Err(DomainError::not_found("Board", id));
    }
    Ok(Json(state.lists.board_lists_with_cards(id).await?))
}

/// POST /api/boards/{id}/lists
pub async fn create_list(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<NewList>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let mut list = List::new(body.title, id);
    list.description = body.description;
    let created = state.lists.create(&list).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/boards/{id}/labels
pub async fn labels(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(state.labels.for_board(id).await?))
}

/// POST /api/boards/{id}/labels
pub async fn create_label(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(body): ApiJson<NewLabel>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    let label = Label::new(body.name, body.color, id);
    let created = state.labels.create(&label).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
