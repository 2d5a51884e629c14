//! HTTP Layer
//!
//! JSON handlers over the repositories, mounted under `/api`.
//!
//! - [`boards`] - boards, their lists and labels
//! - [`lists`] - lists and the cards created in them
//! - [`cards`] - cards, moves, checklist items and label links
//! - [`checklist`] - checklist items by id or by card
//! - [`labels`] - labels by id

mod boards;
mod cards;
mod checklist;
mod error;
mod extract;
mod labels;
mod lists;

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiResult;
pub use extract::{ApiJson, ApiPath};

use crate::repository::with_connection;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/logs/recent", get(recent_logs))
        .route("/boards", get(boards::list).post(boards::create))
        .route(
            "/boards/{id}",
            get(boards::get_tree).put(boards::update).delete(boards::delete),
        )
        .route(
            "/boards/{id}/lists",
            get(boards::lists).post(boards::create_list),
        )
        .route(
            "/boards/{id}/labels",
            get(boards::labels).post(boards::create_label),
        )
        .route("/lists", get(lists::list).post(lists::create))
        .route(
            "/lists/{id}",
            get(lists::get).put(lists::update).delete(lists::delete),
        )
        .route(
            "/lists/{id}/cards",
            get(lists::cards).post(lists::create_card),
        )
        .route("/cards", get(cards::list).post(cards::create))
        .route(
            "/cards/{id}",
            get(cards::get).put(cards::update).delete(cards::delete),
        )
        .route("/cards/{id}/move", put(cards::move_card))
        .route(
            "/cards/{id}/checklist-items",
            get(cards::checklist).post(cards::create_checklist_item),
        )
        .route(
            "/cards/{id}/labels",
            get(cards::labels).post(cards::attach_label),
        )
        .route(
            "/cards/{id}/labels/{label_id}",
            axum::routing::delete(cards::detach_label),
        )
        .route(
            "/checklist-items",
            get(checklist::list_for_card).post(checklist::create),
        )
        .route(
            "/checklist-items/{id}",
            put(checklist::update).delete(checklist::delete),
        )
        .route("/checklist-items/{id}/reorder", put(checklist::reorder))
        .route("/labels/{id}", put(labels::update).delete(labels::delete))
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = with_connection(&state.db.connection(), |conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    })
    .await
    .is_ok();
    let status = if db_ok { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "db": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/logs/recent
async fn recent_logs() -> Json<Value> {
    Json(json!({ "lines": rolling_logger::recent_lines() }))
}
