//! Kanban Board Backend
//!
//! Layered architecture:
//! - domain: Core entities, the ordering engine and business rules
//! - repository: SQLite data access behind async repository traits
//! - api: axum handlers exposing the repositories as JSON

use std::sync::Arc;

use axum::Router;

pub mod api;
pub mod config;
pub mod domain;
pub mod repository;

pub use config::Config;

use repository::{
    init_db, BoardRepository, CardRepository, ChecklistRepository, DbState, LabelRepository,
    ListRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub config: Arc<Config>,
    pub boards: Arc<BoardRepository>,
    pub lists: Arc<ListRepository>,
    pub cards: Arc<CardRepository>,
    pub checklist: Arc<ChecklistRepository>,
    pub labels: Arc<LabelRepository>,
}

impl AppState {
    pub fn new(db: DbState, config: Config) -> Self {
        let conn = db.connection();
        Self {
            boards: Arc::new(BoardRepository::new(conn.clone())),
            lists: Arc::new(
                ListRepository::new(conn.clone()).with_max_per_board(config.max_lists_per_board),
            ),
            cards: Arc::new(CardRepository::new(conn.clone())),
            checklist: Arc::new(ChecklistRepository::new(conn.clone())),
            labels: Arc::new(LabelRepository::new(conn)),
            config: Arc::new(config),
            db,
        }
    }
}

/// Build the HTTP application for a state
pub fn build_app(state: AppState) -> Router {
    api::router(state)
}

/// Start logging, open the database and serve until the process stops
pub async fn run(config: Config) -> anyhow::Result<()> {
    rolling_logger::init_logger(&config.log_dir, "KanbanServer").map_err(anyhow::Error::msg)?;

    let db = match init_db(&config.db_path).await {
        Ok(db) => db,
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            return Err(e.into());
        }
    };

    let addr = config.http_addr;
    let app = build_app(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let _ = rolling_logger::info(&format!("Kanban server listening on {}", addr));
    axum::serve(listener, app).await?;
    Ok(())
}
