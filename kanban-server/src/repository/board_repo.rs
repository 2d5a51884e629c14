//! Board Repository
//!
//! Boards are the roots of the hierarchy and carry no order. Deleting a
//! board cascades to its lists, cards, checklist items and labels.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::card::{card_detail, cards_in_list};
use super::db::{with_connection, with_transaction, SharedConnection};
use super::label_repo::labels_in_board;
use super::list_repo::{insert_list, lists_in_board};
use super::traits::Repository;
use crate::domain::{
    optional_text, required_text, Board, BoardPatch, BoardTree, DomainError, DomainResult,
    ListTree, RowId,
};

const BOARD_COLUMNS: &str = "id, title, description, created_at, updated_at";

pub struct BoardRepository {
    conn: SharedConnection,
}

impl BoardRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Create a board and seed it with `default_lists` in one transaction
    ///
    /// Seeding stops at `max_lists` when a cap is configured.
    pub async fn create_with_lists(
        &self,
        board: &Board,
        default_lists: &[String],
        max_lists: Option<usize>,
    ) -> DomainResult<Board> {
        let title = required_text("Title", &board.title)?;
        let description = optional_text(board.description.as_deref());
        let seed = default_lists.len().min(max_lists.unwrap_or(usize::MAX));

        with_transaction(&self.conn, |tx| {
            let id = insert_board(tx, &title, description.as_deref())?;
            for list_title in &default_lists[..seed] {
                insert_list(tx, id, list_title, None, max_lists)?;
            }
            load_board(tx, id)
        })
        .await
    }

    pub async fn apply_patch(&self, id: RowId, patch: &BoardPatch) -> DomainResult<Board> {
        with_transaction(&self.conn, |tx| {
            let mut board = load_board(tx, id)?;
            patch.apply(&mut board)?;
            write_fields(tx, &board)?;
            load_board(tx, id)
        })
        .await
    }

    /// The whole board: ordered lists, ordered cards with their checklist
    /// and labels, and the board's label set
    pub async fn find_tree(&self, id: RowId) -> DomainResult<Option<BoardTree>> {
        with_connection(&self.conn, |conn| {
            let Some(board) = find_board(conn, id)? else {
                return Ok(None);
            };

            let mut lists = Vec::new();
            for list in lists_in_board(conn, id)? {
                let mut cards = Vec::new();
                for card in cards_in_list(conn, list.id)? {
                    cards.push(card_detail(conn, card)?);
                }
                lists.push(ListTree { list, cards });
            }
            let labels = labels_in_board(conn, id)?;

            Ok(Some(BoardTree {
                board,
                lists,
                labels,
            }))
        })
        .await
    }
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn create(&self, entity: &Board) -> DomainResult<Board> {
        self.create_with_lists(entity, &[], None).await
    }

    async fn find_by_id(&self, id: RowId) -> DomainResult<Option<Board>> {
        with_connection(&self.conn, |conn| find_board(conn, id)).await
    }

    /// Newest first
    async fn list(&self) -> DomainResult<Vec<Board>> {
        with_connection(&self.conn, |conn| {
            let sql = format!(
                "SELECT {} FROM boards ORDER BY created_at DESC, id DESC",
                BOARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let boards = stmt
                .query_map([], row_to_board)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(boards)
        })
        .await
    }

    async fn update(&self, entity: &Board) -> DomainResult<Board> {
        let mut board = entity.clone();
        board.title = required_text("Title", &entity.title)?;
        board.description = optional_text(entity.description.as_deref());

        with_transaction(&self.conn, |tx| {
            write_fields(tx, &board)?;
            load_board(tx, board.id)
        })
        .await
    }

    async fn delete(&self, id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let removed = tx.execute("DELETE FROM boards WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(DomainError::not_found("Board", id));
            }
            log::info!("Deleted board {}", id);
            Ok(())
        })
        .await
    }
}

fn insert_board(conn: &Connection, title: &str, description: Option<&str>) -> DomainResult<RowId> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO boards (title, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![title, description, now],
    )?;
    Ok(conn.last_insert_rowid() as RowId)
}

fn write_fields(conn: &Connection, board: &Board) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE boards SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
        params![board.title, board.description, Utc::now(), board.id],
    )?;
    if changed == 0 {
        return Err(DomainError::not_found("Board", board.id));
    }
    Ok(())
}

fn find_board(conn: &Connection, id: RowId) -> DomainResult<Option<Board>> {
    let sql = format!("SELECT {} FROM boards WHERE id = ?1", BOARD_COLUMNS);
    let board = conn.query_row(&sql, params![id], row_to_board).optional()?;
    Ok(board)
}

fn load_board(conn: &Connection, id: RowId) -> DomainResult<Board> {
    find_board(conn, id)?.ok_or_else(|| DomainError::not_found("Board", id))
}

fn row_to_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
