//! List Repository
//!
//! Lists are ordered within their board. Creation optionally enforces a
//! per-board cap.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::card::cards_in_list;
use super::db::{with_connection, with_transaction, SharedConnection};
use super::order_store::{ListSlots, SqliteOrderStore};
use super::traits::{OrderedRepository, Repository};
use crate::domain::ordering::{self, OrderStore};
use crate::domain::{
    optional_text, required_text, DomainError, DomainResult, List, ListPatch, ListWithCards, RowId,
};

const LIST_COLUMNS: &str = r#"id, title, description, "order", board_id, created_at, updated_at"#;

pub struct ListRepository {
    conn: SharedConnection,
    max_per_board: Option<usize>,
}

impl ListRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            max_per_board: None,
        }
    }

    /// Cap the number of lists a board may hold
    pub fn with_max_per_board(mut self, max: Option<usize>) -> Self {
        self.max_per_board = max;
        self
    }

    /// A list with its cards in order
    pub async fn with_cards(&self, id: RowId) -> DomainResult<Option<ListWithCards>> {
        with_connection(&self.conn, |conn| {
            let Some(list) = find_list(conn, id)? else {
                return Ok(None);
            };
            let cards = cards_in_list(conn, list.id)?;
            Ok(Some(ListWithCards { list, cards }))
        })
        .await
    }

    /// Every list of a board in order, each with its cards
    pub async fn board_lists_with_cards(&self, board_id: RowId) -> DomainResult<Vec<ListWithCards>> {
        with_connection(&self.conn, |conn| {
            let mut result = Vec::new();
            for list in lists_in_board(conn, board_id)? {
                let cards = cards_in_list(conn, list.id)?;
                result.push(ListWithCards { list, cards });
            }
            Ok(result)
        })
        .await
    }

    /// Apply a partial update; `order` repositions the list in its board
    pub async fn apply_patch(&self, id: RowId, patch: &ListPatch) -> DomainResult<List> {
        with_transaction(&self.conn, |tx| {
            let mut list = load_list(tx, id)?;
            if let Some(order) = patch.order {
                let mut store = SqliteOrderStore::<ListSlots>::new(tx);
                ordering::reposition(&mut store, id, order)?;
            }
            patch.apply(&mut list)?;
            write_fields(tx, &list)?;
            load_list(tx, id)
        })
        .await
    }
}

#[async_trait]
impl Repository<List> for ListRepository {
    async fn create(&self, entity: &List) -> DomainResult<List> {
        let title = required_text("Title", &entity.title)?;
        let description = optional_text(entity.description.as_deref());
        let max_per_board = self.max_per_board;

        with_transaction(&self.conn, |tx| {
            insert_list(tx, entity.board_id, &title, description.as_deref(), max_per_board)
        })
        .await
    }

    async fn find_by_id(&self, id: RowId) -> DomainResult<Option<List>> {
        with_connection(&self.conn, |conn| find_list(conn, id)).await
    }

    async fn list(&self) -> DomainResult<Vec<List>> {
        with_connection(&self.conn, |conn| {
            let sql = format!(
                r#"SELECT {} FROM lists ORDER BY board_id, "order""#,
                LIST_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let lists = stmt
                .query_map([], row_to_list)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lists)
        })
        .await
    }

    async fn update(&self, entity: &List) -> DomainResult<List> {
        let mut list = entity.clone();
        list.title = required_text("Title", &entity.title)?;

        with_transaction(&self.conn, |tx| {
            write_fields(tx, &list)?;
            load_list(tx, list.id)
        })
        .await
    }

    async fn delete(&self, id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<ListSlots>::new(tx);
            ordering::delete(&mut store, id)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl OrderedRepository<List> for ListRepository {
    async fn children(&self, board_id: RowId) -> DomainResult<Vec<List>> {
        with_connection(&self.conn, |conn| lists_in_board(conn, board_id)).await
    }

    async fn reposition(&self, id: RowId, new_order: i32) -> DomainResult<List> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<ListSlots>::new(tx);
            ordering::reposition(&mut store, id, new_order)?;
            load_list(tx, id)
        })
        .await
    }

    /// Moving into another board honors that board's cap
    async fn move_to(&self, id: RowId, board_id: RowId, new_order: Option<i32>) -> DomainResult<List> {
        let max_per_board = self.max_per_board;

        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<ListSlots>::new(tx);
            if let Some(current) = store.placement(id)? {
                if current.parent_id != board_id {
                    ensure_room(&store, board_id, max_per_board)?;
                }
            }
            ordering::move_to_parent(&mut store, id, board_id, new_order)?;
            load_list(tx, id)
        })
        .await
    }
}

/// Append a list to a board, honoring the cap
pub(super) fn insert_list(
    conn: &Connection,
    board_id: RowId,
    title: &str,
    description: Option<&str>,
    max_per_board: Option<usize>,
) -> DomainResult<List> {
    let store = SqliteOrderStore::<ListSlots>::new(conn);
    let order = ordering::append(&store, board_id)?;
    ensure_room(&store, board_id, max_per_board)?;

    let now = Utc::now();
    conn.execute(
        r#"INSERT INTO lists (title, description, "order", board_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)"#,
        params![title, description, order, board_id, now],
    )?;
    load_list(conn, conn.last_insert_rowid() as RowId)
}

/// Fail when `board_id` already holds `max_per_board` lists
fn ensure_room(
    store: &SqliteOrderStore<'_, ListSlots>,
    board_id: RowId,
    max_per_board: Option<usize>,
) -> DomainResult<()> {
    if let Some(max) = max_per_board {
        if store.child_count(board_id)? as usize >= max {
            return Err(DomainError::InvalidInput(format!(
                "Maximum {} lists allowed per board",
                max
            )));
        }
    }
    Ok(())
}

fn write_fields(conn: &Connection, list: &List) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE lists SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
        params![list.title, list.description, Utc::now(), list.id],
    )?;
    if changed == 0 {
        return Err(DomainError::not_found("List", list.id));
    }
    Ok(())
}

fn find_list(conn: &Connection, id: RowId) -> DomainResult<Option<List>> {
    let sql = format!("SELECT {} FROM lists WHERE id = ?1", LIST_COLUMNS);
    let list = conn.query_row(&sql, params![id], row_to_list).optional()?;
    Ok(list)
}

fn load_list(conn: &Connection, id: RowId) -> DomainResult<List> {
    find_list(conn, id)?.ok_or_else(|| DomainError::not_found("List", id))
}

pub(super) fn lists_in_board(conn: &Connection, board_id: RowId) -> DomainResult<Vec<List>> {
    let sql = format!(
        r#"SELECT {} FROM lists WHERE board_id = ?1 ORDER BY "order""#,
        LIST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let lists = stmt
        .query_map(params![board_id], row_to_list)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lists)
}

/// Convert a database row to List
fn row_to_list(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        order: row.get(3)?,
        board_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
