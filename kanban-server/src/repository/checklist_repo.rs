//! Checklist Item Repository
//!
//! Items are ordered within their card.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::db::{with_connection, with_transaction, SharedConnection};
use super::order_store::{ChecklistSlots, SqliteOrderStore};
use super::traits::{OrderedRepository, Repository};
use crate::domain::ordering;
use crate::domain::{required_text, ChecklistItem, ChecklistPatch, DomainError, DomainResult, RowId};

const ITEM_COLUMNS: &str =
    r#"id, title, priority, is_completed, due_date, "order", card_id, created_at, updated_at"#;

pub struct ChecklistRepository {
    conn: SharedConnection,
}

impl ChecklistRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub async fn apply_patch(&self, id: RowId, patch: &ChecklistPatch) -> DomainResult<ChecklistItem> {
        with_transaction(&self.conn, |tx| {
            let mut item = load_item(tx, id)?;
            patch.apply(&mut item)?;
            write_fields(tx, &item)?;
            load_item(tx, id)
        })
        .await
    }

    /// Reposition an item inside its card
    ///
    /// `card_id`, when given, must name the card the item already belongs to.
    pub async fn reorder_in_card(
        &self,
        id: RowId,
        card_id: Option<RowId>,
        new_order: i32,
    ) -> DomainResult<ChecklistItem> {
        with_transaction(&self.conn, |tx| {
            let item = load_item(tx, id)?;
            if let Some(card_id) = card_id.filter(|c| *c != item.card_id) {
                return Err(DomainError::InvalidInput(format!(
                    "Checklist item {} does not belong to card {}",
                    id, card_id
                )));
            }
            let mut store = SqliteOrderStore::<ChecklistSlots>::new(tx);
            ordering::reposition(&mut store, id, new_order)?;
            load_item(tx, id)
        })
        .await
    }
}

#[async_trait]
impl Repository<ChecklistItem> for ChecklistRepository {
    async fn create(&self, entity: &ChecklistItem) -> DomainResult<ChecklistItem> {
        let title = required_text("Title", &entity.title)?;

        with_transaction(&self.conn, |tx| {
            let store = SqliteOrderStore::<ChecklistSlots>::new(tx);
            let order = ordering::append(&store, entity.card_id)?;
            let now = Utc::now();
            tx.execute(
                r#"INSERT INTO checklist_items (title, priority, is_completed, due_date, "order", card_id, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)"#,
                params![
                    title,
                    entity.priority,
                    entity.is_completed,
                    entity.due_date,
                    order,
                    entity.card_id,
                    now
                ],
            )?;
            load_item(tx, tx.last_insert_rowid() as RowId)
        })
        .await
    }

    async fn find_by_id(&self, id: RowId) -> DomainResult<Option<ChecklistItem>> {
        with_connection(&self.conn, |conn| find_item(conn, id)).await
    }

    async fn list(&self) -> DomainResult<Vec<ChecklistItem>> {
        with_connection(&self.conn, |conn| {
            let sql = format!(
                r#"SELECT {} FROM checklist_items ORDER BY card_id, "order""#,
                ITEM_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
    }

    async fn update(&self, entity: &ChecklistItem) -> DomainResult<ChecklistItem> {
        let mut item = entity.clone();
        item.title = required_text("Title", &entity.title)?;

        with_transaction(&self.conn, |tx| {
            write_fields(tx, &item)?;
            load_item(tx, item.id)
        })
        .await
    }

    async fn delete(&self, id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<ChecklistSlots>::new(tx);
            ordering::delete(&mut store, id)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl OrderedRepository<ChecklistItem> for ChecklistRepository {
    async fn children(&self, card_id: RowId) -> DomainResult<Vec<ChecklistItem>> {
        with_connection(&self.conn, |conn| items_in_card(conn, card_id)).await
    }

    async fn reposition(&self, id: RowId, new_order: i32) -> DomainResult<ChecklistItem> {
        self.reorder_in_card(id, None, new_order).await
    }

    async fn move_to(
        &self,
        id: RowId,
        card_id: RowId,
        new_order: Option<i32>,
    ) -> DomainResult<ChecklistItem> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<ChecklistSlots>::new(tx);
            ordering::move_to_parent(&mut store, id, card_id, new_order)?;
            load_item(tx, id)
        })
        .await
    }
}

fn write_fields(conn: &Connection, item: &ChecklistItem) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE checklist_items SET title = ?1, priority = ?2, is_completed = ?3, due_date = ?4, updated_at = ?5 WHERE id = ?6",
        params![
            item.title,
            item.priority,
            item.is_completed,
            item.due_date,
            Utc::now(),
            item.id
        ],
    )?;
    if changed == 0 {
        return Err(DomainError::not_found("Checklist item", item.id));
    }
    Ok(())
}

fn find_item(conn: &Connection, id: RowId) -> DomainResult<Option<ChecklistItem>> {
    let sql = format!("SELECT {} FROM checklist_items WHERE id = ?1", ITEM_COLUMNS);
    let item = conn.query_row(&sql, params![id], row_to_item).optional()?;
    Ok(item)
}

fn load_item(conn: &Connection, id: RowId) -> DomainResult<ChecklistItem> {
    find_item(conn, id)?.ok_or_else(|| DomainError::not_found("Checklist item", id))
}

pub(crate) fn items_in_card(conn: &Connection, card_id: RowId) -> DomainResult<Vec<ChecklistItem>> {
    let sql = format!(
        r#"SELECT {} FROM checklist_items WHERE card_id = ?1 ORDER BY "order""#,
        ITEM_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![card_id], row_to_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get(0)?,
        title: row.get(1)?,
        priority: row.get(2)?,
        is_completed: row.get(3)?,
        due_date: row.get(4)?,
        order: row.get(5)?,
        card_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
