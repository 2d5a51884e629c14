//! Card Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Card CRUD operations.
//! Positioning lives in `card_positioning`.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::super::db::{with_connection, with_transaction, SharedConnection};
use super::super::order_store::{CardSlots, SqliteOrderStore};
use super::super::checklist_repo::items_in_card;
use super::super::label_repo::labels_for_card;
use super::super::traits::Repository;
use crate::domain::ordering;
use crate::domain::{optional_text, required_text, Card, CardDetail, DomainError, DomainResult, RowId};

const CARD_COLUMNS: &str = r#"id, title, description, priority, due_date, is_completed, "order", list_id, created_at, updated_at"#;

/// SQLite implementation of Card repository
pub struct CardRepository {
    pub(super) conn: SharedConnection,
}

impl CardRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// A card with its checklist and labels
    pub async fn detail(&self, id: RowId) -> DomainResult<Option<CardDetail>> {
        with_connection(&self.conn, |conn| match find_card(conn, id)? {
            Some(card) => card_detail(conn, card).map(Some),
            None => Ok(None),
        })
        .await
    }
}

#[async_trait]
impl Repository<Card> for CardRepository {
    async fn create(&self, entity: &Card) -> DomainResult<Card> {
        let title = required_text("Title", &entity.title)?;
        let description = optional_text(entity.description.as_deref());

        with_transaction(&self.conn, |tx| {
            let order = ordering::append(&SqliteOrderStore::<CardSlots>::new(tx), entity.list_id)?;
            let now = Utc::now();
            tx.execute(
                r#"INSERT INTO cards (title, description, priority, due_date, is_completed, "order", list_id, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"#,
                params![
                    title,
                    description,
                    entity.priority,
                    entity.due_date,
                    entity.is_completed,
                    order,
                    entity.list_id,
                    now
                ],
            )?;
            let id = tx.last_insert_rowid() as RowId;
            load_card(tx, id)
        })
        .await
    }

    async fn find_by_id(&self, id: RowId) -> DomainResult<Option<Card>> {
        with_connection(&self.conn, |conn| find_card(conn, id)).await
    }

    async fn list(&self) -> DomainResult<Vec<Card>> {
        with_connection(&self.conn, |conn| {
            let sql = format!(
                "SELECT {} FROM cards ORDER BY created_at DESC, id DESC",
                CARD_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let cards = stmt
                .query_map([], row_to_card)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(cards)
        })
        .await
    }

    async fn update(&self, entity: &Card) -> DomainResult<Card> {
        let title = required_text("Title", &entity.title)?;

        with_transaction(&self.conn, |tx| {
            write_fields(tx, entity.id, &title, entity)?;
            load_card(tx, entity.id)
        })
        .await
    }

    async fn delete(&self, id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<CardSlots>::new(tx);
            ordering::delete(&mut store, id)?;
            Ok(())
        })
        .await
    }
}

/// Write a card's own fields (never list or order)
pub(super) fn write_fields(conn: &Connection, id: RowId, title: &str, card: &Card) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE cards SET title = ?1, description = ?2, priority = ?3, due_date = ?4, is_completed = ?5, updated_at = ?6 WHERE id = ?7",
        params![
            title,
            card.description,
            card.priority,
            card.due_date,
            card.is_completed,
            Utc::now(),
            id
        ],
    )?;
    if changed == 0 {
        return Err(DomainError::not_found("Card", id));
    }
    Ok(())
}

fn find_card(conn: &Connection, id: RowId) -> DomainResult<Option<Card>> {
    let sql = format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS);
    let card = conn.query_row(&sql, params![id], row_to_card).optional()?;
    Ok(card)
}

pub(super) fn load_card(conn: &Connection, id: RowId) -> DomainResult<Card> {
    find_card(conn, id)?.ok_or_else(|| DomainError::not_found("Card", id))
}

pub(crate) fn card_detail(conn: &Connection, card: Card) -> DomainResult<CardDetail> {
    let checklist_items = items_in_card(conn, card.id)?;
    let labels = labels_for_card(conn, card.id)?;
    Ok(CardDetail {
        card,
        checklist_items,
        labels,
    })
}

pub(crate) fn cards_in_list(conn: &Connection, list_id: RowId) -> DomainResult<Vec<Card>> {
    let sql = format!(
        r#"SELECT {} FROM cards WHERE list_id = ?1 ORDER BY "order""#,
        CARD_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![list_id], row_to_card)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cards)
}

/// Convert a database row to Card
fn row_to_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: row.get(3)?,
        due_date: row.get(4)?,
        is_completed: row.get(5)?,
        order: row.get(6)?,
        list_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
