//! Label Repository
//!
//! Board-scoped labels and their card links. Labels carry no order.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::db::{with_connection, with_transaction, SharedConnection};
use super::traits::Repository;
use crate::domain::{parse_color, required_text, CardLabel, DomainError, DomainResult, Label, RowId};

const LABEL_COLUMNS: &str = "id, name, color, board_id, created_at";

pub struct LabelRepository {
    conn: SharedConnection,
}

impl LabelRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Labels of a board, by name
    pub async fn for_board(&self, board_id: RowId) -> DomainResult<Vec<Label>> {
        with_connection(&self.conn, |conn| {
            ensure_exists(conn, "boards", "Board", board_id)?;
            labels_in_board(conn, board_id)
        })
        .await
    }

    /// Labels attached to a card
    pub async fn for_card(&self, card_id: RowId) -> DomainResult<Vec<Label>> {
        with_connection(&self.conn, |conn| {
            ensure_exists(conn, "cards", "Card", card_id)?;
            labels_for_card(conn, card_id)
        })
        .await
    }

    /// Link a label to a card of the same board
    pub async fn attach(&self, card_id: RowId, label_id: RowId) -> DomainResult<CardLabel> {
        with_transaction(&self.conn, |tx| {
            let card_board: RowId = tx
                .query_row(
                    "SELECT l.board_id FROM cards c JOIN lists l ON l.id = c.list_id WHERE c.id = ?1",
                    params![card_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| DomainError::not_found("Card", card_id))?;
            let label = find_label(tx, label_id)?
                .ok_or_else(|| DomainError::not_found("Label", label_id))?;

            if label.board_id != card_board {
                return Err(DomainError::InvalidInput(format!(
                    "Label {} belongs to a different board than card {}",
                    label_id, card_id
                )));
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO card_labels (card_id, label_id) VALUES (?1, ?2)",
                params![card_id, label_id],
            )?;
            if inserted == 0 {
                return Err(DomainError::Conflict(format!(
                    "Label {} is already attached to card {}",
                    label_id, card_id
                )));
            }

            Ok(CardLabel {
                id: tx.last_insert_rowid() as RowId,
                card_id,
                label_id,
                label,
            })
        })
        .await
    }

    pub async fn detach(&self, card_id: RowId, label_id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let removed = tx.execute(
                "DELETE FROM card_labels WHERE card_id = ?1 AND label_id = ?2",
                params![card_id, label_id],
            )?;
            if removed == 0 {
                return Err(DomainError::NotFound(format!(
                    "Label {} is not attached to card {}",
                    label_id, card_id
                )));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl Repository<Label> for LabelRepository {
    async fn create(&self, entity: &Label) -> DomainResult<Label> {
        let name = required_text("Name", &entity.name)?;
        let color = parse_color(&entity.color)?;

        with_transaction(&self.conn, |tx| {
            ensure_exists(tx, "boards", "Board", entity.board_id)?;
            tx.execute(
                "INSERT INTO labels (name, color, board_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![name, color, entity.board_id, Utc::now()],
            )?;
            load_label(tx, tx.last_insert_rowid() as RowId)
        })
        .await
    }

    async fn find_by_id(&self, id: RowId) -> DomainResult<Option<Label>> {
        with_connection(&self.conn, |conn| find_label(conn, id)).await
    }

    async fn list(&self) -> DomainResult<Vec<Label>> {
        with_connection(&self.conn, |conn| {
            let sql = format!("SELECT {} FROM labels ORDER BY board_id, name", LABEL_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let labels = stmt
                .query_map([], row_to_label)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(labels)
        })
        .await
    }

    async fn update(&self, entity: &Label) -> DomainResult<Label> {
        let name = required_text("Name", &entity.name)?;
        let color = parse_color(&entity.color)?;

        with_transaction(&self.conn, |tx| {
            let changed = tx.execute(
                "UPDATE labels SET name = ?1, color = ?2 WHERE id = ?3",
                params![name, color, entity.id],
            )?;
            if changed == 0 {
                return Err(DomainError::not_found("Label", entity.id));
            }
            load_label(tx, entity.id)
        })
        .await
    }

    async fn delete(&self, id: RowId) -> DomainResult<()> {
        with_transaction(&self.conn, |tx| {
            let removed = tx.execute("DELETE FROM labels WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(DomainError::not_found("Label", id));
            }
            Ok(())
        })
        .await
    }
}

fn ensure_exists(conn: &Connection, table: &str, kind: &str, id: RowId) -> DomainResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
    conn.query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .ok_or_else(|| DomainError::not_found(kind, id))
}

fn find_label(conn: &Connection, id: RowId) -> DomainResult<Option<Label>> {
    let sql = format!("SELECT {} FROM labels WHERE id = ?1", LABEL_COLUMNS);
    let label = conn.query_row(&sql, params![id], row_to_label).optional()?;
    Ok(label)
}

fn load_label(conn: &Connection, id: RowId) -> DomainResult<Label> {
    find_label(conn, id)?.ok_or_else(|| DomainError::not_found("Label", id))
}

pub(crate) fn labels_in_board(conn: &Connection, board_id: RowId) -> DomainResult<Vec<Label>> {
    let sql = format!(
        "SELECT {} FROM labels WHERE board_id = ?1 ORDER BY name, id",
        LABEL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let labels = stmt
        .query_map(params![board_id], row_to_label)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(labels)
}

pub(crate) fn labels_for_card(conn: &Connection, card_id: RowId) -> DomainResult<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.color, l.board_id, l.created_at FROM labels l
         JOIN card_labels cl ON cl.label_id = l.id
         WHERE cl.card_id = ?1
         ORDER BY l.name, l.id",
    )?;
    let labels = stmt
        .query_map(params![card_id], row_to_label)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(labels)
}

fn row_to_label(row: &Row<'_>) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        board_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}
