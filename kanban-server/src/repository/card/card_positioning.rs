//! Card Positioning Operations
//!
//! Reposition within a list, move across lists, and field updates that
//! carry a move. Every call is one transaction.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::card_repo::{cards_in_list, load_card, write_fields, CardRepository};
use super::super::db::{with_connection, with_transaction};
use super::super::order_store::{CardSlots, SqliteOrderStore};
use super::super::traits::OrderedRepository;
use crate::domain::ordering;
use crate::domain::{Card, CardPatch, DomainResult, RowId};

#[async_trait]
impl OrderedRepository<Card> for CardRepository {
    async fn children(&self, list_id: RowId) -> DomainResult<Vec<Card>> {
        with_connection(&self.conn, |conn| cards_in_list(conn, list_id)).await
    }

    async fn reposition(&self, id: RowId, new_order: i32) -> DomainResult<Card> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<CardSlots>::new(tx);
            ordering::reposition(&mut store, id, new_order)?;
            load_card(tx, id)
        })
        .await
    }

    async fn move_to(&self, id: RowId, list_id: RowId, new_order: Option<i32>) -> DomainResult<Card> {
        with_transaction(&self.conn, |tx| {
            let mut store = SqliteOrderStore::<CardSlots>::new(tx);
            let placed = ordering::move_to_parent(&mut store, id, list_id, new_order)?;
            log::debug!("card {} now at list {} order {}", id, placed.parent_id, placed.order);
            drop_foreign_labels(tx, id)?;
            load_card(tx, id)
        })
        .await
    }
}

impl CardRepository {
    /// Apply a partial update; `listId` / `order` reposition or move the card
    ///
    /// Field changes and the position change commit together or not at all.
    pub async fn apply_patch(&self, id: RowId, patch: &CardPatch) -> DomainResult<Card> {
        with_transaction(&self.conn, |tx| {
            let mut card = load_card(tx, id)?;
            let mut store = SqliteOrderStore::<CardSlots>::new(tx);

            match (patch.list_id, patch.order) {
                (Some(list_id), order) if list_id != card.list_id => {
                    ordering::move_to_parent(&mut store, id, list_id, order)?;
                    drop_foreign_labels(tx, id)?;
                }
                (_, Some(order)) => {
                    ordering::reposition(&mut store, id, order)?;
                }
                _ => {}
            }

            patch.apply(&mut card)?;
            write_fields(tx, id, &card.title, &card)?;
            load_card(tx, id)
        })
        .await
    }
}

/// Unlink labels that belong to a board other than the card's current one
fn drop_foreign_labels(conn: &Connection, card_id: RowId) -> DomainResult<usize> {
    let removed = conn.execute(
        "DELETE FROM card_labels
         WHERE card_id = ?1
           AND label_id IN (
               SELECT lb.id FROM labels lb
               WHERE lb.board_id <> (
                   SELECT l.board_id FROM cards c JOIN lists l ON l.id = c.list_id
                   WHERE c.id = ?1
               )
           )",
        params![card_id],
    )?;
    if removed > 0 {
        log::debug!("card {} left {} label(s) behind on its old board", card_id, removed);
    }
    Ok(removed)
}
