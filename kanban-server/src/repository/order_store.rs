//! SQLite binding of the ordering engine
//!
//! One descriptor per ordered table; [`SqliteOrderStore`] turns the engine's
//! row-level requests into statements against an open transaction.

use std::marker::PhantomData;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::ordering::{OrderRange, OrderStore, OrderedCollection, Placement};
use crate::domain::{DomainResult, RowId};

/// Table layout of an ordered collection
pub trait SqlCollection: OrderedCollection {
    const TABLE: &'static str;
    const PARENT_COLUMN: &'static str;
    const PARENT_TABLE: &'static str;
}

/// Cards within a list
pub struct CardSlots;

impl OrderedCollection for CardSlots {
    const KIND: &'static str = "Card";
    const PARENT_KIND: &'static str = "List";
}

impl SqlCollection for CardSlots {
    const TABLE: &'static str = "cards";
    const PARENT_COLUMN: &'static str = "list_id";
    const PARENT_TABLE: &'static str = "lists";
}

/// Lists within a board
pub struct ListSlots;

impl OrderedCollection for ListSlots {
    const KIND: &'static str = "List";
    const PARENT_KIND: &'static str = "Board";
}

impl SqlCollection for ListSlots {
    const TABLE: &'static str = "lists";
    const PARENT_COLUMN: &'static str = "board_id";
    const PARENT_TABLE: &'static str = "boards";
}

/// Checklist items within a card
pub struct ChecklistSlots;

impl OrderedCollection for ChecklistSlots {
    const KIND: &'static str = "Checklist item";
    const PARENT_KIND: &'static str = "Card";
}

impl SqlCollection for ChecklistSlots {
    const TABLE: &'static str = "checklist_items";
    const PARENT_COLUMN: &'static str = "card_id";
    const PARENT_TABLE: &'static str = "cards";
}

/// [`OrderStore`] over a connection, normally a `&Transaction`
pub struct SqliteOrderStore<'a, C> {
    conn: &'a Connection,
    _collection: PhantomData<C>,
}

impl<'a, C: SqlCollection> SqliteOrderStore<'a, C> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            _collection: PhantomData,
        }
    }
}

impl<C: SqlCollection> OrderStore for SqliteOrderStore<'_, C> {
    type Collection = C;

    fn parent_exists(&self, parent_id: RowId) -> DomainResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", C::PARENT_TABLE);
        let found = self
            .conn
            .query_row(&sql, params![parent_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn placement(&self, id: RowId) -> DomainResult<Option<Placement>> {
        let sql = format!(
            r#"SELECT {}, "order" FROM {} WHERE id = ?1"#,
            C::PARENT_COLUMN,
            C::TABLE
        );
        let placement = self
            .conn
            .query_row(&sql, params![id], |row| {
                Ok(Placement {
                    parent_id: row.get(0)?,
                    order: row.get(1)?,
                })
            })
            .optional()?;
        Ok(placement)
    }

    fn child_count(&self, parent_id: RowId) -> DomainResult<i32> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            C::TABLE,
            C::PARENT_COLUMN
        );
        let count: i32 = self.conn.query_row(&sql, params![parent_id], |row| row.get(0))?;
        Ok(count)
    }

    fn max_order(&self, parent_id: RowId) -> DomainResult<Option<i32>> {
        let sql = format!(
            r#"SELECT MAX("order") FROM {} WHERE {} = ?1"#,
            C::TABLE,
            C::PARENT_COLUMN
        );
        let max: Option<i32> = self.conn.query_row(&sql, params![parent_id], |row| row.get(0))?;
        Ok(max)
    }

    fn shift(&mut self, parent_id: RowId, range: OrderRange, delta: i32) -> DomainResult<usize> {
        let now = Utc::now();
        let touched = match range {
            OrderRange::Between(lo, hi) => {
                let sql = format!(
                    r#"UPDATE {} SET "order" = "order" + ?1, updated_at = ?2
                       WHERE {} = ?3 AND "order" >= ?4 AND "order" <= ?5"#,
                    C::TABLE,
                    C::PARENT_COLUMN
                );
                self.conn
                    .execute(&sql, params![delta, now, parent_id, lo, hi])?
            }
            OrderRange::From(lo) => {
                let sql = format!(
                    r#"UPDATE {} SET "order" = "order" + ?1, updated_at = ?2
                       WHERE {} = ?3 AND "order" >= ?4"#,
                    C::TABLE,
                    C::PARENT_COLUMN
                );
                self.conn.execute(&sql, params![delta, now, parent_id, lo])?
            }
        };
        Ok(touched)
    }

    fn place(&mut self, id: RowId, placement: Placement) -> DomainResult<()> {
        let sql = format!(
            r#"UPDATE {} SET {} = ?1, "order" = ?2, updated_at = ?3 WHERE id = ?4"#,
            C::TABLE,
            C::PARENT_COLUMN
        );
        self.conn.execute(
            &sql,
            params![placement.parent_id, placement.order, Utc::now(), id],
        )?;
        Ok(())
    }

    fn remove(&mut self, id: RowId) -> DomainResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", C::TABLE);
        self.conn.execute(&sql, params![id])?;
        Ok(())
    }
}
