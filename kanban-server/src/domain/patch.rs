//! Partial updates
//!
//! Each patch carries only the fields a client sent. Nullable fields use
//! `Option<Option<T>>`: absent leaves the value alone, `null` clears it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::board::{Board, List};
use super::card::{Card, Priority};
use super::checklist::ChecklistItem;
use super::entity::{optional_text, required_text, DomainResult, RowId};

/// Keep `null` distinct from a missing field
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn patch_description(target: &mut Option<String>, patch: &Option<Option<String>>) {
    if let Some(value) = patch {
        *target = optional_text(value.as_deref());
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl BoardPatch {
    pub fn apply(&self, board: &mut Board) -> DomainResult<()> {
        if let Some(title) = &self.title {
            board.title = required_text("Title", title)?;
        }
        patch_description(&mut board.description, &self.description);
        board.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// New position within the board
    pub order: Option<i32>,
}

impl ListPatch {
    /// Apply field changes; `order` is handled by the ordering engine
    pub fn apply(&self, list: &mut List) -> DomainResult<()> {
        if let Some(title) = &self.title {
            list.title = required_text("Title", title)?;
        }
        patch_description(&mut list.description, &self.description);
        list.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub is_completed: Option<bool>,
    /// Target list; a different list means a move
    pub list_id: Option<RowId>,
    /// Target position in the (possibly new) list
    pub order: Option<i32>,
}

impl CardPatch {
    /// Apply field changes; `list_id` and `order` go through the ordering engine
    pub fn apply(&self, card: &mut Card) -> DomainResult<()> {
        if let Some(title) = &self.title {
            card.title = required_text("Title", title)?;
        }
        patch_description(&mut card.description, &self.description);
        if let Some(priority) = self.priority {
            card.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            card.due_date = due_date;
        }
        if let Some(done) = self.is_completed {
            card.is_completed = done;
        }
        card.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl ChecklistPatch {
    pub fn apply(&self, item: &mut ChecklistItem) -> DomainResult<()> {
        if let Some(title) = &self.title {
            item.title = required_text("Title", title)?;
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        if let Some(done) = self.is_completed {
            item.is_completed = done;
        }
        if let Some(due_date) = self.due_date {
            item.due_date = due_date;
        }
        item.updated_at = Utc::now();
        Ok(())
    }
}
