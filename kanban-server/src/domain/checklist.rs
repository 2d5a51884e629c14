//! Checklist Item Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::Priority;
use super::entity::{Entity, Ordered, RowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: RowId,
    pub title: String,
    pub priority: Priority,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    /// Position within the card's checklist
    pub order: i32,
    pub card_id: RowId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistItem {
    pub fn new(title: String, card_id: RowId) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            priority: Priority::default(),
            is_completed: false,
            due_date: None,
            order: 0,
            card_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for ChecklistItem {
    type Id = RowId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Ordered for ChecklistItem {
    fn parent_id(&self) -> RowId {
        self.card_id
    }

    fn order(&self) -> i32 {
        self.order
    }
}
