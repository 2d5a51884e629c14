//! Card Entity
//!
//! A card sits at a position inside a list and owns checklist items and labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checklist::ChecklistItem;
use super::entity::{DomainError, DomainResult, Entity, Ordered, RowId};
use super::label::Label;

/// Card / checklist item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown priority '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: RowId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    /// Position within the list
    pub order: i32,
    pub list_id: RowId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// A fresh, unsaved card; id and order are assigned on insert
    pub fn new(title: String, list_id: RowId) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description: None,
            priority: Priority::default(),
            due_date: None,
            is_completed: false,
            order: 0,
            list_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Card {
    type Id = RowId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Ordered for Card {
    fn parent_id(&self) -> RowId {
        self.list_id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

/// Card with its checklist and labels, as returned by card and board reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetail {
    #[serde(flatten)]
    pub card: Card,
    pub checklist_items: Vec<ChecklistItem>,
    pub labels: Vec<Label>,
}
