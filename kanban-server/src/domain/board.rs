//! Board and List Entities
//!
//! A board owns an ordered sequence of lists; a list owns an ordered
//! sequence of cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::{Card, CardDetail};
use super::entity::{Entity, Ordered, RowId};
use super::label::Label;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: RowId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Board {
    type Id = RowId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A column of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: RowId,
    pub title: String,
    pub description: Option<String>,
    /// Position within the board
    pub order: i32,
    pub board_id: RowId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    pub fn new(title: String, board_id: RowId) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description: None,
            order: 0,
            board_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for List {
    type Id = RowId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Ordered for List {
    fn parent_id(&self) -> RowId {
        self.board_id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

/// List with its cards in order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

/// Full board read: lists, cards, checklists and labels, all in order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTree {
    #[serde(flatten)]
    pub board: Board,
    pub lists: Vec<ListTree>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTree {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<CardDetail>,
}
