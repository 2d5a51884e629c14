//! Label Entity
//!
//! Labels belong to a board and can be attached to any card of that board.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity, RowId};

/// A board-scoped label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: RowId,
    pub name: String,
    /// Color (hex, e.g., "#FF5733")
    pub color: String,
    pub board_id: RowId,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(name: String, color: String, board_id: RowId) -> Self {
        Self {
            id: 0,
            name,
            color,
            board_id,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Label {
    type Id = RowId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Join table entry for card-label relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLabel {
    pub id: RowId,
    pub card_id: RowId,
    pub label_id: RowId,
    pub label: Label,
}

/// Validate a `#RGB` / `#RRGGBB` color
pub fn parse_color(value: &str) -> DomainResult<String> {
    static HEX: OnceLock<Regex> = OnceLock::new();
    let hex = HEX.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color pattern")
    });

    let value = value.trim();
    if !hex.is_match(value) {
        return Err(DomainError::InvalidInput(format!(
            "'{}' is not a hex color",
            value
        )));
    }
    Ok(value.to_string())
}
