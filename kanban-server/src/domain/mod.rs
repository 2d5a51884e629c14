//! Domain Layer
//!
//! Contains all domain entities, the ordering engine and core abstractions.
//! This layer does no I/O.

mod board;
mod card;
mod checklist;
mod entity;
mod label;
pub mod ordering;
mod patch;

pub use board::{Board, BoardTree, List, ListTree, ListWithCards};
pub use card::{Card, CardDetail, Priority};
pub use checklist::ChecklistItem;
pub use entity::{optional_text, required_text, DomainError, DomainResult, Entity, Ordered, RowId};
pub use label::{parse_color, CardLabel, Label};
pub use patch::{BoardPatch, CardPatch, ChecklistPatch, ListPatch};
