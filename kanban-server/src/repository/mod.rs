//! Repository Layer
//!
//! Data access abstractions and their SQLite implementations.

mod board_repo;
mod card;
mod checklist_repo;
mod db;
mod label_repo;
mod list_repo;
mod order_store;
mod traits;

#[cfg(test)]
mod tests;

pub use board_repo::BoardRepository;
pub use card::CardRepository;
pub use checklist_repo::ChecklistRepository;
pub use db::{init_db, with_connection, DbState, SharedConnection};
pub use label_repo::LabelRepository;
pub use list_repo::ListRepository;
pub use traits::{OrderedRepository, Repository};
