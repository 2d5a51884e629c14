//! Card Repository Module
//!
//! This module provides card repository functionality split into specialized sub-modules:
//! - card_repo: Core CRUD operations
//! - card_positioning: Reposition / move between lists, patch-with-move

mod card_positioning;
mod card_repo;

pub use card_repo::CardRepository;
pub(crate) use card_repo::{card_detail, cards_in_list};
