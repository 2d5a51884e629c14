//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.

use async_trait::async_trait;

use crate::domain::{DomainResult, Entity, Ordered, RowId};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity's own fields
    ///
    /// Parent and position are left alone; those only change through
    /// [`OrderedRepository`].
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Repositories whose entities keep a dense `order` within a parent
#[async_trait]
pub trait OrderedRepository<T: Ordered<Id = RowId>>: Repository<T> {
    /// Children of a parent, in order
    async fn children(&self, parent_id: RowId) -> DomainResult<Vec<T>>;

    /// Move an entity to `new_order` within its parent
    async fn reposition(&self, id: RowId, new_order: i32) -> DomainResult<T>;

    /// Move an entity under another parent (appended when `new_order` is `None`)
    async fn move_to(&self, id: RowId, new_parent_id: RowId, new_order: Option<i32>) -> DomainResult<T>;
}
