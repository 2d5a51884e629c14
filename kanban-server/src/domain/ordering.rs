//! Ordering Engine
//!
//! Keeps the `order` column of every parent's children dense: the children
//! of a parent always sit at exactly `0..n`. The algorithm is written once
//! against [`OrderStore`] and instantiated per collection (cards in a list,
//! lists in a board, checklist items in a card) by the repository layer.
//!
//! None of these functions commit anything. Callers run them inside one
//! store transaction and roll back on any error, so a failed step never
//! leaves a parent with gaps or duplicates.

use super::entity::{DomainError, DomainResult, RowId};

/// Where a row sits: its parent and its position among the parent's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: RowId,
    pub order: i32,
}

/// Inclusive range of `order` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRange {
    /// `lo..=hi`
    Between(i32, i32),
    /// `lo..`
    From(i32),
}

impl OrderRange {
    pub fn contains(&self, order: i32) -> bool {
        match *self {
            OrderRange::Between(lo, hi) => lo <= order && order <= hi,
            OrderRange::From(lo) => lo <= order,
        }
    }
}

/// Names one ordered collection for messages
pub trait OrderedCollection {
    /// Child kind, e.g. "Card"
    const KIND: &'static str;
    /// Parent kind, e.g. "List"
    const PARENT_KIND: &'static str;
}

/// Row-level access the engine needs from a persistent store
///
/// Implementations are expected to be bound to an open transaction.
pub trait OrderStore {
    type Collection: OrderedCollection;

    fn parent_exists(&self, parent_id: RowId) -> DomainResult<bool>;

    fn placement(&self, id: RowId) -> DomainResult<Option<Placement>>;

    fn child_count(&self, parent_id: RowId) -> DomainResult<i32>;

    fn max_order(&self, parent_id: RowId) -> DomainResult<Option<i32>>;

    /// Add `delta` to the order of every child of `parent_id` inside `range`
    fn shift(&mut self, parent_id: RowId, range: OrderRange, delta: i32) -> DomainResult<usize>;

    /// Set parent and order of a single row
    fn place(&mut self, id: RowId, placement: Placement) -> DomainResult<()>;

    fn remove(&mut self, id: RowId) -> DomainResult<()>;
}

/// Order for a new last child of `parent_id`
///
/// Nothing is renumbered; the caller inserts the row at the returned order.
pub fn append<S: OrderStore>(store: &S, parent_id: RowId) -> DomainResult<i32> {
    ensure_parent(store, parent_id)?;
    Ok(store.max_order(parent_id)?.map_or(0, |max| max + 1))
}

/// Delete a row and close the gap behind it
pub fn delete<S: OrderStore>(store: &mut S, id: RowId) -> DomainResult<Placement> {
    let placement = locate(store, id)?;
    store.remove(id)?;
    store.shift(placement.parent_id, OrderRange::From(placement.order + 1), -1)?;
    Ok(placement)
}

/// Move a row to `new_order` within its current parent
///
/// `new_order` must lie in `0..n`; anything else is rejected untouched.
pub fn reposition<S: OrderStore>(store: &mut S, id: RowId, new_order: i32) -> DomainResult<Placement> {
    let current = locate(store, id)?;
    let last = store.child_count(current.parent_id)? - 1;
    check_target::<S::Collection>(new_order, last)?;
    shift_within(store, id, current, new_order)
}

/// Move a row under `new_parent_id` at `new_order` (appended when `None`)
///
/// Moving to the row's own parent is a [`reposition`], with `None` meaning
/// the last position.
pub fn move_to_parent<S: OrderStore>(
    store: &mut S,
    id: RowId,
    new_parent_id: RowId,
    new_order: Option<i32>,
) -> DomainResult<Placement> {
    let current = locate(store, id)?;

    if new_parent_id == current.parent_id {
        let last = store.child_count(current.parent_id)? - 1;
        let target = new_order.unwrap_or(last);
        check_target::<S::Collection>(target, last)?;
        return shift_within(store, id, current, target);
    }

    ensure_parent(store, new_parent_id)?;
    let target_count = store.child_count(new_parent_id)?;
    let target = new_order.unwrap_or(target_count);
    check_target::<S::Collection>(target, target_count)?;

    store.shift(current.parent_id, OrderRange::From(current.order + 1), -1)?;
    store.shift(new_parent_id, OrderRange::From(target), 1)?;

    let placed = Placement {
        parent_id: new_parent_id,
        order: target,
    };
    store.place(id, placed)?;
    Ok(placed)
}

/// True when `orders` is a permutation of `0..len`
pub fn is_contiguous(orders: impl IntoIterator<Item = i32>) -> bool {
    let mut sorted: Vec<i32> = orders.into_iter().collect();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(idx, order)| *order == idx as i32)
}

fn shift_within<S: OrderStore>(
    store: &mut S,
    id: RowId,
    current: Placement,
    new_order: i32,
) -> DomainResult<Placement> {
    let old_order = current.order;
    if new_order == old_order {
        return Ok(current);
    }

    if new_order > old_order {
        // Moving down: (old, new] slides up by one
        store.shift(current.parent_id, OrderRange::Between(old_order + 1, new_order), -1)?;
    } else {
        // Moving up: [new, old) slides down by one
        store.shift(current.parent_id, OrderRange::Between(new_order, old_order - 1), 1)?;
    }

    let placed = Placement {
        parent_id: current.parent_id,
        order: new_order,
    };
    store.place(id, placed)?;
    Ok(placed)
}

fn locate<S: OrderStore>(store: &S, id: RowId) -> DomainResult<Placement> {
    store
        .placement(id)?
        .ok_or_else(|| DomainError::not_found(S::Collection::KIND, id))
}

fn ensure_parent<S: OrderStore>(store: &S, parent_id: RowId) -> DomainResult<()> {
    if store.parent_exists(parent_id)? {
        Ok(())
    } else {
        Err(DomainError::not_found(S::Collection::PARENT_KIND, parent_id))
    }
}

fn check_target<C: OrderedCollection>(order: i32, max: i32) -> DomainResult<()> {
    if order < 0 || order > max {
        return Err(DomainError::Conflict(format!(
            "{} order {} is out of range 0..={}",
            C::KIND,
            order,
            max
        )));
    }
    Ok(())
}
