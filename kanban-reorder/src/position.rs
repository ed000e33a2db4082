//! Fractional position allocation for lists and cards.
//!
//! Positions are plain `f64` values. Sorting siblings by position gives the
//! display order; inserting between two siblings takes the midpoint, so no
//! other item is ever renumbered. Gaps left by deletions are harmless.
//!
//! Repeated midpoint insertion at the same spot halves the gap each time and
//! eventually collapses two positions onto the same float. Nothing here
//! detects or repairs that.

use std::fmt;

/// Anything with an id and a position among its siblings
pub trait Orderable {
    type Id: PartialEq + fmt::Display;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> f64;
}

impl<T: Orderable> Orderable for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (*self).id()
    }

    fn position(&self) -> f64 {
        (*self).position()
    }
}

/// Position for an item inserted at `index` among `sorted` siblings.
///
/// - index 0: one below the first sibling
/// - index at or past the end: one above the last sibling
/// - otherwise: midway between the neighbours at `index - 1` and `index`
///
/// An empty sibling list always yields `0.0`.
pub fn calculate_position_for_index<T: Orderable>(sorted: &[T], index: usize) -> f64 {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return 0.0;
    };

    if index == 0 {
        return first.position() - 1.0;
    }
    if index >= sorted.len() {
        return last.position() + 1.0;
    }

    (sorted[index - 1].position() + sorted[index].position()) / 2.0
}

/// Position for moving `moving` to `index` among its own siblings.
///
/// The moving item is taken out of `sorted` first, so `index` counts the
/// remaining siblings only.
pub fn position_for_move<T: Orderable>(sorted: &[T], moving: &T::Id, index: usize) -> f64 {
    let others: Vec<&T> = sorted.iter().filter(|item| item.id() != moving).collect();
    calculate_position_for_index(&others, index)
}

/// Stable sort by position; ties keep their relative order
pub fn sort_by_position<T: Orderable>(items: &mut [T]) {
    items.sort_by(|a, b| a.position().total_cmp(&b.position()));
}
