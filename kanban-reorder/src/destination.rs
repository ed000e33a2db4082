//! Turning a drop on a target into an insertion index

use crate::edge::{Axis, Edge};

/// Inputs for [`get_reorder_destination_index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderDestination {
    /// Current index of the dragged item, when the caller knows it.
    /// Only informational here; see [`Placement::resolve`].
    pub start_index: Option<usize>,
    pub index_of_target: usize,
    pub closest_edge_of_target: Option<Edge>,
    pub axis: Axis,
}

/// Index the dragged item should be inserted at, counted in the target
/// container as it currently is (dragged item included if it lives there).
///
/// Dropping on the "before" edge of the axis lands at the target's index,
/// the "after" edge one past it. No edge, or an edge off the axis, counts as
/// before.
pub fn get_reorder_destination_index(destination: &ReorderDestination) -> usize {
    let ReorderDestination {
        index_of_target,
        closest_edge_of_target,
        axis,
        ..
    } = *destination;

    match closest_edge_of_target {
        Some(edge) if edge == axis.after_edge() => index_of_target + 1,
        _ => index_of_target,
    }
}

/// Where a resolved drop puts the dragged item among its new siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The item would land exactly where it already is
    NoOp,
    /// Insert at `index` among the siblings, dragged item excluded
    Insert { index: usize },
}

impl Placement {
    /// Convert a destination index into a placement.
    ///
    /// `start_index` is the dragged item's current index when it already
    /// lives in the destination container, `None` for a cross-container move.
    /// For same-container moves the item's own slot is removed first, so a
    /// destination past the start shifts down by one.
    pub fn resolve(start_index: Option<usize>, destination: usize) -> Self {
        match start_index {
            None => Self::Insert { index: destination },
            Some(start) => {
                let index = if destination > start {
                    destination - 1
                } else {
                    destination
                };
                if index == start {
                    Self::NoOp
                } else {
                    Self::Insert { index }
                }
            }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn vertical(index_of_target: usize, edge: Option<Edge>) -> ReorderDestination {
        ReorderDestination {
            start_index: None,
            index_of_target,
            closest_edge_of_target: edge,
            axis: Axis::Vertical,
        }
    }

    #[rstest]
    #[case(Some(Edge::Top), 3)]
    #[case(Some(Edge::Bottom), 4)]
    #[case(None, 3)]
    fn test_vertical_destination(#[case] edge: Option<Edge>, #[case] expected: usize) {
        assert_eq!(get_reorder_destination_index(&vertical(3, edge)), expected);
    }

    #[rstest]
    #[case(Some(Edge::Left), 2)]
    #[case(Some(Edge::Right), 3)]
    #[case(Some(Edge::Bottom), 2)]
    fn test_horizontal_destination(#[case] edge: Option<Edge>, #[case] expected: usize) {
        let destination = ReorderDestination {
            start_index: Some(0),
            index_of_target: 2,
            closest_edge_of_target: edge,
            axis: Axis::Horizontal,
        };
        assert_eq!(get_reorder_destination_index(&destination), expected);
    }

    #[test]
    fn test_start_index_does_not_change_destination() {
        let mut destination = vertical(1, Some(Edge::Bottom));
        destination.start_index = Some(5);
        assert_eq!(get_reorder_destination_index(&destination), 2);
    }

    #[rstest]
    // [A, B, C, D], dragging B (index 1)
    #[case(Some(1), 0, Placement::Insert { index: 0 })] // top of A
    #[case(Some(1), 1, Placement::NoOp)] // bottom of A
    #[case(Some(1), 2, Placement::NoOp)] // top of C
    #[case(Some(1), 3, Placement::Insert { index: 2 })] // bottom of C
    #[case(Some(1), 4, Placement::Insert { index: 3 })] // bottom of D
    #[case(None, 2, Placement::Insert { index: 2 })] // another list
    fn test_placement(
        #[case] start: Option<usize>,
        #[case] destination: usize,
        #[case] expected: Placement,
    ) {
        assert_eq!(Placement::resolve(start, destination), expected);
    }
}
