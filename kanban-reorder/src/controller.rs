//! Drag controller: the event surface a host UI wires its elements to
//!
//! The controller turns raw drag events into registry updates and hands
//! completed drops to the orchestrator. Both `drop` and `cancel` end the
//! drag session before anything else happens.

use crate::edge::{attach_closest_edge, Edge, EdgeInput, Point, Rect};
use crate::orchestrator::{PendingReorder, ReorderOrchestrator, ReorderOutcome};
use crate::registry::DragRegistry;
use crate::store::PositionStore;
use crate::types::{BoardKey, DragData, DropData};
use tracing::{debug, trace};

/// Whether `dragged` may be dropped on `target`.
///
/// Lists go on lists of the same board, cards on cards or lists of the same
/// board, links on links of the same card. Nothing drops on itself.
pub fn can_drop(dragged: &DragData, target: &DropData) -> bool {
    match (dragged, target) {
        (
            DragData::List { list_id, board_id },
            DropData::List {
                list_id: target_list,
                board_id: target_board,
                ..
            },
        ) => board_id == target_board && list_id != target_list,
        (
            DragData::Card {
                card_id, board_id, ..
            },
            DropData::Card {
                card_id: target_card,
                board_id: target_board,
                ..
            },
        ) => board_id == target_board && card_id != target_card,
        (DragData::Card { board_id, .. }, DropData::List {
            board_id: target_board,
            ..
        }) => board_id == target_board,
        (
            DragData::Link { link_id, card_id },
            DropData::Link {
                link_id: target_link,
                card_id: target_card,
                ..
            },
        ) => card_id == target_card && link_id != target_link,
        _ => false,
    }
}

/// Routes drag events to the registry and drops to the orchestrator
pub struct DragController<S> {
    registry: DragRegistry,
    orchestrator: ReorderOrchestrator<S>,
}

impl<S: PositionStore + 'static> DragController<S> {
    pub fn new(registry: DragRegistry, orchestrator: ReorderOrchestrator<S>) -> Self {
        Self {
            registry,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &DragRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &ReorderOrchestrator<S> {
        &self.orchestrator
    }

    /// An element started being dragged
    pub fn drag_start(&self, item: DragData) {
        debug!(kind = %item.kind(), "drag start");
        self.registry.start_drag(item);
    }

    /// The pointer entered a drop target. Returns whether the target accepts
    /// the current drag.
    pub fn drag_enter(&self, target: DropData) -> bool {
        match self.registry.state().dragged_item {
            Some(dragged) if can_drop(&dragged, &target) => {
                self.registry.update_drag_over(Some(target));
                true
            }
            _ => false,
        }
    }

    /// The pointer moved over a drop target.
    ///
    /// Recomputes the closest edge using the axis configured for the target
    /// kind and records the target with that edge.
    pub fn drag_over(&self, target: DropData, pointer: Point, bounds: Rect) -> Option<Edge> {
        let dragged = self.registry.state().dragged_item?;
        if !can_drop(&dragged, &target) {
            return None;
        }

        let input = EdgeInput {
            pointer,
            bounds,
            allowed_edges: self.orchestrator.settings().allowed_edges(target.kind()),
        };
        let target = attach_closest_edge(target, &input);
        let edge = target.closest_edge();
        trace!(?edge, "drag over");
        self.registry.update_drag_over(Some(target));
        edge
    }

    /// The pointer left the current drop target
    pub fn drag_leave(&self) {
        self.registry.update_drag_over(None);
    }

    /// The user released the drag on board `key`
    pub fn drop(&self, key: &BoardKey) -> PendingReorder {
        let state = self.registry.state();
        self.registry.end_drag();

        match (state.dragged_item, state.dragged_over_item) {
            (Some(dragged), Some(target)) if can_drop(&dragged, &target) => {
                self.orchestrator.handle_drop(key, &dragged, &target)
            }
            _ => {
                debug!("drop without a target");
                PendingReorder::ready(ReorderOutcome::Cancelled)
            }
        }
    }

    /// The drag was aborted (escape, pointer left the window)
    pub fn cancel(&self) {
        debug!("drag cancelled");
        self.registry.end_drag();
    }
}
