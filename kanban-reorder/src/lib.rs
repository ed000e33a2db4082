//! Fractional ordering and optimistic drag-and-drop reordering for kanban boards
//!
//! Boards hold lists, lists hold cards, cards hold links. Lists and cards are
//! ordered by a floating-point `position`; links by their order on the card.
//! This crate computes new positions for drops, tracks the drag gesture, and
//! keeps a client-side board cache in step with the persistence layer using
//! optimistic writes that roll back on failure.
//!
//! ## Overview
//!
//! - **Position allocation** - midpoint insertion, siblings are never renumbered
//! - **Edge detection** - which side of a drop target the pointer is nearest
//! - **Destination resolution** - drop target and edge to an insertion index
//! - **Drag registry** - the single observable drag gesture
//! - **Orchestrator** - optimistic apply, persist, confirm or roll back
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_reorder::{
//!     BoardCache, DragController, DragData, DragRegistry, DropData, Edge, MemoryStore,
//!     ReorderOrchestrator,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let board = store.add_board("Roadmap").await;
//! let todo = store.add_list(&board.id, "Todo").await?;
//! let done = store.add_list(&board.id, "Done").await?;
//!
//! let orchestrator = ReorderOrchestrator::new(store, Arc::new(BoardCache::new()));
//! orchestrator.load_board(&board.short_id).await?;
//!
//! let controller = DragController::new(DragRegistry::new(), orchestrator);
//! controller.drag_start(DragData::list(done.id.clone(), board.id.clone()));
//! controller.drag_enter(
//!     DropData::list(todo.id.clone(), board.id.clone()).with_edge(Some(Edge::Left)),
//! );
//! let outcome = controller.drop(&board.short_id).await;
//! assert!(outcome.is_confirmed());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod controller;
pub mod destination;
pub mod edge;
pub mod error;
pub mod notify;
pub mod optimistic;
pub mod orchestrator;
pub mod position;
pub mod registry;
pub mod store;
pub mod types;

pub use cache::QueryCache;
pub use config::{Messages, ReorderSettings, SettingsLoader, ENV_PREFIX};
pub use controller::{can_drop, DragController};
pub use destination::{get_reorder_destination_index, Placement, ReorderDestination};
pub use edge::{
    attach_closest_edge, closest_edge, extract_closest_edge, Axis, Edge, EdgeInput, Point, Rect,
    CLOSEST_EDGE_KEY,
};
pub use error::{ErrorSeverity, ReorderError, Result, Severity};
pub use notify::{BroadcastNotifier, Notification, NotificationQueue, Notifier, TracingNotifier};
pub use optimistic::{with_optimistic_update, OptimisticUpdate};
pub use orchestrator::{BoardCache, PendingReorder, ReorderOrchestrator, ReorderOutcome, ReorderPlan};
pub use position::{calculate_position_for_index, position_for_move, sort_by_position, Orderable};
pub use registry::{DragRegistry, DragState, Subscription};
pub use store::{ActivityEntry, BoardContext, Execute, MemoryStore, PositionStore, StoreCall};
pub use types::*;
