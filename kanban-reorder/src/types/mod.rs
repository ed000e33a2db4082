//! Core types for the reordering engine

mod batch;
mod board;
mod drag;
mod ids;

// Re-export all types
pub use batch::{Batch, CardBatch, ListBatch, PositionBatch, PositionUpdate};
pub use board::{Board, BoardState, Card, CardLink, List, ListWithCards};
pub use drag::{DragData, DropData, ItemKind};
pub use ids::{BoardId, BoardKey, CardId, LinkId, ListId};
