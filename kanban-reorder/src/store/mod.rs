//! Persistence: the store trait and the in-memory reference backend

mod activity;
mod board;
mod card;
mod command;
mod context;
mod list;
mod memory;

pub use activity::ActivityEntry;
pub use board::GetBoard;
pub use card::{MoveCard, ReorderCards, SetLinkOrder};
pub use command::Execute;
pub use context::{BoardContext, Tables};
pub use list::{MoveList, ReorderLists};
pub use memory::{MemoryStore, StoreCall};

use crate::error::Result;
use crate::types::{BoardId, BoardKey, BoardState, CardId, LinkId, ListId, PositionBatch};
use async_trait::async_trait;

/// Where positions are persisted and board state is read back from.
///
/// Each write is all-or-nothing: on error nothing was stored.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Persist every update in the batch atomically
    async fn submit_position_batch(&self, batch: &PositionBatch) -> Result<()>;

    /// Move a list to another board at `position`
    async fn move_list(&self, list_id: &ListId, new_board_id: &BoardId, position: f64)
        -> Result<()>;

    /// Store a card's link order
    async fn set_link_order(&self, card_id: &CardId, links: &[LinkId]) -> Result<()>;

    /// Current lists-with-cards view of a board
    async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState>;
}
