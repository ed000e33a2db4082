//! In-memory reference store

use super::activity::ActivityEntry;
use super::board::GetBoard;
use super::card::{MoveCard, ReorderCards, SetLinkOrder};
use super::command::Execute;
use super::context::BoardContext;
use super::list::{MoveList, ReorderLists};
use super::PositionStore;
use crate::error::{ReorderError, Result};
use crate::types::{
    Board, BoardId, BoardKey, BoardState, Card, CardBatch, CardId, CardLink, LinkId, List, ListId,
    PositionBatch,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};

/// A call received through [`PositionStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Batch(PositionBatch),
    MoveList {
        list_id: ListId,
        new_board_id: BoardId,
        position: f64,
    },
    LinkOrder {
        card_id: CardId,
        links: Vec<LinkId>,
    },
    FetchBoard(BoardKey),
}

impl StoreCall {
    /// Anything other than a fetch
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::FetchBoard(_))
    }
}

/// [`PositionStore`] over an in-memory [`BoardContext`].
///
/// Validates the way a real backend does, records every call and every
/// command's activity, and can be told to fail the next write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ctx: BoardContext,
    failures: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<StoreCall>>,
    activity: Mutex<Vec<ActivityEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &BoardContext {
        &self.ctx
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    pub async fn add_board(&self, name: impl Into<String>) -> Board {
        let board = Board::new(name);
        self.ctx.write().await.insert_board(board.clone());
        board
    }

    /// Append a list to the end of a board
    pub async fn add_list(&self, board_id: &BoardId, name: impl Into<String>) -> Result<List> {
        let mut tables = self.ctx.write().await;
        tables.board(board_id)?;
        let list = List::new(board_id.clone(), name, tables.next_list_position(board_id));
        tables.insert_list(list.clone());
        Ok(list)
    }

    /// Append a card to the end of a list
    pub async fn add_card(&self, list_id: &ListId, content: impl Into<String>) -> Result<Card> {
        let mut tables = self.ctx.write().await;
        tables.list(list_id)?;
        let card = Card::new(list_id.clone(), content, tables.next_card_position(list_id));
        tables.insert_card(card.clone());
        Ok(card)
    }

    /// Append a link to a card
    pub async fn add_link(
        &self,
        card_id: &CardId,
        url: impl Into<String>,
        title: Option<&str>,
    ) -> Result<CardLink> {
        let link = CardLink::new(url, title.map(str::to_string));
        self.ctx.write().await.push_link(card_id, link.clone())?;
        Ok(link)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Make the next write fail with `reason`. Queued failures are used in order.
    pub fn fail_next(&self, reason: impl Into<String>) {
        lock(&self.failures).push_back(reason.into());
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Calls that asked for a change
    pub fn write_calls(&self) -> Vec<StoreCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn activity(&self) -> Vec<ActivityEntry> {
        lock(&self.activity).clone()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run a command, recording activity for mutations
    pub async fn run<C>(&self, cmd: &C) -> Result<C::Output>
    where
        C: Execute<BoardContext, ReorderError> + Serialize,
    {
        let input = serde_json::to_value(cmd)?;
        let start = Instant::now();

        let injected = if cmd.is_mutation() {
            lock(&self.failures).pop_front()
        } else {
            None
        };
        let result = match injected {
            Some(reason) => {
                warn!(op = cmd.op(), %reason, "injected store failure");
                Err(ReorderError::persistence(reason))
            }
            None => cmd.execute(&self.ctx).await,
        };

        if cmd.is_mutation() {
            let duration_ms = start.elapsed().as_millis() as u64;
            let entry = match &result {
                Ok(output) => ActivityEntry::success(
                    cmd.op(),
                    input,
                    serde_json::to_value(output).unwrap_or(Value::Null),
                    duration_ms,
                ),
                Err(e) => ActivityEntry::failure(cmd.op(), input, &e.to_string(), duration_ms),
            };
            debug!(op = cmd.op(), duration_ms, ok = result.is_ok(), "store command finished");
            lock(&self.activity).push(entry);
        }

        result
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }
}

/// A single card leaving its list goes through the dedicated move command
fn single_move(batch: &CardBatch) -> Option<MoveCard> {
    match batch.updates.as_slice() {
        [update] => match &update.new_container_id {
            Some(target) if target != &batch.container_id => Some(MoveCard::new(
                update.item_id.clone(),
                target.clone(),
                update.position,
            )),
            _ => None,
        },
        _ => None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn submit_position_batch(&self, batch: &PositionBatch) -> Result<()> {
        self.record(StoreCall::Batch(batch.clone()));
        match batch {
            PositionBatch::Lists(lists) => self.run(&ReorderLists::new(lists.clone())).await,
            PositionBatch::Cards(cards) => match single_move(cards) {
                Some(cmd) => self.run(&cmd).await,
                None => self.run(&ReorderCards::new(cards.clone())).await,
            },
        }
    }

    async fn move_list(&self, list_id: &ListId, new_board_id: &BoardId, position: f64) -> Result<()> {
        self.record(StoreCall::MoveList {
            list_id: list_id.clone(),
            new_board_id: new_board_id.clone(),
            position,
        });
        self.run(&MoveList::new(list_id.clone(), new_board_id.clone(), position))
            .await
    }

    async fn set_link_order(&self, card_id: &CardId, links: &[LinkId]) -> Result<()> {
        self.record(StoreCall::LinkOrder {
            card_id: card_id.clone(),
            links: links.to_vec(),
        });
        self.run(&SetLinkOrder::new(card_id.clone(), links.to_vec()))
            .await
    }

    async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState> {
        self.record(StoreCall::FetchBoard(key.clone()));
        self.run(&GetBoard::new(key.clone())).await
    }
}
