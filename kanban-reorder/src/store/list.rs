//! List commands: reorder within a board, move to another board

use super::command::Execute;
use super::context::BoardContext;
use crate::error::{ReorderError, Result};
use crate::types::{BoardId, ListBatch, ListId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rewrite the positions of lists on one board.
///
/// Every update is checked before any is written, so a bad batch leaves the
/// board untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLists {
    pub batch: ListBatch,
}

impl ReorderLists {
    pub fn new(batch: ListBatch) -> Self {
        Self { batch }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for ReorderLists {
    type Output = ();

    fn op(&self) -> &'static str {
        "reorder lists"
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<()> {
        let board_id = &self.batch.container_id;
        let mut tables = ctx.write().await;
        tables.board(board_id)?;

        for update in &self.batch.updates {
            let list = tables.list(&update.item_id)?;
            if &list.board_id != board_id {
                return Err(ReorderError::not_in_container(
                    format!("list {}", update.item_id),
                    format!("board {}", board_id),
                ));
            }
            if let Some(target) = &update.new_container_id {
                if target != board_id {
                    return Err(ReorderError::cross_board(board_id.as_str(), target.as_str()));
                }
            }
        }

        for update in &self.batch.updates {
            tables.list_mut(&update.item_id)?.position = update.position;
        }
        tables.touch_board(board_id);

        debug!(board = %board_id, lists = self.batch.len(), "lists reordered");
        Ok(())
    }
}

/// Move a list onto another board at the given position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveList {
    pub list_id: ListId,
    pub new_board_id: BoardId,
    pub position: f64,
}

impl MoveList {
    pub fn new(list_id: ListId, new_board_id: BoardId, position: f64) -> Self {
        Self {
            list_id,
            new_board_id,
            position,
        }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for MoveList {
    type Output = ();

    fn op(&self) -> &'static str {
        "move list"
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<()> {
        let mut tables = ctx.write().await;
        let old_board_id = tables.list(&self.list_id)?.board_id.clone();
        tables.board(&self.new_board_id)?;

        let list = tables.list_mut(&self.list_id)?;
        list.board_id = self.new_board_id.clone();
        list.position = self.position;

        // Both boards saw activity
        tables.touch_board(&old_board_id);
        tables.touch_board(&self.new_board_id);

        debug!(
            list = %self.list_id,
            from = %old_board_id,
            to = %self.new_board_id,
            "list moved"
        );
        Ok(())
    }
}
