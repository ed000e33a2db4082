//! GetBoard command

use super::command::Execute;
use super::context::BoardContext;
use crate::error::{ReorderError, Result};
use crate::types::{BoardKey, BoardState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read the lists-with-cards view of a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBoard {
    pub key: BoardKey,
}

impl GetBoard {
    pub fn new(key: BoardKey) -> Self {
        Self { key }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for GetBoard {
    type Output = BoardState;

    fn op(&self) -> &'static str {
        "get board"
    }

    fn is_mutation(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<BoardState> {
        ctx.read().await.board_state(&self.key)
    }
}
