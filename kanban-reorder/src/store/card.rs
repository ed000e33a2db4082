//! Card commands: reorder within a list, move across lists, order links

use super::command::Execute;
use super::context::BoardContext;
use crate::error::{ReorderError, Result};
use crate::types::{CardBatch, CardId, LinkId, ListId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rewrite card positions for cards currently in one list.
///
/// Updates carrying a new container move the card to that list, which must
/// be on the same board. The whole batch is validated before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderCards {
    pub batch: CardBatch,
}

impl ReorderCards {
    pub fn new(batch: CardBatch) -> Self {
        Self { batch }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for ReorderCards {
    type Output = ();

    fn op(&self) -> &'static str {
        "reorder cards"
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<()> {
        let list_id = &self.batch.container_id;
        let mut tables = ctx.write().await;
        let board_id = tables.list(list_id)?.board_id.clone();

        for update in &self.batch.updates {
            let card = tables.card(&update.item_id)?;
            if &card.list_id != list_id {
                return Err(ReorderError::not_in_container(
                    format!("card {}", update.item_id),
                    format!("list {}", list_id),
                ));
            }
            if let Some(target) = &update.new_container_id {
                let target_board = &tables.list(target)?.board_id;
                if target_board != &board_id {
                    return Err(ReorderError::cross_board(
                        board_id.as_str(),
                        target_board.as_str(),
                    ));
                }
            }
        }

        for update in &self.batch.updates {
            let card = tables.card_mut(&update.item_id)?;
            card.position = update.position;
            if let Some(target) = &update.new_container_id {
                card.list_id = target.clone();
            }
        }
        tables.touch_board(&board_id);

        debug!(list = %list_id, cards = self.batch.len(), "cards reordered");
        Ok(())
    }
}

/// Move one card into another list of the same board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCard {
    pub card_id: CardId,
    pub new_list_id: ListId,
    pub new_position: f64,
}

impl MoveCard {
    pub fn new(card_id: CardId, new_list_id: ListId, new_position: f64) -> Self {
        Self {
            card_id,
            new_list_id,
            new_position,
        }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for MoveCard {
    type Output = ();

    fn op(&self) -> &'static str {
        "move card"
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<()> {
        let mut tables = ctx.write().await;
        let current_list = tables.card(&self.card_id)?.list_id.clone();
        let from_board = tables.list(&current_list)?.board_id.clone();
        let to_board = tables.list(&self.new_list_id)?.board_id.clone();

        if from_board != to_board {
            return Err(ReorderError::cross_board(from_board.as_str(), to_board.as_str()));
        }

        let card = tables.card_mut(&self.card_id)?;
        card.list_id = self.new_list_id.clone();
        card.position = self.new_position;
        tables.touch_board(&from_board);

        debug!(card = %self.card_id, from = %current_list, to = %self.new_list_id, "card moved");
        Ok(())
    }
}

/// Replace the display order of a card's links
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLinkOrder {
    pub card_id: CardId,
    pub links: Vec<LinkId>,
}

impl SetLinkOrder {
    pub fn new(card_id: CardId, links: Vec<LinkId>) -> Self {
        Self { card_id, links }
    }
}

#[async_trait]
impl Execute<BoardContext, ReorderError> for SetLinkOrder {
    type Output = ();

    fn op(&self) -> &'static str {
        "order links"
    }

    async fn execute(&self, ctx: &BoardContext) -> Result<()> {
        let mut tables = ctx.write().await;
        let card = tables.card_mut(&self.card_id)?;

        if let Some(unknown) = self.links.iter().find(|id| card.link_index(id).is_none()) {
            return Err(ReorderError::LinkNotFound {
                id: unknown.to_string(),
            });
        }
        if !card.apply_link_order(&self.links) {
            return Err(ReorderError::InvalidLinkOrder {
                card_id: self.card_id.to_string(),
            });
        }

        let list_id = card.list_id.clone();
        let board_id = tables.list(&list_id)?.board_id.clone();
        tables.touch_board(&board_id);
        Ok(())
    }
}
