//! Position update batches submitted to persistence in one call

use super::ids::{BoardId, CardId, ListId};
use serde::{Deserialize, Serialize};

/// One item's new position, optionally in a new container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate<I, C> {
    pub item_id: I,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_container_id: Option<C>,
}

impl<I, C> PositionUpdate<I, C> {
    /// Reposition an item within its current container
    pub fn new(item_id: I, position: f64) -> Self {
        Self {
            item_id,
            position,
            new_container_id: None,
        }
    }

    /// Move the item into another container as well
    pub fn moved_to(mut self, container: C) -> Self {
        self.new_container_id = Some(container);
        self
    }
}

/// Ordered updates for items that currently live in `container_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch<I, C> {
    pub container_id: C,
    pub updates: Vec<PositionUpdate<I, C>>,
}

impl<I, C> Batch<I, C> {
    pub fn new(container_id: C) -> Self {
        Self {
            container_id,
            updates: Vec::new(),
        }
    }

    pub fn with_update(mut self, update: PositionUpdate<I, C>) -> Self {
        self.updates.push(update);
        self
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// List positions within a board
pub type ListBatch = Batch<ListId, BoardId>;

/// Card positions within (or out of) a list
pub type CardBatch = Batch<CardId, ListId>;

/// Any batch the persistence layer accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionBatch {
    Lists(ListBatch),
    Cards(CardBatch),
}

impl PositionBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Lists(b) => b.len(),
            Self::Cards(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
