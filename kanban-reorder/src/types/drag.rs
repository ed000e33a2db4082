//! Drag and drop payloads: what is being dragged and what it hovers over

use super::ids::{BoardId, CardId, LinkId, ListId};
use crate::edge::{extract_closest_edge, Edge, CLOSEST_EDGE_KEY};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kind of orderable thing a payload refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    List,
    Card,
    Link,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Card => "card",
            Self::Link => "link",
        })
    }
}

/// The item being dragged, with the containers it currently lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DragData {
    List {
        list_id: ListId,
        board_id: BoardId,
    },
    Card {
        card_id: CardId,
        list_id: ListId,
        board_id: BoardId,
    },
    Link {
        link_id: LinkId,
        card_id: CardId,
    },
}

impl DragData {
    pub fn list(list_id: ListId, board_id: BoardId) -> Self {
        Self::List { list_id, board_id }
    }

    pub fn card(card_id: CardId, list_id: ListId, board_id: BoardId) -> Self {
        Self::Card {
            card_id,
            list_id,
            board_id,
        }
    }

    pub fn link(link_id: LinkId, card_id: CardId) -> Self {
        Self::Link { link_id, card_id }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::List { .. } => ItemKind::List,
            Self::Card { .. } => ItemKind::Card,
            Self::Link { .. } => ItemKind::Link,
        }
    }
}

/// A candidate drop target, with the edge the pointer is closest to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DropData {
    List {
        list_id: ListId,
        board_id: BoardId,
        #[serde(default)]
        closest_edge: Option<Edge>,
    },
    Card {
        card_id: CardId,
        list_id: ListId,
        board_id: BoardId,
        #[serde(default)]
        closest_edge: Option<Edge>,
    },
    Link {
        link_id: LinkId,
        card_id: CardId,
        #[serde(default)]
        closest_edge: Option<Edge>,
    },
}

impl DropData {
    pub fn list(list_id: ListId, board_id: BoardId) -> Self {
        Self::List {
            list_id,
            board_id,
            closest_edge: None,
        }
    }

    pub fn card(card_id: CardId, list_id: ListId, board_id: BoardId) -> Self {
        Self::Card {
            card_id,
            list_id,
            board_id,
            closest_edge: None,
        }
    }

    pub fn link(link_id: LinkId, card_id: CardId) -> Self {
        Self::Link {
            link_id,
            card_id,
            closest_edge: None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::List { .. } => ItemKind::List,
            Self::Card { .. } => ItemKind::Card,
            Self::Link { .. } => ItemKind::Link,
        }
    }

    pub fn closest_edge(&self) -> Option<Edge> {
        match self {
            Self::List { closest_edge, .. }
            | Self::Card { closest_edge, .. }
            | Self::Link { closest_edge, .. } => *closest_edge,
        }
    }

    /// Replace the detected edge
    pub fn with_edge(mut self, edge: Option<Edge>) -> Self {
        match &mut self {
            Self::List { closest_edge, .. }
            | Self::Card { closest_edge, .. }
            | Self::Link { closest_edge, .. } => *closest_edge = edge,
        }
        self
    }

    /// Decode a drop payload that crossed a serialization boundary.
    ///
    /// An unrecognised edge value is treated as no edge rather than failing
    /// the whole payload.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let mut stripped = payload.clone();
        if let Some(map) = stripped.as_object_mut() {
            map.remove(CLOSEST_EDGE_KEY);
        }
        let data: Self = serde_json::from_value(stripped)?;
        Ok(data.with_edge(extract_closest_edge(payload)))
    }
}
