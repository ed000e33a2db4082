//! BoardContext - in-memory tables behind the reference store
//!
//! The context only hands out access to the tables. Lookups and writes are
//! primitives; validation and the actual mutations live in the commands.

use crate::error::{ReorderError, Result};
use crate::position::{calculate_position_for_index, sort_by_position};
use crate::types::{
    Board, BoardId, BoardKey, BoardState, Card, CardId, CardLink, List, ListId, ListWithCards,
};
use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Context passed to every command
#[derive(Debug, Default)]
pub struct BoardContext {
    tables: RwLock<Tables>,
}

impl BoardContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access for queries
    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    /// Exclusive access; hold the guard across validation and writes
    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

/// Boards, lists and cards keyed by id
#[derive(Debug, Default)]
pub struct Tables {
    boards: HashMap<BoardId, Board>,
    keys: HashMap<BoardKey, BoardId>,
    lists: HashMap<ListId, List>,
    cards: HashMap<CardId, Card>,
}

impl Tables {
    // =========================================================================
    // Boards
    // =========================================================================

    pub fn board(&self, id: &BoardId) -> Result<&Board> {
        self.boards
            .get(id)
            .ok_or_else(|| ReorderError::BoardNotFound { id: id.to_string() })
    }

    pub fn board_by_key(&self, key: &BoardKey) -> Result<&Board> {
        self.keys
            .get(key)
            .and_then(|id| self.boards.get(id))
            .ok_or_else(|| ReorderError::BoardNotFound {
                id: key.to_string(),
            })
    }

    pub fn insert_board(&mut self, board: Board) {
        self.keys.insert(board.short_id.clone(), board.id.clone());
        self.boards.insert(board.id.clone(), board);
    }

    /// Record activity on a board
    pub fn touch_board(&mut self, id: &BoardId) {
        if let Some(board) = self.boards.get_mut(id) {
            board.touch();
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn list(&self, id: &ListId) -> Result<&List> {
        self.lists
            .get(id)
            .ok_or_else(|| ReorderError::ListNotFound { id: id.to_string() })
    }

    pub fn list_mut(&mut self, id: &ListId) -> Result<&mut List> {
        self.lists
            .get_mut(id)
            .ok_or_else(|| ReorderError::ListNotFound { id: id.to_string() })
    }

    /// Lists of a board sorted by position
    pub fn lists_of(&self, board_id: &BoardId) -> Vec<&List> {
        let mut lists: Vec<&List> = self
            .lists
            .values()
            .filter(|l| &l.board_id == board_id)
            .collect();
        sort_by_position(&mut lists);
        lists
    }

    /// Position one past the last list of a board
    pub fn next_list_position(&self, board_id: &BoardId) -> f64 {
        let lists = self.lists_of(board_id);
        calculate_position_for_index(&lists, lists.len())
    }

    pub fn insert_list(&mut self, list: List) {
        self.lists.insert(list.id.clone(), list);
    }

    // =========================================================================
    // Cards
    // =========================================================================

    pub fn card(&self, id: &CardId) -> Result<&Card> {
        self.cards
            .get(id)
            .ok_or_else(|| ReorderError::CardNotFound { id: id.to_string() })
    }

    pub fn card_mut(&mut self, id: &CardId) -> Result<&mut Card> {
        self.cards
            .get_mut(id)
            .ok_or_else(|| ReorderError::CardNotFound { id: id.to_string() })
    }

    /// Cards of a list sorted by position
    pub fn cards_of(&self, list_id: &ListId) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self
            .cards
            .values()
            .filter(|c| &c.list_id == list_id)
            .collect();
        sort_by_position(&mut cards);
        cards
    }

    pub fn next_card_position(&self, list_id: &ListId) -> f64 {
        let cards = self.cards_of(list_id);
        calculate_position_for_index(&cards, cards.len())
    }

    pub fn insert_card(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn push_link(&mut self, card_id: &CardId, link: CardLink) -> Result<()> {
        self.card_mut(card_id)?.links.push(link);
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// The "lists with cards" view of a board, sorted by position
    pub fn board_state(&self, key: &BoardKey) -> Result<BoardState> {
        let board = self.board_by_key(key)?;
        let lists = self
            .lists_of(&board.id)
            .into_iter()
            .map(|list| ListWithCards {
                list: list.clone(),
                cards: self.cards_of(&list.id).into_iter().cloned().collect(),
            })
            .collect();

        Ok(BoardState {
            board: board.clone(),
            lists,
        })
    }
}
