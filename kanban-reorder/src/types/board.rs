//! Board-level types: Board, List, Card, CardLink and the cached board view

use super::batch::{CardBatch, ListBatch};
use super::ids::{BoardId, BoardKey, CardId, LinkId, ListId};
use crate::position::{sort_by_position, Orderable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kanban board - the top-level aggregate lists and cards belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub short_id: BoardKey,
    pub name: String,
    /// Bumped on every successful mutation touching the board
    pub updated_time: DateTime<Utc>,
}

impl Board {
    /// Create a new board with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            short_id: BoardKey::new(),
            name: name.into(),
            updated_time: Utc::now(),
        }
    }

    /// Record activity on the board
    pub fn touch(&mut self) {
        self.updated_time = Utc::now();
    }
}

/// A list (column) on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    pub position: f64,
}

impl List {
    /// Create a new list at the given position
    pub fn new(board_id: BoardId, name: impl Into<String>, position: f64) -> Self {
        Self {
            id: ListId::new(),
            board_id,
            name: name.into(),
            position,
        }
    }
}

/// A card in a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub content: String,
    pub position: f64,
    /// Links in display order
    #[serde(default)]
    pub links: Vec<CardLink>,
}

impl Card {
    /// Create a new card at the given position
    pub fn new(list_id: ListId, content: impl Into<String>, position: f64) -> Self {
        Self {
            id: CardId::new(),
            list_id,
            content: content.into(),
            position,
            links: Vec::new(),
        }
    }

    /// Append a link
    pub fn with_link(mut self, link: CardLink) -> Self {
        self.links.push(link);
        self
    }

    /// Index of a link in display order
    pub fn link_index(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| &l.id == id)
    }

    /// Current link order as ids
    pub fn link_order(&self) -> Vec<LinkId> {
        self.links.iter().map(|l| l.id.clone()).collect()
    }

    /// Rearrange links to match `order`.
    ///
    /// Returns false (and leaves the links untouched) unless `order` is a
    /// permutation of the current link ids.
    pub fn apply_link_order(&mut self, order: &[LinkId]) -> bool {
        if order.len() != self.links.len() {
            return false;
        }
        let mut reordered: Vec<CardLink> = Vec::with_capacity(order.len());
        for id in order {
            match self.links.iter().find(|l| &l.id == id) {
                Some(link) if !reordered.iter().any(|r| &r.id == id) => reordered.push(link.clone()),
                _ => return false,
            }
        }
        self.links = reordered;
        true
    }
}

/// A link attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLink {
    pub id: LinkId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CardLink {
    /// Create a link with a fresh id
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            id: LinkId::new(),
            url: url.into(),
            title,
        }
    }
}

/// A list together with its cards, sorted by position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

impl ListWithCards {
    pub fn new(list: List) -> Self {
        Self {
            list,
            cards: Vec::new(),
        }
    }

    pub fn id(&self) -> &ListId {
        &self.list.id
    }

    /// Index of a card within this list's sorted cards
    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == id)
    }

    fn sort_cards(&mut self) {
        sort_by_position(&mut self.cards);
    }
}

/// The cached "lists with cards" view of one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

impl BoardState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            lists: Vec::new(),
        }
    }

    /// Sort lists and the cards within each list by position
    pub fn normalize(&mut self) {
        sort_by_position(&mut self.lists);
        for list in &mut self.lists {
            list.sort_cards();
        }
    }

    pub fn list_index(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| l.id() == id)
    }

    pub fn find_list(&self, id: &ListId) -> Option<&ListWithCards> {
        self.lists.iter().find(|l| l.id() == id)
    }

    /// (list index, card index) of a card
    pub fn locate_card(&self, id: &CardId) -> Option<(usize, usize)> {
        self.lists
            .iter()
            .enumerate()
            .find_map(|(li, list)| list.card_index(id).map(|ci| (li, ci)))
    }

    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.locate_card(id)
            .and_then(|(li, ci)| self.lists.get(li).and_then(|l| l.cards.get(ci)))
    }

    /// Rewrite list positions from a batch and re-sort
    pub fn apply_list_batch(&mut self, batch: &ListBatch) {
        for update in &batch.updates {
            if let Some(list) = self.lists.iter_mut().find(|l| l.id() == &update.item_id) {
                list.list.position = update.position;
            }
        }
        sort_by_position(&mut self.lists);
    }

    /// Rewrite card positions (and lists, for cross-list moves) from a batch
    pub fn apply_card_batch(&mut self, batch: &CardBatch) {
        for update in &batch.updates {
            let Some((from, ci)) = self.locate_card(&update.item_id) else {
                continue;
            };
            let to = match &update.new_container_id {
                Some(list_id) => match self.list_index(list_id) {
                    Some(ix) => ix,
                    None => continue,
                },
                None => from,
            };
            let mut card = self.lists[from].cards.remove(ci);
            card.position = update.position;
            card.list_id = self.lists[to].list.id.clone();
            self.lists[to].cards.push(card);
            self.lists[to].sort_cards();
        }
    }

    /// Rearrange a card's links; returns false if the card or a link is unknown
    pub fn apply_link_order(&mut self, card_id: &CardId, order: &[LinkId]) -> bool {
        match self.locate_card(card_id) {
            Some((li, ci)) => self.lists[li].cards[ci].apply_link_order(order),
            None => false,
        }
    }

    /// Remove a list (with its cards) from the board view
    pub fn remove_list(&mut self, id: &ListId) -> Option<ListWithCards> {
        let ix = self.list_index(id)?;
        Some(self.lists.remove(ix))
    }

    /// Insert a list and re-sort by position
    pub fn insert_list(&mut self, list: ListWithCards) {
        self.lists.push(list);
        sort_by_position(&mut self.lists);
    }
}

impl Orderable for List {
    type Id = ListId;

    fn id(&self) -> &ListId {
        &self.id
    }

    fn position(&self) -> f64 {
        self.position
    }
}

impl Orderable for ListWithCards {
    type Id = ListId;

    fn id(&self) -> &ListId {
        &self.list.id
    }

    fn position(&self) -> f64 {
        self.list.position
    }
}

impl Orderable for Card {
    type Id = CardId;

    fn id(&self) -> &CardId {
        &self.id
    }

    fn position(&self) -> f64 {
        self.position
    }
}
