//! Reorder mutation orchestrator
//!
//! Every reorder walks the same path: validate and compute a new position
//! from the cached board, write it into the cache optimistically, hand it to
//! the store, then either confirm (notify, refetch) or restore the snapshot
//! taken just before the write (notify the failure). Nothing is retried.
//!
//! The optimistic write happens synchronously when a reorder is started.
//! The returned [`PendingReorder`] only covers the persistence call and what
//! follows it, so the host can keep handling input while it is outstanding.

use crate::cache::QueryCache;
use crate::config::ReorderSettings;
use crate::destination::{get_reorder_destination_index, Placement, ReorderDestination};
use crate::edge::Edge;
use crate::error::{ReorderError, Result};
use crate::notify::{Notifier, TracingNotifier};
use crate::optimistic::{with_optimistic_update, OptimisticUpdate};
use crate::position::{calculate_position_for_index, position_for_move};
use crate::store::PositionStore;
use crate::types::{
    BoardId, BoardKey, BoardState, CardBatch, CardId, DragData, DropData, ItemKind, LinkId,
    ListBatch, ListId, ListWithCards, PositionBatch, PositionUpdate,
};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

/// Cache of board views keyed by board short id
pub type BoardCache = QueryCache<BoardKey, BoardState>;

/// How a reorder ended
#[derive(Debug)]
pub enum ReorderOutcome {
    /// The item would have landed where it already was; nothing happened
    NoOp,
    /// The drag ended without a valid drop target
    Cancelled,
    /// Refused before the cache was touched
    Rejected(ReorderError),
    /// Persisted
    Confirmed,
    /// Persistence failed and the cache was restored
    RolledBack(ReorderError),
}

impl ReorderOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn error(&self) -> Option<&ReorderError> {
        match self {
            Self::Rejected(e) | Self::RolledBack(e) => Some(e),
            _ => None,
        }
    }
}

/// A validated reorder, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderPlan {
    NoOp,
    Lists {
        key: BoardKey,
        batch: ListBatch,
    },
    Cards {
        key: BoardKey,
        batch: CardBatch,
    },
    Links {
        key: BoardKey,
        card_id: CardId,
        order: Vec<LinkId>,
    },
    /// A list leaving one board for another
    Transfer {
        from: BoardKey,
        to: BoardKey,
        list: ListWithCards,
    },
}

/// The outstanding part of a reorder: persistence and its aftermath.
///
/// Dropping it before completion abandons the store call and restores the
/// cache snapshot taken when the reorder started.
#[must_use = "a reorder is not persisted unless the pending future is driven"]
pub struct PendingReorder {
    inner: BoxFuture<'static, ReorderOutcome>,
}

impl PendingReorder {
    fn new(future: impl Future<Output = ReorderOutcome> + Send + 'static) -> Self {
        Self {
            inner: future.boxed(),
        }
    }

    /// Already finished
    pub fn ready(outcome: ReorderOutcome) -> Self {
        Self::new(futures::future::ready(outcome))
    }

    /// Drive the reorder on the tokio runtime
    pub fn spawn(self) -> tokio::task::JoinHandle<ReorderOutcome> {
        tokio::spawn(self)
    }
}

impl Future for PendingReorder {
    type Output = ReorderOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for PendingReorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReorder").finish_non_exhaustive()
    }
}

/// Plans and runs reorders against a store and the shared board cache
pub struct ReorderOrchestrator<S> {
    store: Arc<S>,
    cache: Arc<BoardCache>,
    notifier: Arc<dyn Notifier>,
    settings: ReorderSettings,
}

impl<S> Clone for ReorderOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            notifier: Arc::clone(&self.notifier),
            settings: self.settings.clone(),
        }
    }
}

impl<S: PositionStore + 'static> ReorderOrchestrator<S> {
    pub fn new(store: Arc<S>, cache: Arc<BoardCache>) -> Self {
        Self {
            store,
            cache,
            notifier: Arc::new(TracingNotifier),
            settings: ReorderSettings::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_settings(mut self, settings: ReorderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ReorderSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<BoardCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch a board from the store into the cache
    pub async fn load_board(&self, key: &BoardKey) -> Result<BoardState> {
        let state = self.store.fetch_board(key).await?;
        self.cache.set(key.clone(), state.clone());
        debug!(board = %key, lists = state.lists.len(), "board loaded");
        Ok(state)
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// Turn a drop into a reorder plan using the cached board.
    ///
    /// Fails without touching anything when an item is unknown, the drop
    /// crosses boards, or the dragged item cannot go on the target.
    pub fn plan(&self, key: &BoardKey, drag: &DragData, drop: &DropData) -> Result<ReorderPlan> {
        let state = self.cached(key)?;
        debug!(board = %key, dragged = %drag.kind(), target = %drop.kind(), "computing position");

        match (drag, drop) {
            (
                DragData::List { list_id, board_id },
                DropData::List {
                    list_id: target,
                    board_id: target_board,
                    closest_edge,
                },
            ) => {
                check_board(&state, board_id, target_board)?;
                let start = list_index(&state, list_id)?;
                let index_of_target = list_index(&state, target)?;
                let destination = self.destination(ItemKind::List, start, index_of_target, *closest_edge);

                Ok(match Placement::resolve(Some(start), destination) {
                    Placement::NoOp => ReorderPlan::NoOp,
                    Placement::Insert { index } => ReorderPlan::Lists {
                        key: key.clone(),
                        batch: ListBatch::new(state.board.id.clone()).with_update(
                            PositionUpdate::new(
                                list_id.clone(),
                                position_for_move(&state.lists, list_id, index),
                            ),
                        ),
                    },
                })
            }
            (
                DragData::Card {
                    card_id, board_id, ..
                },
                DropData::Card {
                    card_id: target,
                    board_id: target_board,
                    closest_edge,
                    ..
                },
            ) => {
                check_board(&state, board_id, target_board)?;
                let (from, start) = locate_card(&state, card_id)?;
                let (to, index_of_target) = locate_card(&state, target)?;
                let destination = self.destination(ItemKind::Card, start, index_of_target, *closest_edge);
                let placement = Placement::resolve((from == to).then_some(start), destination);
                Ok(card_plan(key, &state, card_id, from, to, placement))
            }
            (
                DragData::Card {
                    card_id, board_id, ..
                },
                DropData::List {
                    list_id: target,
                    board_id: target_board,
                    ..
                },
            ) => {
                // Dropped on the list itself: goes to the end
                check_board(&state, board_id, target_board)?;
                let (from, start) = locate_card(&state, card_id)?;
                let to = list_index(&state, target)?;
                let destination = state.lists[to].cards.len();
                let placement = Placement::resolve((from == to).then_some(start), destination);
                Ok(card_plan(key, &state, card_id, from, to, placement))
            }
            (
                DragData::Link { link_id, card_id },
                DropData::Link {
                    link_id: target,
                    card_id: target_card,
                    closest_edge,
                },
            ) => {
                if card_id != target_card {
                    return Err(ReorderError::not_in_container(
                        format!("link {}", link_id),
                        format!("card {}", target_card),
                    ));
                }
                let card = state
                    .find_card(card_id)
                    .ok_or_else(|| ReorderError::CardNotFound {
                        id: card_id.to_string(),
                    })?;
                let start = link_index(card.link_index(link_id), link_id)?;
                let index_of_target = link_index(card.link_index(target), target)?;
                let destination = self.destination(ItemKind::Link, start, index_of_target, *closest_edge);

                Ok(match Placement::resolve(Some(start), destination) {
                    Placement::NoOp => ReorderPlan::NoOp,
                    Placement::Insert { index } => {
                        let mut order = card.link_order();
                        let moved = order.remove(start);
                        order.insert(index, moved);
                        ReorderPlan::Links {
                            key: key.clone(),
                            card_id: card_id.clone(),
                            order,
                        }
                    }
                })
            }
            (drag, drop) => Err(ReorderError::IncompatibleDrop {
                dragged: drag.kind().to_string(),
                target: drop.kind().to_string(),
            }),
        }
    }

    /// Plan for the "move list to position N" dialog, N counted from 1
    pub fn plan_move_to_position(
        &self,
        key: &BoardKey,
        list_id: &ListId,
        position: usize,
    ) -> Result<ReorderPlan> {
        let state = self.cached(key)?;
        let current = list_index(&state, list_id)?;
        let count = state.lists.len();

        if position < 1 || position > count {
            return Err(ReorderError::InvalidPosition {
                position,
                max: count,
            });
        }
        if position - 1 == current {
            return Ok(ReorderPlan::NoOp);
        }

        let new_position = position_for_move(&state.lists, list_id, position - 1);
        Ok(ReorderPlan::Lists {
            key: key.clone(),
            batch: ListBatch::new(state.board.id.clone())
                .with_update(PositionUpdate::new(list_id.clone(), new_position)),
        })
    }

    /// Plan moving a list to another board, at `index` or at the end
    pub fn plan_transfer(
        &self,
        from: &BoardKey,
        list_id: &ListId,
        to: &BoardKey,
        index: Option<usize>,
    ) -> Result<ReorderPlan> {
        let source = self.cached(from)?;
        let destination = self.cached(to)?;
        let mut list = source
            .find_list(list_id)
            .cloned()
            .ok_or_else(|| ReorderError::ListNotFound {
                id: list_id.to_string(),
            })?;

        if from == to {
            let count = source.lists.len();
            let position = index.map_or(count, |i| (i + 1).min(count));
            return self.plan_move_to_position(from, list_id, position);
        }

        let index = index.unwrap_or(destination.lists.len());
        list.list.board_id = destination.board.id.clone();
        list.list.position = calculate_position_for_index(&destination.lists, index);

        Ok(ReorderPlan::Transfer {
            from: from.clone(),
            to: to.clone(),
            list,
        })
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Plan and run a drop. Validation failures are notified and reported as
    /// [`ReorderOutcome::Rejected`].
    pub fn handle_drop(&self, key: &BoardKey, drag: &DragData, drop: &DropData) -> PendingReorder {
        match self.plan(key, drag, drop) {
            Ok(plan) => self.execute(plan),
            Err(error) => self.reject(drag.kind(), error),
        }
    }

    /// Move a list to a 1-based position on its board
    pub fn move_list_to_position(
        &self,
        key: &BoardKey,
        list_id: &ListId,
        position: usize,
    ) -> PendingReorder {
        match self.plan_move_to_position(key, list_id, position) {
            Ok(plan) => self.execute(plan),
            Err(error) => self.reject(ItemKind::List, error),
        }
    }

    /// Move a list to another board
    pub fn transfer_list(
        &self,
        from: &BoardKey,
        list_id: &ListId,
        to: &BoardKey,
        index: Option<usize>,
    ) -> PendingReorder {
        match self.plan_transfer(from, list_id, to, index) {
            Ok(plan) => self.execute(plan),
            Err(error) => self.reject(ItemKind::List, error),
        }
    }

    /// Apply a plan to the cache now and persist it
    pub fn execute(&self, plan: ReorderPlan) -> PendingReorder {
        let store = Arc::clone(&self.store);

        match plan {
            ReorderPlan::NoOp => {
                debug!("reorder is a no-op");
                PendingReorder::ready(ReorderOutcome::NoOp)
            }
            ReorderPlan::Lists { key, batch } => {
                debug!(board = %key, lists = batch.len(), "optimistic apply");
                let applied = batch.clone();
                let persist = with_optimistic_update(
                    &self.cache,
                    key.clone(),
                    move |state: &mut BoardState| state.apply_list_batch(&applied),
                    async move {
                        store
                            .submit_position_batch(&PositionBatch::Lists(batch))
                            .await
                    },
                );
                self.finish(ItemKind::List, vec![key], persist)
            }
            ReorderPlan::Cards { key, batch } => {
                debug!(board = %key, cards = batch.len(), "optimistic apply");
                let applied = batch.clone();
                let persist = with_optimistic_update(
                    &self.cache,
                    key.clone(),
                    move |state: &mut BoardState| state.apply_card_batch(&applied),
                    async move {
                        store
                            .submit_position_batch(&PositionBatch::Cards(batch))
                            .await
                    },
                );
                self.finish(ItemKind::Card, vec![key], persist)
            }
            ReorderPlan::Links {
                key,
                card_id,
                order,
            } => {
                debug!(board = %key, card = %card_id, "optimistic apply");
                let (applied_card, applied_order) = (card_id.clone(), order.clone());
                let persist = with_optimistic_update(
                    &self.cache,
                    key.clone(),
                    move |state: &mut BoardState| {
                        state.apply_link_order(&applied_card, &applied_order);
                    },
                    async move { store.set_link_order(&card_id, &order).await },
                );
                self.finish(ItemKind::Link, vec![key], persist)
            }
            ReorderPlan::Transfer { from, to, list } => {
                debug!(from = %from, to = %to, list = %list.id(), "optimistic apply");
                let list_id = list.id().clone();
                let board_id: BoardId = list.list.board_id.clone();
                let position = list.list.position;

                let removed = list_id.clone();
                let leaving = OptimisticUpdate::apply(&self.cache, from.clone(), move |state| {
                    state.remove_list(&removed);
                });
                let arriving = OptimisticUpdate::apply(&self.cache, to.clone(), move |state| {
                    state.insert_list(list);
                });

                let persist = async move {
                    let result = store.move_list(&list_id, &board_id, position).await;
                    // Undo in reverse order of application
                    let result = arriving.settle(result);
                    leaving.settle(result)
                };
                self.finish(ItemKind::List, vec![from, to], persist)
            }
        }
    }

    fn finish(
        &self,
        kind: ItemKind,
        refresh: Vec<BoardKey>,
        persist: impl Future<Output = Result<()>> + Send + 'static,
    ) -> PendingReorder {
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let notifier = Arc::clone(&self.notifier);
        let settings = self.settings.clone();

        PendingReorder::new(async move {
            debug!(item = %kind, "persist pending");
            match persist.await {
                Ok(()) => {
                    info!(item = %kind, "reorder confirmed");
                    if settings.notify_on_success {
                        notifier.success(settings.messages.moved(kind));
                    }
                    if settings.refetch_on_confirm {
                        for key in refresh {
                            cache.invalidate(&key);
                            match store.fetch_board(&key).await {
                                Ok(state) => cache.set(key, state),
                                Err(error) => {
                                    warn!(board = %key, %error, "refetch after reorder failed")
                                }
                            }
                        }
                    }
                    ReorderOutcome::Confirmed
                }
                Err(error) => {
                    warn!(item = %kind, %error, "reorder rolled back");
                    notifier.error(&settings.messages.failed(kind, &error.to_string()));
                    ReorderOutcome::RolledBack(error)
                }
            }
        })
    }

    fn reject(&self, kind: ItemKind, error: ReorderError) -> PendingReorder {
        warn!(item = %kind, %error, "reorder rejected");
        self.notifier
            .error(&self.settings.messages.failed(kind, &error.to_string()));
        PendingReorder::ready(ReorderOutcome::Rejected(error))
    }

    fn cached(&self, key: &BoardKey) -> Result<BoardState> {
        self.cache
            .get(key)
            .ok_or_else(|| ReorderError::BoardNotFound { id: key.to_string() })
    }

    fn destination(
        &self,
        kind: ItemKind,
        start: usize,
        index_of_target: usize,
        closest_edge: Option<Edge>,
    ) -> usize {
        get_reorder_destination_index(&ReorderDestination {
            start_index: Some(start),
            index_of_target,
            closest_edge_of_target: closest_edge,
            axis: self.settings.axis_for(kind),
        })
    }
}

/// Both ends of a drop must be on the cached board
fn check_board(state: &BoardState, dragged: &BoardId, target: &BoardId) -> Result<()> {
    if dragged != target {
        return Err(ReorderError::cross_board(dragged.as_str(), target.as_str()));
    }
    if dragged != &state.board.id {
        return Err(ReorderError::cross_board(
            state.board.id.as_str(),
            dragged.as_str(),
        ));
    }
    Ok(())
}

fn list_index(state: &BoardState, id: &ListId) -> Result<usize> {
    state
        .list_index(id)
        .ok_or_else(|| ReorderError::ListNotFound { id: id.to_string() })
}

fn locate_card(state: &BoardState, id: &CardId) -> Result<(usize, usize)> {
    state
        .locate_card(id)
        .ok_or_else(|| ReorderError::CardNotFound { id: id.to_string() })
}

fn link_index(index: Option<usize>, id: &LinkId) -> Result<usize> {
    index.ok_or_else(|| ReorderError::LinkNotFound { id: id.to_string() })
}

fn card_plan(
    key: &BoardKey,
    state: &BoardState,
    card_id: &CardId,
    from: usize,
    to: usize,
    placement: Placement,
) -> ReorderPlan {
    let Placement::Insert { index } = placement else {
        return ReorderPlan::NoOp;
    };

    let target = &state.lists[to];
    let mut update = PositionUpdate::new(
        card_id.clone(),
        position_for_move(&target.cards, card_id, index),
    );
    if from != to {
        update = update.moved_to(target.id().clone());
    }

    ReorderPlan::Cards {
        key: key.clone(),
        batch: CardBatch::new(state.lists[from].id().clone()).with_update(update),
    }
}
