//! Overlapping reorders whose store calls finish out of order

use async_trait::async_trait;
use kanban_reorder::{
    BoardCache, BoardId, BoardKey, BoardState, Card, CardId, DragController, DragData,
    DragRegistry, DropData, Edge, LinkId, ListId, MemoryStore, PositionBatch, PositionStore,
    ReorderError, ReorderOrchestrator, ReorderOutcome, Result,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

type Gate = oneshot::Sender<std::result::Result<(), String>>;

/// Holds every write until the test releases it, then forwards successes
/// to the wrapped memory store
#[derive(Default)]
struct GatedStore {
    inner: MemoryStore,
    gates: Mutex<Vec<Option<Gate>>>,
}

impl GatedStore {
    /// Writes currently parked
    fn waiting(&self) -> usize {
        self.gates.lock().unwrap().iter().flatten().count()
    }

    /// Let the `index`-th write (in arrival order) finish with `result`
    fn release(&self, index: usize, result: std::result::Result<(), String>) {
        let gate = self.gates.lock().unwrap()[index]
            .take()
            .expect("gate already released");
        gate.send(result).expect("writer went away");
    }

    async fn hold(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(tx));
        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(ReorderError::persistence(reason)),
            Err(_) => Err(ReorderError::persistence("gate dropped")),
        }
    }
}

#[async_trait]
impl PositionStore for GatedStore {
    async fn submit_position_batch(&self, batch: &PositionBatch) -> Result<()> {
        self.hold().await?;
        self.inner.submit_position_batch(batch).await
    }

    async fn move_list(&self, list_id: &ListId, new_board_id: &BoardId, position: f64) -> Result<()> {
        self.hold().await?;
        self.inner.move_list(list_id, new_board_id, position).await
    }

    async fn set_link_order(&self, card_id: &CardId, links: &[LinkId]) -> Result<()> {
        self.hold().await?;
        self.inner.set_link_order(card_id, links).await
    }

    async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState> {
        self.inner.fetch_board(key).await
    }
}

struct Fixture {
    store: Arc<GatedStore>,
    orchestrator: ReorderOrchestrator<GatedStore>,
    key: BoardKey,
    board_id: BoardId,
    cards: Vec<Card>,
}

/// One list holding a, b, c
async fn fixture() -> Fixture {
    let store = Arc::new(GatedStore::default());
    let board = store.inner.add_board("Sprint").await;
    let list = store.inner.add_list(&board.id, "Todo").await.unwrap();
    let mut cards = Vec::new();
    for content in ["a", "b", "c"] {
        cards.push(store.inner.add_card(&list.id, content).await.unwrap());
    }

    let orchestrator = ReorderOrchestrator::new(Arc::clone(&store), Arc::new(BoardCache::new()));
    orchestrator.load_board(&board.short_id).await.unwrap();

    Fixture {
        store,
        orchestrator,
        key: board.short_id,
        board_id: board.id,
        cards,
    }
}

impl Fixture {
    fn drag(&self, card: usize) -> DragData {
        let card = &self.cards[card];
        DragData::card(card.id.clone(), card.list_id.clone(), self.board_id.clone())
    }

    fn above(&self, card: usize) -> DropData {
        let card = &self.cards[card];
        DropData::card(card.id.clone(), card.list_id.clone(), self.board_id.clone())
            .with_edge(Some(Edge::Top))
    }

    /// Drag `card` onto the top edge of `target` and start persisting it
    fn start(&self, card: usize, target: usize) -> tokio::task::JoinHandle<ReorderOutcome> {
        self.orchestrator
            .handle_drop(&self.key, &self.drag(card), &self.above(target))
            .spawn()
    }

    fn cached_order(&self) -> Vec<String> {
        order(&self.orchestrator.cache().get(&self.key).unwrap())
    }

    async fn stored_order(&self) -> Vec<String> {
        order(&self.store.inner.fetch_board(&self.key).await.unwrap())
    }

    async fn wait_for_writes(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.store.waiting() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("writes never reached the store");
    }
}

fn order(state: &BoardState) -> Vec<String> {
    state.lists[0]
        .cards
        .iter()
        .map(|c| c.content.clone())
        .collect()
}

#[tokio::test]
async fn test_second_failure_keeps_first_optimistic_write() {
    let f = fixture().await;

    // c to the top, then b above c
    let first = f.start(2, 0);
    assert_eq!(f.cached_order(), vec!["c", "a", "b"]);
    f.wait_for_writes(1).await;

    let second = f.start(1, 2);
    assert_eq!(f.cached_order(), vec!["b", "c", "a"]);
    f.wait_for_writes(2).await;

    f.store.release(1, Err("conflict".into()));
    let outcome = second.await.unwrap();
    assert!(matches!(outcome, ReorderOutcome::RolledBack(_)));
    // Back to what the second reorder saw, first reorder still applied
    assert_eq!(f.cached_order(), vec!["c", "a", "b"]);

    f.store.release(0, Ok(()));
    assert!(first.await.unwrap().is_confirmed());
    assert_eq!(f.cached_order(), vec!["c", "a", "b"]);
    assert_eq!(f.stored_order().await, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_late_failure_restores_older_snapshot_until_reload() {
    let f = fixture().await;

    let first = f.start(2, 0);
    f.wait_for_writes(1).await;
    let second = f.start(1, 2);
    f.wait_for_writes(2).await;

    f.store.release(1, Ok(()));
    assert!(second.await.unwrap().is_confirmed());
    // Only the second write reached the store
    assert_eq!(f.stored_order().await, vec!["b", "a", "c"]);
    assert_eq!(f.cached_order(), vec!["b", "a", "c"]);

    f.store.release(0, Err("timeout".into()));
    let outcome = first.await.unwrap();
    assert_eq!(outcome.error().map(ToString::to_string), Some("timeout".to_string()));
    // Restores the snapshot taken before either reorder
    assert_eq!(f.cached_order(), vec!["a", "b", "c"]);

    f.orchestrator.load_board(&f.key).await.unwrap();
    assert_eq!(f.cached_order(), vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_new_drag_while_persist_pending() {
    let f = fixture().await;
    let controller = DragController::new(DragRegistry::new(), f.orchestrator.clone());

    controller.drag_start(f.drag(2));
    assert!(controller.drag_enter(f.above(0)));
    let first = controller.drop(&f.key).spawn();
    f.wait_for_writes(1).await;
    assert!(!controller.registry().is_dragging());

    // The registry is free again while the first write is parked
    controller.drag_start(f.drag(0));
    assert!(controller.registry().is_dragging());
    assert!(controller.drag_enter(f.above(1)));
    controller.cancel();

    f.store.release(0, Ok(()));
    assert!(first.await.unwrap().is_confirmed());
    assert_eq!(f.stored_order().await, vec!["c", "a", "b"]);
}
