//! Drag session registry: the single observable drag gesture.
//!
//! A `DragRegistry` is constructed by the host and shared by cloning the
//! handle. Every mutation notifies all subscribers synchronously, in
//! subscription order, with a snapshot of the new state. Subscribers run
//! after the internal lock is released, so they may read the registry.

use crate::types::{DragData, DropData};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::trace;

/// Snapshot of the current drag gesture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    pub is_dragging: bool,
    pub dragged_item: Option<DragData>,
    pub dragged_over_item: Option<DropData>,
}

type Callback = Arc<dyn Fn(&DragState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: DragState,
    subscribers: Vec<(u64, Callback)>,
    next_id: u64,
}

/// Shared handle to the drag session
#[derive(Clone, Default)]
pub struct DragRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl DragRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state snapshot
    pub fn state(&self) -> DragState {
        self.lock().state.clone()
    }

    pub fn is_dragging(&self) -> bool {
        self.lock().state.is_dragging
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Register a listener for every state change.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&DragState) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Arc::new(callback)));
        trace!(subscription = id, "drag registry subscriber added");

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Begin a drag gesture. Replaces any gesture already in progress.
    pub fn start_drag(&self, item: DragData) {
        trace!(kind = %item.kind(), "drag started");
        self.mutate(|state| {
            *state = DragState {
                is_dragging: true,
                dragged_item: Some(item),
                dragged_over_item: None,
            };
        });
    }

    /// Record the target currently under the pointer (`None` on leave)
    pub fn update_drag_over(&self, item: Option<DropData>) {
        self.mutate(|state| state.dragged_over_item = item);
    }

    /// Finish the gesture, whatever its outcome
    pub fn end_drag(&self) {
        trace!("drag ended");
        self.mutate(|state| *state = DragState::default());
    }

    fn mutate(&self, change: impl FnOnce(&mut DragState)) {
        let (snapshot, callbacks) = {
            let mut inner = self.lock();
            change(&mut inner.state);
            let callbacks: Vec<Callback> = inner
                .subscribers
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect();
            (inner.state.clone(), callbacks)
        };

        for callback in callbacks {
            callback(&snapshot);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DragRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("DragRegistry")
            .field("state", &inner.state)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Keeps a registry listener alive; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Inner>>,
}

impl Subscription {
    /// Stop receiving notifications
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.subscribers.retain(|(id, _)| *id != self.id);
            trace!(subscription = self.id, "drag registry subscriber removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::types::CardId;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn card_drag() -> DragData {
        DragData::card("c1".into(), "l1".into(), "b1".into())
    }

    fn card_drop() -> DropData {
        DropData::card("c2".into(), "l1".into(), "b1".into()).with_edge(Some(Edge::Top))
    }

    #[test]
    fn test_initial_state() {
        let registry = DragRegistry::new();
        assert_eq!(registry.state(), DragState::default());
        assert!(!registry.is_dragging());
    }

    #[test]
    fn test_start_clears_previous_drag_over() {
        let registry = DragRegistry::new();
        registry.start_drag(card_drag());
        registry.update_drag_over(Some(card_drop()));
        registry.start_drag(DragData::list("l9".into(), "b1".into()));

        let state = registry.state();
        assert!(state.is_dragging);
        assert_eq!(
            state.dragged_item,
            Some(DragData::list("l9".into(), "b1".into()))
        );
        assert_eq!(state.dragged_over_item, None);
    }

    #[test]
    fn test_end_drag_resets_everything() {
        let registry = DragRegistry::new();
        registry.start_drag(card_drag());
        registry.update_drag_over(Some(card_drop()));
        registry.end_drag();

        let state = registry.state();
        assert!(!state.is_dragging);
        assert_eq!(state.dragged_item, None);
        assert_eq!(state.dragged_over_item, None);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Start(u8),
        Over(Option<u8>),
        End,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            any::<u8>().prop_map(Step::Start),
            proptest::option::of(any::<u8>()).prop_map(Step::Over),
            Just(Step::End),
        ]
    }

    fn card(n: u8) -> CardId {
        CardId::from(format!("c{n}"))
    }

    proptest! {
        #[test]
        fn test_end_drag_resets_after_any_sequence(steps in prop::collection::vec(step(), 0..40)) {
            let registry = DragRegistry::new();
            for step in steps {
                match step {
                    Step::Start(n) => {
                        registry.start_drag(DragData::card(card(n), "l1".into(), "b1".into()));
                        prop_assert!(registry.state().dragged_over_item.is_none());
                    }
                    Step::Over(n) => registry.update_drag_over(
                        n.map(|n| DropData::card(card(n), "l1".into(), "b1".into())),
                    ),
                    Step::End => registry.end_drag(),
                }
                let state = registry.state();
                prop_assert_eq!(state.is_dragging, state.dragged_item.is_some());
            }

            registry.end_drag();
            let state = registry.state();
            prop_assert!(!state.is_dragging);
            prop_assert!(state.dragged_item.is_none());
            prop_assert!(state.dragged_over_item.is_none());
        }
    }

    #[test]
    fn test_every_mutation_notifies() {
        let registry = DragRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let _sub = registry.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        registry.start_drag(card_drag());
        registry.update_drag_over(Some(card_drop()));
        registry.update_drag_over(Some(card_drop()));
        registry.update_drag_over(None);
        registry.end_drag();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_subscriber_sees_new_state() {
        let registry = DragRegistry::new();
        let last = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&last);
        let _sub = registry.subscribe(move |state| {
            *sink.lock().unwrap() = Some(state.clone());
        });

        registry.start_drag(card_drag());
        let seen = last.lock().unwrap().clone().unwrap();
        assert!(seen.is_dragging);
        assert_eq!(seen.dragged_item, Some(card_drag()));
    }

    #[test]
    fn test_callback_may_read_registry() {
        let registry = DragRegistry::new();
        let reader = registry.clone();
        let observed = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&observed);
        let _sub = registry.subscribe(move |_| {
            if reader.is_dragging() {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        });

        registry.start_drag(card_drag());
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let registry = DragRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&calls);
        let explicit = registry.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let seen = Arc::clone(&calls);
        let scoped = registry.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.subscriber_count(), 2);

        explicit.unsubscribe();
        drop(scoped);
        assert_eq!(registry.subscriber_count(), 0);

        registry.start_drag(card_drag());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = DragRegistry::new();
        let sub = registry.subscribe(|_| {});
        drop(registry);
        drop(sub);
    }
}
