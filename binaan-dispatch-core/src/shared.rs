//! Shared store handle for async code
//!
//! [`SharedStore`] wraps a [`Store`] behind an `Arc<Mutex<..>>`
//! so that thunks running on the tokio runtime can dispatch lifecycle actions
//! while readers select from the same state. It is created once at start-up
//! and passed around explicitly instead of living in a global.
//!
//! The lock is only held for the duration of a single reducer call or
//! selector, never across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::lifecycle::RequestId;
use crate::store::{ComposedMiddleware, Middleware, Reducer, Store};
use crate::Action;

/// Cloneable, thread-safe store handle
///
/// # Example
///
/// ```ignore
/// let store = SharedStore::new(AppState::default(), reducer);
/// let mut changes = store.subscribe();
///
/// store.dispatch(Action::FiltersSet(patch));
/// changes.changed().await?;
/// let year = store.select(|s| s.filters.year);
/// ```
pub struct SharedStore<S, A: Action> {
    inner: Arc<Mutex<Store<S, A>>>,
    requests: Arc<AtomicU64>,
    version: Arc<watch::Sender<u64>>,
}

impl<S, A: Action> Clone for SharedStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            requests: Arc::clone(&self.requests),
            version: Arc::clone(&self.version),
        }
    }
}

impl<S, A: Action> std::fmt::Debug for SharedStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore")
            .field("version", &*self.version.borrow())
            .field("requests", &self.requests.load(Ordering::Relaxed))
            .finish()
    }
}

impl<S, A: Action> SharedStore<S, A> {
    /// Create a store without middleware
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self::with_middleware(state, reducer, ComposedMiddleware::new())
    }

    /// Create a store whose dispatches run through `middleware`
    pub fn with_middleware(
        state: S,
        reducer: Reducer<S, A>,
        middleware: ComposedMiddleware<A>,
    ) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(Store::with_middleware(
                state, reducer, middleware,
            ))),
            requests: Arc::new(AtomicU64::new(0)),
            version: Arc::new(version),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store<S, A>> {
        // A panicking reducer must not wedge every later dispatch
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dispatch an action; subscribers are notified when the state changed
    pub fn dispatch(&self, action: A) -> bool {
        let changed = self.lock().dispatch(action);
        if changed {
            self.version.send_modify(|v| *v = v.wrapping_add(1));
        }
        changed
    }

    /// Read from the current state
    pub fn select<R>(&self, selector: impl FnOnce(&S) -> R) -> R {
        selector(self.lock().state())
    }

    /// Clone of the whole current state
    pub fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.lock().state().clone()
    }

    /// Replace the whole state (e.g. on logout) and notify subscribers
    pub fn reset(&self, state: S) {
        self.lock().replace(state);
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    /// Add middleware to an existing store
    pub fn add_middleware<M: Middleware<A> + Send + 'static>(&self, middleware: M) {
        self.lock().add_middleware(middleware);
    }

    /// Receiver that observes a new version after every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Number of state changes so far
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Allocate the next request id (starts at 1)
    pub fn next_request_id(&self) -> RequestId {
        RequestId::new(self.requests.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    #[derive(Clone, Debug)]
    enum CounterAction {
        Add(i32),
        Nothing,
    }

    impl Action for CounterAction {
        fn name(&self) -> &'static str {
            match self {
                CounterAction::Add(_) => "Add",
                CounterAction::Nothing => "Nothing",
            }
        }
    }

    fn reducer(state: &mut Counter, action: CounterAction) -> bool {
        match action {
            CounterAction::Add(n) => {
                state.value += n;
                true
            }
            CounterAction::Nothing => false,
        }
    }

    #[test]
    fn test_dispatch_and_select() {
        let store = SharedStore::new(Counter::default(), reducer);
        let handle = store.clone();

        assert!(handle.dispatch(CounterAction::Add(2)));
        assert!(!handle.dispatch(CounterAction::Nothing));

        assert_eq!(store.select(|s| s.value), 2);
        assert_eq!(store.snapshot(), Counter { value: 2 });
    }

    #[test]
    fn test_version_tracks_changes_only() {
        let store = SharedStore::new(Counter::default(), reducer);
        store.dispatch(CounterAction::Nothing);
        assert_eq!(store.version(), 0);

        store.dispatch(CounterAction::Add(1));
        store.dispatch(CounterAction::Add(1));
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn test_request_ids_are_monotonic() {
        let store = SharedStore::new(Counter::default(), reducer);
        let a = store.next_request_id();
        let b = store.clone().next_request_id();

        assert_eq!(a, RequestId::new(1));
        assert!(b > a);
    }

    #[test]
    fn test_reset_restores_state() {
        let store = SharedStore::new(Counter::default(), reducer);
        store.dispatch(CounterAction::Add(5));

        store.reset(Counter::default());

        assert_eq!(store.select(|s| s.value), 0);
        assert_eq!(store.version(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_observes_dispatch() {
        let store = SharedStore::new(Counter::default(), reducer);
        let mut rx = store.subscribe();

        let writer = store.clone();
        tokio::spawn(async move {
            writer.dispatch(CounterAction::Add(7));
        });

        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(store.select(|s| s.value), 7);
    }
}
