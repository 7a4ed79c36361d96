//! Test utilities for binaan-dispatch applications
//!
//! - [`TestHarness`]: state + reducer with a record of dispatched actions and
//!   an emitted-action channel
//! - [`RecordingMiddleware`]: captures every action that reaches a
//!   [`SharedStore`](crate::SharedStore), for asserting thunk lifecycles
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```ignore
//! use binaan_dispatch::testing::{RecordingMiddleware, phases};
//!
//! let recorder = RecordingMiddleware::new();
//! store.add_middleware(recorder.clone());
//!
//! thunks::fetch_list(&ctx, 1).await?;
//!
//! assert_eq!(phases(&recorder.take()), vec![Phase::Pending, Phase::Fulfilled]);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::lifecycle::Phase;
use crate::store::{Middleware, Reducer};
use crate::{Action, ActionCategory};

/// Generic test harness for reducers.
///
/// Holds the state under test, runs actions through the reducer, and records
/// what was dispatched. Actions can also be emitted into a channel to
/// simulate what a thunk would dispatch later.
pub struct TestHarness<S, A: Action> {
    /// The state under test
    pub state: S,
    reducer: Reducer<S, A>,
    dispatched: Vec<A>,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            reducer,
            dispatched: Vec::new(),
            tx,
            rx,
        }
    }

    /// Run one action through the reducer
    pub fn dispatch(&mut self, action: A) -> bool {
        self.dispatched.push(action.clone());
        (self.reducer)(&mut self.state, action)
    }

    /// Run several actions; returns whether any of them changed the state
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = A>) -> bool {
        actions
            .into_iter()
            .fold(false, |changed, action| self.dispatch(action) || changed)
    }

    /// Actions dispatched so far
    pub fn dispatched(&self) -> &[A] {
        &self.dispatched
    }

    /// Sender for code under test that emits actions
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Dispatch everything emitted so far; returns whether the state changed
    pub fn process_emitted(&mut self) -> bool {
        let emitted = self.drain_emitted();
        self.dispatch_all(emitted)
    }
}

impl<S, A: ActionCategory> TestHarness<S, A> {
    /// Drain emitted actions of one category; the others stay queued.
    pub fn drain_category(&mut self, category: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .drain_emitted()
            .into_iter()
            .partition(|action| action.category() == Some(category));

        for action in rest {
            let _ = self.tx.send(action);
        }
        matching
    }
}

/// Middleware that records every dispatched action.
///
/// Cloning shares the underlying buffer, so one clone can be installed in a
/// store while the test keeps another.
#[derive(Debug)]
pub struct RecordingMiddleware<A> {
    actions: Arc<Mutex<Vec<A>>>,
}

impl<A> Clone for RecordingMiddleware<A> {
    fn clone(&self) -> Self {
        Self {
            actions: Arc::clone(&self.actions),
        }
    }
}

impl<A> Default for RecordingMiddleware<A> {
    fn default() -> Self {
        Self {
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: Clone> RecordingMiddleware<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn actions(&self) -> Vec<A> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the recorded actions
    pub fn take(&self) -> Vec<A> {
        std::mem::take(&mut *self.actions.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<A: Action> Middleware<A> for RecordingMiddleware<A> {
    fn before(&mut self, action: &A) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.clone());
    }

    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Lifecycle phases of the given actions, skipping non-lifecycle ones
pub fn phases<A: Action>(actions: &[A]) -> Vec<Phase> {
    actions.iter().filter_map(Action::phase).collect()
}

/// Names of the given actions
pub fn names<A: Action>(actions: &[A]) -> Vec<&'static str> {
    actions.iter().map(Action::name).collect()
}

/// Assert that a specific action was emitted.
///
/// ```ignore
/// assert_emitted!(actions, Action::Kurikulum(KurikulumAction::ListDidLoad(..)));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// First action matching a pattern, if any.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Number of actions matching a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions
            .iter()
            .filter(|a| matches!(a, $pattern $(if $guard)?))
            .count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        YearSet(i32),
        ListFetch,
        ListDidLoad,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::YearSet(_) => "YearSet",
                TestAction::ListFetch => "ListFetch",
                TestAction::ListDidLoad => "ListDidLoad",
            }
        }

        fn phase(&self) -> Option<Phase> {
            match self {
                TestAction::ListFetch => Some(Phase::Pending),
                TestAction::ListDidLoad => Some(Phase::Fulfilled),
                TestAction::YearSet(_) => None,
            }
        }
    }

    fn reducer(year: &mut i32, action: TestAction) -> bool {
        match action {
            TestAction::YearSet(y) if y != *year => {
                *year = y;
                true
            }
            _ => false,
        }
    }

    #[test]
    fn test_harness_dispatch_records() {
        let mut harness = TestHarness::new(2024, reducer);

        assert!(harness.dispatch(TestAction::YearSet(2023)));
        assert!(!harness.dispatch(TestAction::YearSet(2023)));

        assert_eq!(harness.state, 2023);
        assert_eq!(harness.dispatched().len(), 2);
    }

    #[test]
    fn test_harness_emit_and_process() {
        let mut harness = TestHarness::new(2024, reducer);
        harness.emit(TestAction::ListFetch);
        harness.emit(TestAction::YearSet(2020));

        assert!(harness.process_emitted());
        assert_eq!(harness.state, 2020);
        assert!(harness.drain_emitted().is_empty());
    }

    #[test]
    fn test_recording_middleware_shares_buffer() {
        let recorder = RecordingMiddleware::new();
        let mut installed = recorder.clone();

        installed.before(&TestAction::ListFetch);
        installed.before(&TestAction::YearSet(1));
        installed.before(&TestAction::ListDidLoad);

        let actions = recorder.take();
        assert_eq!(names(&actions), vec!["ListFetch", "YearSet", "ListDidLoad"]);
        assert_eq!(phases(&actions), vec![Phase::Pending, Phase::Fulfilled]);
        assert!(recorder.actions().is_empty());
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![TestAction::ListFetch, TestAction::YearSet(2024)];

        assert_emitted!(actions, TestAction::ListFetch);
        assert_emitted!(actions, TestAction::YearSet(y) if *y > 2000);
        assert_not_emitted!(actions, TestAction::ListDidLoad);

        assert!(find_emitted!(actions, TestAction::YearSet(_)).is_some());
        assert_eq!(count_emitted!(actions, TestAction::YearSet(_)), 1);
    }
}
