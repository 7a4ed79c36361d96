//! The reducer-driven store behind [`SharedStore`](crate::SharedStore)
//!
//! State only changes through [`Store::dispatch`]: middleware sees the action
//! first, the reducer applies it, and middleware sees it again together with
//! whether the state changed.

use std::fmt;

use crate::Action;

/// Applies an action to the state.
///
/// Returns `true` if the state changed and subscribers should be notified.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Hooks run around every reducer call
pub trait Middleware<A: Action> {
    fn before(&mut self, action: &A);

    fn after(&mut self, action: &A, state_changed: bool);
}

/// Ordered stack of middleware.
///
/// `before` hooks run in insertion order, `after` hooks in reverse, so the
/// first middleware added wraps all the others. Entries are `Send` so the
/// stack can live inside a [`SharedStore`](crate::SharedStore).
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A> + Send>>,
}

impl<A: Action> fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("len", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}

/// State plus the reducer and middleware that may change it
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    middleware: ComposedMiddleware<A>,
}

impl<S, A: Action> Store<S, A> {
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self::with_middleware(state, reducer, ComposedMiddleware::new())
    }

    pub fn with_middleware(
        state: S,
        reducer: Reducer<S, A>,
        middleware: ComposedMiddleware<A>,
    ) -> Self {
        Self {
            state,
            reducer,
            middleware,
        }
    }

    /// Run `action` through middleware and reducer; `true` if state changed
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = (self.reducer)(&mut self.state, action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Swap in a whole new state without running the reducer.
    /// Returns the previous state.
    pub fn replace(&mut self, state: S) -> S {
        std::mem::replace(&mut self.state, state)
    }

    pub fn add_middleware<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.middleware.add(middleware);
    }

    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Filters {
        year: i32,
        fetching: bool,
    }

    #[derive(Clone, Debug)]
    enum FilterAction {
        YearSet(i32),
        ListFetch,
        Ignored,
    }

    impl Action for FilterAction {
        fn name(&self) -> &'static str {
            match self {
                FilterAction::YearSet(_) => "YearSet",
                FilterAction::ListFetch => "ListFetch",
                FilterAction::Ignored => "Ignored",
            }
        }
    }

    fn reducer(state: &mut Filters, action: FilterAction) -> bool {
        match action {
            FilterAction::YearSet(year) if year == state.year => false,
            FilterAction::YearSet(year) => {
                state.year = year;
                true
            }
            FilterAction::ListFetch => {
                state.fetching = true;
                true
            }
            FilterAction::Ignored => false,
        }
    }

    /// Records `before:<tag>:<action>` and `after:<tag>:<changed>`
    struct Trace {
        tag: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware<FilterAction> for Trace {
        fn before(&mut self, action: &FilterAction) {
            let call = format!("before:{}:{}", self.tag, action.name());
            self.calls.lock().unwrap().push(call);
        }

        fn after(&mut self, _action: &FilterAction, state_changed: bool) {
            let call = format!("after:{}:{}", self.tag, state_changed);
            self.calls.lock().unwrap().push(call);
        }
    }

    #[test]
    fn test_dispatch_reports_change() {
        let mut store = Store::new(Filters::default(), reducer);

        assert!(store.dispatch(FilterAction::YearSet(2024)));
        assert!(!store.dispatch(FilterAction::YearSet(2024)));
        assert!(!store.dispatch(FilterAction::Ignored));
        assert!(store.dispatch(FilterAction::ListFetch));

        assert_eq!(store.state().year, 2024);
        assert!(store.state().fetching);
    }

    #[test]
    fn test_replace_returns_previous_state() {
        let mut store = Store::new(Filters::default(), reducer);
        store.dispatch(FilterAction::YearSet(2020));

        let previous = store.replace(Filters::default());

        assert_eq!(previous.year, 2020);
        assert_eq!(store.state().year, 0);
    }

    #[test]
    fn test_middleware_wraps_in_insertion_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut store = Store::new(Filters::default(), reducer);
        store.add_middleware(Trace {
            tag: "outer",
            calls: calls.clone(),
        });
        store.add_middleware(Trace {
            tag: "inner",
            calls: calls.clone(),
        });
        assert_eq!(store.middleware_count(), 2);

        store.dispatch(FilterAction::YearSet(2023));
        store.dispatch(FilterAction::Ignored);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "before:outer:YearSet",
                "before:inner:YearSet",
                "after:inner:true",
                "after:outer:true",
                "before:outer:Ignored",
                "before:inner:Ignored",
                "after:inner:false",
                "after:outer:false",
            ]
        );
    }

    #[test]
    fn test_replace_skips_middleware() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut middleware = ComposedMiddleware::new();
        middleware.add(Trace {
            tag: "only",
            calls: calls.clone(),
        });
        let mut store = Store::with_middleware(Filters::default(), reducer, middleware);

        store.replace(Filters {
            year: 2019,
            fetching: false,
        });

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(store.state().year, 2019);
    }
}
