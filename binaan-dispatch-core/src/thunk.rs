//! Thunks: async operations that report their lifecycle to the store
//!
//! A thunk dispatches a *pending* action, awaits its work, and dispatches a
//! *settle* action carrying either the fulfilled payload or the rejection
//! message. Errors never escape a thunk as anything but a [`Rejection`], so
//! callers can chain on the returned `Result` (e.g. to show feedback) while
//! the store already holds the outcome.
//!
//! A thunk future dropped between the two (its task was aborted because a
//! newer reload superseded it) still settles: the drop dispatches the settle
//! action with [`Rejection::cancelled`], so no operation is left loading.
//!
//! ```ignore
//! let items = store
//!     .thunk(
//!         |id| Action::ListFetch(id),
//!         async { api::fetch_list(&backend, &query).await.map_err(|e| e.reject("Failed")) },
//!         settled(Action::ListDidLoad, Action::ListDidError),
//!     )
//!     .await?;
//! ```

use std::future::Future;
use std::marker::PhantomData;

use crate::lifecycle::{Rejection, RequestId};
use crate::shared::SharedStore;
use crate::Action;

/// Dispatches the settle action if the thunk is dropped before it finished
struct SettleOnDrop<'a, S, A, T, F>
where
    A: Action,
    F: FnOnce(RequestId, &Result<T, Rejection>) -> A,
{
    store: &'a SharedStore<S, A>,
    id: RequestId,
    settle: Option<F>,
    _result: PhantomData<fn() -> T>,
}

impl<S, A, T, F> SettleOnDrop<'_, S, A, T, F>
where
    A: Action,
    F: FnOnce(RequestId, &Result<T, Rejection>) -> A,
{
    fn disarm(mut self) -> Option<F> {
        self.settle.take()
    }
}

impl<S, A, T, F> Drop for SettleOnDrop<'_, S, A, T, F>
where
    A: Action,
    F: FnOnce(RequestId, &Result<T, Rejection>) -> A,
{
    fn drop(&mut self) {
        if let Some(settle) = self.settle.take() {
            let action = settle(self.id, &Err(Rejection::cancelled()));
            tracing::debug!(request = %self.id, action = action.name(), "thunk cancelled");
            self.store.dispatch(action);
        }
    }
}

impl<S, A: Action> SharedStore<S, A> {
    /// Run `work` as a thunk.
    ///
    /// `pending` builds the action dispatched before the work starts,
    /// `settle` builds the action dispatched once it finishes. Both receive
    /// the same [`RequestId`]. If the returned future is dropped early,
    /// `settle` still runs with [`Rejection::cancelled`].
    pub async fn thunk<T, Fut>(
        &self,
        pending: impl FnOnce(RequestId) -> A,
        work: Fut,
        settle: impl FnOnce(RequestId, &Result<T, Rejection>) -> A,
    ) -> Result<T, Rejection>
    where
        Fut: Future<Output = Result<T, Rejection>>,
    {
        let id = self.next_request_id();
        let action = pending(id);
        let name = action.name();
        tracing::debug!(request = %id, action = name, "thunk pending");
        self.dispatch(action);

        let guard = SettleOnDrop {
            store: self,
            id,
            settle: Some(settle),
            _result: PhantomData,
        };
        let result = work.await;

        if let Some(settle) = guard.disarm() {
            let action = settle(id, &result);
            match &result {
                Ok(_) => tracing::debug!(request = %id, action = action.name(), "thunk fulfilled"),
                Err(rejection) => tracing::warn!(
                    request = %id,
                    action = action.name(),
                    error = %rejection,
                    "thunk rejected"
                ),
            }
            self.dispatch(action);
        }
        result
    }
}

/// Build a settle closure from a fulfilled and a rejected constructor.
///
/// The fulfilled payload is cloned into the action so the thunk can still
/// return it to its caller.
pub fn settled<T: Clone, A>(
    fulfilled: impl FnOnce(RequestId, T) -> A,
    rejected: impl FnOnce(RequestId, Rejection) -> A,
) -> impl FnOnce(RequestId, &Result<T, Rejection>) -> A {
    move |id, result| match result {
        Ok(value) => fulfilled(id, value.clone()),
        Err(rejection) => rejected(id, rejection.clone()),
    }
}
