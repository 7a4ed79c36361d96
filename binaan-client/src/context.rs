//! The explicit application context
//!
//! One [`AppContext`] is built at start-up and handed to every thunk. It owns
//! the store handle and the backend; cloning it is cheap and shares both.

use std::future::Future;
use std::sync::Arc;

use binaan_dispatch::{
    ActionLogEntry, ActionLoggerConfig, ActionLoggerMiddleware, Rejection, RequestId,
    SharedActionLog, SharedStore, settled,
};

use crate::action::Action;
use crate::api::{ApiClient, ApiError, Backend};
use crate::config::{ClientConfig, InitPolicy};
use crate::reducer::reducer;
use crate::state::AppState;

pub type AppStore = SharedStore<AppState, Action>;

/// Entries kept by the action log
pub const ACTION_LOG_CAPACITY: usize = 200;

#[derive(Clone)]
pub struct AppContext {
    pub store: AppStore,
    pub api: Arc<dyn Backend>,
    pub policy: InitPolicy,
    action_log: Option<SharedActionLog>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("action_log", &self.action_log.is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(api: Arc<dyn Backend>, policy: InitPolicy) -> Self {
        Self {
            store: SharedStore::new(AppState::default(), reducer),
            api,
            policy,
            action_log: None,
        }
    }

    /// Context talking HTTP to the configured backend
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        let ctx = Self::new(Arc::new(client), config.init_policy);
        if !config.log_actions {
            return Ok(ctx);
        }
        // Card toggles stay excluded even under an include filter
        let filter = ActionLoggerConfig::new(config.action_filter.as_deref(), None);
        Ok(ctx.with_action_log(filter, ACTION_LOG_CAPACITY))
    }

    /// Trace dispatched actions and keep the last `capacity` that pass
    /// `filter` for [`recent_actions`](Self::recent_actions)
    pub fn with_action_log(mut self, filter: ActionLoggerConfig, capacity: usize) -> Self {
        let logger = ActionLoggerMiddleware::with_log(filter, capacity);
        self.action_log = logger.log().cloned();
        self.store.add_middleware(logger);
        self
    }

    /// Last `count` logged actions, oldest first; `None` without an action log
    pub fn recent_actions(&self, count: usize) -> Option<Vec<ActionLogEntry>> {
        self.action_log.as_ref().map(|log| log.recent(count))
    }

    pub fn dispatch(&self, action: impl Into<Action>) -> bool {
        self.store.dispatch(action.into())
    }

    pub fn select<R>(&self, selector: impl FnOnce(&AppState) -> R) -> R {
        self.store.select(selector)
    }

    /// Run `work` as a thunk built from a feature action's constructors.
    ///
    /// ```ignore
    /// ctx.run(
    ///     TutorAction::ListFetch,
    ///     async { api::list(ctx.api(), &filters).await.map_err(|e| e.reject(FALLBACK)) },
    ///     TutorAction::ListDidLoad,
    ///     TutorAction::ListDidError,
    /// )
    /// .await
    /// ```
    pub async fn run<F, T, Fut>(
        &self,
        pending: fn(RequestId) -> F,
        work: Fut,
        fulfilled: fn(RequestId, T) -> F,
        rejected: fn(RequestId, Rejection) -> F,
    ) -> Result<T, Rejection>
    where
        F: Into<Action>,
        T: Clone,
        Fut: Future<Output = Result<T, Rejection>>,
    {
        self.store
            .thunk(
                |id| pending(id).into(),
                work,
                settled(
                    move |id, value| fulfilled(id, value).into(),
                    move |id, error| rejected(id, error).into(),
                ),
            )
            .await
    }

    pub fn api(&self) -> &dyn Backend {
        self.api.as_ref()
    }

    /// Drop all page state, e.g. on logout
    pub fn reset_session(&self) {
        self.dispatch(Action::SessionReset);
    }
}

impl InitPolicy {
    /// Decide whether a page initializer may continue after its
    /// prerequisites settled. `failures` holds one entry per prerequisite.
    pub fn gate<'a>(
        &self,
        page: &str,
        failures: impl IntoIterator<Item = Option<&'a Rejection>>,
    ) -> Result<(), Rejection> {
        for rejection in failures.into_iter().flatten() {
            match self {
                InitPolicy::FailFast => return Err(rejection.clone()),
                InitPolicy::BestEffort => tracing::warn!(
                    page,
                    error = %rejection,
                    "filter options failed, loading list anyway"
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::api::Method;
    use crate::features::tutor;
    use crate::testing::{FakeBackend, test_context};
    use binaan_dispatch::Phase;

    #[tokio::test]
    async fn test_action_log_keeps_filtered_lifecycle() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, "admin-shelter/laporan/tutor", 500, Some("Server Error"));
        let ctx = test_context(&fake, InitPolicy::BestEffort)
            .with_action_log(ActionLoggerConfig::new(Some("List*"), None), ACTION_LOG_CAPACITY);

        tutor::fetch_list(&ctx, 1).await.unwrap_err();
        tutor::toggle_card(&ctx, 4);

        let entries = ctx.recent_actions(10).unwrap();
        let logged: Vec<_> = entries.iter().map(|e| (e.name, e.phase)).collect();
        assert_eq!(
            logged,
            vec![
                ("ListFetch", Some(Phase::Pending)),
                ("ListDidError", Some(Phase::Rejected)),
            ]
        );
        assert!(entries.iter().all(|e| e.state_changed == Some(true)));
    }

    #[test]
    fn test_no_action_log_by_default() {
        let ctx = test_context(&FakeBackend::new(), InitPolicy::BestEffort);
        assert!(ctx.recent_actions(5).is_none());
    }

    #[test]
    fn test_best_effort_gate_passes() {
        let failure = Rejection::new("Failed to fetch years");
        assert!(
            InitPolicy::BestEffort
                .gate("anak", [Some(&failure), None])
                .is_ok()
        );
    }

    #[test]
    fn test_fail_fast_gate_returns_first_failure() {
        let first = Rejection::new("years");
        let second = Rejection::new("jenis kegiatan");
        let err = InitPolicy::FailFast
            .gate("tutor", [None, Some(&first), Some(&second)])
            .unwrap_err();
        assert_eq!(err.message(), "years");
        assert!(InitPolicy::FailFast.gate("tutor", [None, None]).is_ok());
    }
}
