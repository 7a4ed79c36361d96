//! Core traits and types for binaan-dispatch
//!
//! This crate provides the state-management layer behind the binaan client:
//! a Redux-style store whose async operations ("thunks") report their
//! lifecycle through actions.
//!
//! # Core Concepts
//!
//! - **Action**: events that describe state changes
//! - **Store**: state container mutated only by a reducer
//! - **SharedStore**: cloneable handle used from async code
//! - **Thunk**: async work wrapped in pending / fulfilled / rejected actions
//! - **AsyncOp**: per-operation loading/error flags with stale-request discard
//! - **TaskManager**: keyed tasks where a new spawn supersedes the old one
//!
//! # Basic Example
//!
//! ```ignore
//! use binaan_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum ReportAction {
//!     ListFetch(RequestId),
//!     ListDidLoad(RequestId, Vec<Row>),
//!     ListDidError(RequestId, Rejection),
//! }
//!
//! fn reducer(state: &mut ReportState, action: ReportAction) -> bool {
//!     match action {
//!         ReportAction::ListFetch(id) => { state.list.begin(id); true }
//!         ReportAction::ListDidLoad(id, rows) => {
//!             if !state.list.fulfill(id) { return false; }
//!             state.rows = rows;
//!             true
//!         }
//!         ReportAction::ListDidError(id, e) => state.list.reject(id, e),
//!     }
//! }
//!
//! let store = SharedStore::new(ReportState::default(), reducer);
//! let rows = store
//!     .thunk(
//!         ReportAction::ListFetch,
//!         fetch_rows(),
//!         settled(ReportAction::ListDidLoad, ReportAction::ListDidError),
//!     )
//!     .await;
//! ```
//!
//! # Naming convention
//!
//! Pending actions end with a verb (`ListFetch`, `DeleteSubmit`), results use
//! `Did` (`ListDidLoad`, `ListDidError`). With `#[derive(Action)]` these are
//! categorized by prefix and their [`Phase`] is inferred from the name.

pub mod action;
pub mod lifecycle;
pub mod logger;
pub mod shared;
pub mod store;
#[cfg(feature = "tasks")]
pub mod tasks;
pub mod testing;
pub mod thunk;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Lifecycle exports
pub use lifecycle::{AsyncOp, Phase, Rejection, RequestId};

// Store exports
pub use shared::SharedStore;
pub use store::{ComposedMiddleware, Middleware, Reducer, Store};
pub use thunk::settled;

// Logging exports
pub use logger::{
    ActionLog, ActionLogEntry, ActionLoggerConfig, ActionLoggerMiddleware, SharedActionLog,
};

// Task exports (requires "tasks" feature)
#[cfg(feature = "tasks")]
pub use tasks::{TaskKey, TaskManager};

// Testing exports
pub use testing::{names, phases, RecordingMiddleware, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::lifecycle::{AsyncOp, Phase, Rejection, RequestId};
    pub use crate::logger::{ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::shared::SharedStore;
    pub use crate::store::{ComposedMiddleware, Middleware, Reducer, Store};
    #[cfg(feature = "tasks")]
    pub use crate::tasks::{TaskKey, TaskManager};
    pub use crate::thunk::settled;
}
