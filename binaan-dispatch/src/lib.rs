//! binaan-dispatch: centralized state management with async thunks
//!
//! Like Redux Toolkit, but typed: state lives in one store, it only changes
//! through dispatched actions, and async operations report their lifecycle
//! (pending, fulfilled, rejected) as actions too.
//!
//! # Example
//! ```ignore
//! use binaan_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum TutorAction {
//!     ListFetch(RequestId),
//!     ListDidLoad(RequestId, Vec<TutorReport>),
//!     ListDidError(RequestId, Rejection),
//!     CardToggle(u64),
//! }
//!
//! assert_eq!(TutorAction::ListFetch(id).phase(), Some(Phase::Pending));
//! assert_eq!(TutorAction::ListDidError(id, e).category(), Some("list"));
//! ```

// Re-export everything from core
pub use binaan_dispatch_core::*;

// Re-export derive macros
pub use binaan_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use binaan_dispatch_core::{Action, ActionCategory, ActionSummary};

    // Lifecycle
    pub use binaan_dispatch_core::{settled, AsyncOp, Phase, Rejection, RequestId};

    // Store
    pub use binaan_dispatch_core::{ComposedMiddleware, Middleware, Reducer, SharedStore, Store};

    // Logging
    pub use binaan_dispatch_core::{ActionLoggerConfig, ActionLoggerMiddleware};

    // Tasks
    #[cfg(feature = "tasks")]
    pub use binaan_dispatch_core::{TaskKey, TaskManager};

    // Derive macros
    pub use binaan_dispatch_macros::Action;
}
