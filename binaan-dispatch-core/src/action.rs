//! Action traits for type-safe state mutations

use std::fmt::Debug;

use crate::lifecycle::Phase;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: Thunks dispatch them from async tasks
///
/// Use `#[derive(Action)]` from `binaan-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;

    /// Lifecycle phase this action reports, if it belongs to an async operation
    fn phase(&self) -> Option<Phase> {
        None
    }
}

/// Concise description of an action for logs
///
/// The default uses the `Debug` output; override it for actions that carry
/// large payloads (entity lists, reports).
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

/// Actions grouped into categories (usually by feature prefix)
///
/// Generated by `#[derive(Action)]` with `#[action(infer_categories)]`.
pub trait ActionCategory: Action {
    /// Enum listing every category of this action type
    type Category: Copy + Eq + Debug;

    /// Category name, `None` for uncategorized actions
    fn category(&self) -> Option<&'static str>;

    /// Category as an enum value
    fn category_enum(&self) -> Self::Category;
}
