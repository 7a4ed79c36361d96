//! Async operation lifecycle bookkeeping
//!
//! Every async operation category in a state slice (list fetch, detail fetch,
//! filter options, page initialization, refresh, ...) owns one [`AsyncOp`].
//! Flags are never shared between operations, so one operation failing can't
//! clobber another operation's in-flight state.
//!
//! Requests are tagged with a [`RequestId`]. For "latest wins" operations the
//! reducer settles through [`AsyncOp::fulfill`] / [`AsyncOp::reject`], which
//! discard completions of superseded requests:
//!
//! ```
//! use binaan_dispatch_core::{AsyncOp, RequestId};
//!
//! let mut op = AsyncOp::default();
//! op.begin(RequestId::new(1));
//! op.begin(RequestId::new(2));
//!
//! // The slow first request finishes last: ignored
//! assert!(op.fulfill(RequestId::new(2)));
//! assert!(!op.reject(RequestId::new(1), "timeout"));
//! assert!(op.error.is_none());
//! ```

use std::fmt;

use serde::Serialize;

/// Phase of an async operation as reported by its actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    Fulfilled,
    Rejected,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Fulfilled => "fulfilled",
            Phase::Rejected => "rejected",
        }
    }

    /// Whether the operation has finished (either way)
    pub fn is_settled(&self) -> bool {
        !matches!(self, Phase::Pending)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic identifier of one dispatched async request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Loading/error pair of a single async operation category
///
/// `loading` stays set while any request started through [`begin`](Self::begin)
/// is unsettled: for latest-wins operations that is the newest request, for
/// mutations every overlapping submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsyncOp {
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip)]
    latest: Option<RequestId>,
    #[serde(skip)]
    in_flight: usize,
}

impl AsyncOp {
    /// Pending: mark loading, clear error, remember the request
    pub fn begin(&mut self, id: RequestId) {
        self.loading = true;
        self.error = None;
        self.latest = Some(id);
        self.in_flight += 1;
    }

    /// Whether `id` is the most recently started request
    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// Requests started and not yet settled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settle_one(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Fulfilled for a latest-wins operation.
    ///
    /// Returns `false` (and leaves the flags alone) when `id` was superseded.
    pub fn fulfill(&mut self, id: RequestId) -> bool {
        self.settle_one();
        if !self.is_current(id) {
            return false;
        }
        self.loading = false;
        self.error = None;
        true
    }

    /// Rejected for a latest-wins operation.
    ///
    /// Returns `false` (and leaves the flags alone) when `id` was superseded.
    /// A cancelled request only stops loading; it records no error.
    pub fn reject(&mut self, id: RequestId, rejection: impl Into<Rejection>) -> bool {
        self.settle_one();
        if !self.is_current(id) {
            return false;
        }
        self.loading = false;
        let rejection = rejection.into();
        if !rejection.is_cancelled() {
            self.error = Some(rejection.into_message());
        }
        true
    }

    /// Settle one overlapping request successfully.
    ///
    /// `loading` clears once the last in-flight request has settled.
    pub fn succeed(&mut self) {
        self.settle_one();
        self.loading = self.in_flight > 0;
        self.error = None;
    }

    /// Settle one overlapping request with an error.
    ///
    /// `loading` clears once the last in-flight request has settled.
    pub fn fail(&mut self, rejection: impl Into<Rejection>) {
        self.settle_one();
        self.loading = self.in_flight > 0;
        let rejection = rejection.into();
        if !rejection.is_cancelled() {
            self.error = Some(rejection.into_message());
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Neither loading nor failed
    pub fn is_idle(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// Normalized rejection payload of a thunk
///
/// Holds the human-readable message that ends up in a slice's error field.
/// A [cancelled](Self::cancelled) rejection settles its operation without
/// recording an error.
#[derive(Clone, PartialEq, Eq)]
pub struct Rejection {
    message: String,
    cancelled: bool,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cancelled: false,
        }
    }

    /// The work was dropped before it settled
    pub fn cancelled() -> Self {
        Self {
            message: "Request cancelled".to_string(),
            cancelled: true,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl fmt::Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            f.write_str("Cancelled")
        } else {
            f.debug_tuple("Rejection").field(&self.message).finish()
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rejection {}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_sets_loading_and_clears_error() {
        let mut op = AsyncOp::default();
        op.fail("boom");

        op.begin(RequestId::new(1));

        assert!(op.loading);
        assert!(op.error.is_none());
    }

    #[test]
    fn test_fulfill_current() {
        let mut op = AsyncOp::default();
        op.begin(RequestId::new(3));

        assert!(op.fulfill(RequestId::new(3)));
        assert!(!op.loading);
        assert!(op.error.is_none());
    }

    #[test]
    fn test_reject_current() {
        let mut op = AsyncOp::default();
        op.begin(RequestId::new(3));

        assert!(op.reject(RequestId::new(3), "Failed"));
        assert!(!op.loading);
        assert_eq!(op.error.as_deref(), Some("Failed"));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut op = AsyncOp::default();
        op.begin(RequestId::new(1));
        op.begin(RequestId::new(2));

        assert!(!op.fulfill(RequestId::new(1)));
        assert!(op.loading, "newer request still in flight");

        assert!(op.reject(RequestId::new(2), "late"));
        assert!(!op.loading);
    }

    #[test]
    fn test_overlapping_mutations_stay_loading_until_last_settles() {
        let mut op = AsyncOp::default();
        op.begin(RequestId::new(1));
        op.begin(RequestId::new(2));

        op.succeed();
        assert!(op.loading, "second submit still in flight");
        assert_eq!(op.in_flight(), 1);

        op.fail("second failed");
        assert!(!op.loading);
        assert_eq!(op.error.as_deref(), Some("second failed"));

        op.begin(RequestId::new(3));
        op.succeed();
        assert!(op.is_idle());
    }

    #[test]
    fn test_late_settle_after_reset_does_not_underflow() {
        let mut op = AsyncOp::default();
        op.succeed();
        assert_eq!(op.in_flight(), 0);
        assert!(!op.loading);
    }

    #[test]
    fn test_cancelled_settles_without_error() {
        let mut op = AsyncOp::default();
        op.begin(RequestId::new(1));
        assert!(op.reject(RequestId::new(1), Rejection::cancelled()));
        assert!(op.is_idle());

        let mut mutation = AsyncOp::default();
        mutation.begin(RequestId::new(2));
        mutation.fail(Rejection::cancelled());
        assert!(mutation.is_idle());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Pending.to_string(), "pending");
        assert!(Phase::Rejected.is_settled());
        assert!(!Phase::Pending.is_settled());
    }

    #[test]
    fn test_rejection_conversions() {
        let r: Rejection = "nope".into();
        assert_eq!(r.message(), "nope");
        assert!(!r.is_cancelled());
        assert!(Rejection::cancelled().is_cancelled());
        assert_eq!(format!("{:?}", Rejection::cancelled()), "Cancelled");
        assert_eq!(format!("{r:?}"), "Rejection(\"nope\")");
        assert_eq!(r.to_string(), "nope");
        assert_eq!(Rejection::from(String::from("x")).into_message(), "x");
    }
}
