//! Building blocks shared by the report slices
//!
//! Every report page is the same shape: filters, a list with optional
//! summary and pagination, some option lists for the filter pickers, a detail
//! record, and the set of expanded cards. Each part owns its own [`AsyncOp`]
//! so concurrent operations never share a loading flag.

use std::collections::BTreeSet;
use std::fmt::Debug;

use binaan_dispatch::{AsyncOp, Rejection, RequestId};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::api::{PageInfo, QueryParams};

/// The calendar year, used as the default report filter
pub fn current_year() -> i32 {
    Local::now().year()
}

/// First and last day of `year`, for endpoints filtering by date range
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// First error among `ops`
pub fn first_error<'a>(ops: impl IntoIterator<Item = &'a AsyncOp>) -> Option<&'a str> {
    ops.into_iter().find_map(|op| op.error.as_deref())
}

/// Clear the error of every op. Returns whether any was set.
pub fn clear_errors<'a>(ops: impl IntoIterator<Item = &'a mut AsyncOp>) -> bool {
    ops.into_iter()
        .fold(false, |changed, op| op.error.take().is_some() || changed)
}

/// Apply a patch to a nullable field: `None` leaves it, `Some(v)` sets it
pub fn patch_field<T>(slot: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *slot = value;
    }
}

/// Filters of one report page
///
/// `Default` is the initial filter set: the current year, everything else
/// unset. [`merge`](Self::merge) is a shallow merge; fields absent from the
/// patch keep their value.
pub trait ReportFilters: Clone + Debug + Default + PartialEq + Send + 'static {
    type Patch: Clone + Debug + Default + PartialEq + Send + 'static;

    fn merge(&mut self, patch: Self::Patch);

    fn year(&self) -> i32;

    /// Query parameters for the list endpoint. Unset fields are omitted.
    fn to_query(&self) -> QueryParams;
}

/// Ids of the cards currently shown expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedSet<K: Ord>(BTreeSet<K>);

impl<K: Ord> Default for ExpandedSet<K> {
    fn default() -> Self {
        Self(BTreeSet::new())
    }
}

impl<K: Ord> ExpandedSet<K> {
    /// Flip one card. Returns whether it is now expanded.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn contains(&self, id: &K) -> bool {
        self.0.contains(id)
    }

    pub fn remove(&mut self, id: &K) -> bool {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.0.iter()
    }
}

/// One fetched page of a report list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPayload<T, Sum> {
    pub items: Vec<T>,
    pub summary: Option<Sum>,
    pub pagination: Option<PageInfo>,
}

impl<T, Sum> ListPayload<T, Sum> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            summary: None,
            pagination: None,
        }
    }

    pub fn with_summary(mut self, summary: Option<Sum>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_pagination(mut self, pagination: Option<PageInfo>) -> Self {
        self.pagination = pagination;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListState<T, Sum> {
    pub items: Vec<T>,
    pub summary: Option<Sum>,
    pub pagination: Option<PageInfo>,
    pub op: AsyncOp,
}

impl<T, Sum> Default for ListState<T, Sum> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            summary: None,
            pagination: None,
            op: AsyncOp::default(),
        }
    }
}

impl<T, Sum> ListState<T, Sum> {
    pub fn begin(&mut self, id: RequestId) {
        self.op.begin(id);
    }

    /// Replace items, summary and pagination wholesale. Stale ids are ignored.
    pub fn load(&mut self, id: RequestId, payload: ListPayload<T, Sum>) -> bool {
        if !self.op.fulfill(id) {
            return false;
        }
        self.items = payload.items;
        self.summary = payload.summary;
        self.pagination = payload.pagination;
        true
    }

    /// Record a failure; previously loaded items stay visible
    pub fn fail(&mut self, id: RequestId, error: impl Into<Rejection>) -> bool {
        self.op.reject(id, error)
    }

    /// Remove matching items. Returns how many were removed.
    pub fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        before - self.items.len()
    }

    /// Swap the first matching item for `replacement`
    pub fn replace_where(&mut self, pred: impl Fn(&T) -> bool, replacement: T) -> bool {
        match self.items.iter_mut().find(|item| pred(item)) {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => false,
        }
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    pub fn current_page(&self) -> u32 {
        self.pagination.map_or(1, |p| p.current_page)
    }
}

/// Values for one filter picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsState<T> {
    pub values: Vec<T>,
    pub op: AsyncOp,
}

impl<T> Default for OptionsState<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            op: AsyncOp::default(),
        }
    }
}

impl<T> OptionsState<T> {
    pub fn begin(&mut self, id: RequestId) {
        self.op.begin(id);
    }

    pub fn load(&mut self, id: RequestId, values: Vec<T>) -> bool {
        if !self.op.fulfill(id) {
            return false;
        }
        self.values = values;
        true
    }

    pub fn fail(&mut self, id: RequestId, error: impl Into<Rejection>) -> bool {
        self.op.reject(id, error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailState<T> {
    pub value: Option<T>,
    pub op: AsyncOp,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            value: None,
            op: AsyncOp::default(),
        }
    }
}

impl<T> DetailState<T> {
    pub fn begin(&mut self, id: RequestId) {
        self.op.begin(id);
    }

    pub fn load(&mut self, id: RequestId, value: T) -> bool {
        if !self.op.fulfill(id) {
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn fail(&mut self, id: RequestId, error: impl Into<Rejection>) -> bool {
        self.op.reject(id, error)
    }

    pub fn clear(&mut self) -> bool {
        self.value.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_toggle_twice_restores() {
        let mut expanded = ExpandedSet::default();
        assert!(expanded.toggle(7u64));
        assert!(expanded.contains(&7));
        assert!(!expanded.toggle(7));
        assert!(expanded.is_empty());
    }

    #[test]
    fn test_list_load_replaces_wholesale() {
        let mut list: ListState<u32, &str> = ListState::default();
        let first = RequestId::new(1);
        list.begin(first);
        list.load(first, ListPayload::new(vec![1, 2, 3]).with_summary(Some("a")));

        let second = RequestId::new(2);
        list.begin(second);
        assert!(list.op.loading);
        assert!(list.load(second, ListPayload::new(vec![9])));

        assert_eq!(list.items, vec![9]);
        assert_eq!(list.summary, None);
        assert!(!list.op.loading);
    }

    #[test]
    fn test_stale_list_response_is_ignored() {
        let mut list: ListState<u32, ()> = ListState::default();
        let old = RequestId::new(1);
        let new = RequestId::new(2);
        list.begin(old);
        list.begin(new);

        assert!(list.load(new, ListPayload::new(vec![2])));
        assert!(!list.load(old, ListPayload::new(vec![1])));
        assert!(!list.fail(old, "late"));

        assert_eq!(list.items, vec![2]);
        assert_eq!(list.op.error, None);
    }

    #[test]
    fn test_failure_keeps_items() {
        let mut list: ListState<u32, ()> = ListState::default();
        let id = RequestId::new(1);
        list.begin(id);
        list.load(id, ListPayload::new(vec![1]));

        let retry = RequestId::new(2);
        list.begin(retry);
        list.fail(retry, "Failed");

        assert_eq!(list.items, vec![1]);
        assert_eq!(list.op.error.as_deref(), Some("Failed"));
        assert!(!list.op.loading);
    }

    #[test]
    fn test_remove_where() {
        let mut list: ListState<u32, ()> = ListState::default();
        list.items = vec![1, 2, 3, 2];
        assert_eq!(list.remove_where(|n| *n == 2), 2);
        assert_eq!(list.items, vec![1, 3]);
        assert_eq!(list.current_page(), 1);
    }

    #[test]
    fn test_replace_where() {
        let mut list: ListState<(u32, &str), ()> = ListState::default();
        list.items = vec![(1, "pending"), (2, "pending")];
        assert!(list.replace_where(|(id, _)| *id == 2, (2, "layak")));
        assert!(!list.replace_where(|(id, _)| *id == 5, (5, "layak")));
        assert_eq!(list.items, vec![(1, "pending"), (2, "layak")]);
    }

    #[test]
    fn test_clear_errors() {
        let mut a = AsyncOp::default();
        let mut b = AsyncOp::default();
        b.fail("boom");
        assert_eq!(first_error([&a, &b]), Some("boom"));
        assert!(clear_errors([&mut a, &mut b]));
        assert_eq!(first_error([&a, &b]), None);
        assert!(!clear_errors([&mut a, &mut b]));
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start.to_string(), "2024-01-01");
        assert_eq!(end.to_string(), "2024-12-31");
    }

    #[test]
    fn test_patch_field() {
        let mut search = Some("budi".to_string());
        patch_field(&mut search, None);
        assert_eq!(search.as_deref(), Some("budi"));
        patch_field(&mut search, Some(None));
        assert_eq!(search, None);
        patch_field(&mut search, Some(Some("sari".into())));
        assert_eq!(search.as_deref(), Some("sari"));
    }
}
