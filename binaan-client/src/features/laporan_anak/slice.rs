use binaan_dispatch::{Action, ActionSummary, AsyncOp, Rejection, RequestId};
use serde::Serialize;

use super::{AnakFilterPatch, AnakFilters, AnakSummary, ChildDetail, ChildReport};
use crate::page::{
    DetailState, ExpandedSet, ListPayload, ListState, OptionsState, ReportFilters, clear_errors,
    first_error,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnakState {
    pub list: ListState<ChildReport, AnakSummary>,
    pub detail: DetailState<ChildDetail>,
    pub years: OptionsState<i32>,
    pub jenis_kegiatan: OptionsState<String>,
    pub filters: AnakFilters,
    pub expanded: ExpandedSet<u64>,
    pub initialize: AsyncOp,
    pub refresh: AsyncOp,
}

impl AnakState {
    pub fn error(&self) -> Option<&str> {
        first_error([
            &self.list.op,
            &self.detail.op,
            &self.years.op,
            &self.jenis_kegiatan.op,
            &self.initialize,
            &self.refresh,
        ])
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum AnakAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, ListPayload<ChildReport, AnakSummary>),
    ListDidError(RequestId, Rejection),

    DetailFetch(RequestId),
    DetailDidLoad(RequestId, ChildDetail),
    DetailDidError(RequestId, Rejection),
    DetailClear,

    YearsFetch(RequestId),
    YearsDidLoad(RequestId, Vec<i32>),
    YearsDidError(RequestId, Rejection),

    JenisKegiatanFetch(RequestId),
    JenisKegiatanDidLoad(RequestId, Vec<String>),
    JenisKegiatanDidError(RequestId, Rejection),

    InitializeFetch(RequestId),
    InitializeDidComplete(RequestId),
    InitializeDidError(RequestId, Rejection),

    RefreshFetch(RequestId),
    RefreshDidComplete(RequestId),
    RefreshDidError(RequestId, Rejection),

    FiltersSet(AnakFilterPatch),
    FiltersReset,
    CardToggle(u64),
    ErrorClear,
}

impl ActionSummary for AnakAction {
    fn summary(&self) -> String {
        match self {
            AnakAction::ListDidLoad(id, payload) => format!(
                "ListDidLoad({id}, {} children, total {:?})",
                payload.items.len(),
                payload.pagination.map(|p| p.total)
            ),
            AnakAction::DetailDidLoad(id, detail) => format!(
                "DetailDidLoad({id}, anak {}, {} activities)",
                detail.child.id_anak,
                detail.activities.len()
            ),
            _ => format!("{:?}", self),
        }
    }
}

pub fn reduce(state: &mut AnakState, action: AnakAction) -> bool {
    match action {
        AnakAction::ListFetch(id) => {
            state.list.begin(id);
            true
        }
        AnakAction::ListDidLoad(id, payload) => state.list.load(id, payload),
        AnakAction::ListDidError(id, e) => state.list.fail(id, e),

        AnakAction::DetailFetch(id) => {
            state.detail.begin(id);
            true
        }
        AnakAction::DetailDidLoad(id, detail) => state.detail.load(id, detail),
        AnakAction::DetailDidError(id, e) => state.detail.fail(id, e),
        AnakAction::DetailClear => state.detail.clear(),

        AnakAction::YearsFetch(id) => {
            state.years.begin(id);
            true
        }
        AnakAction::YearsDidLoad(id, years) => state.years.load(id, years),
        AnakAction::YearsDidError(id, e) => state.years.fail(id, e),

        AnakAction::JenisKegiatanFetch(id) => {
            state.jenis_kegiatan.begin(id);
            true
        }
        AnakAction::JenisKegiatanDidLoad(id, values) => state.jenis_kegiatan.load(id, values),
        AnakAction::JenisKegiatanDidError(id, e) => state.jenis_kegiatan.fail(id, e),

        AnakAction::InitializeFetch(id) => {
            state.initialize.begin(id);
            true
        }
        AnakAction::InitializeDidComplete(id) => state.initialize.fulfill(id),
        AnakAction::InitializeDidError(id, e) => state.initialize.reject(id, e),

        AnakAction::RefreshFetch(id) => {
            state.refresh.begin(id);
            true
        }
        AnakAction::RefreshDidComplete(id) => state.refresh.fulfill(id),
        AnakAction::RefreshDidError(id, e) => state.refresh.reject(id, e),

        AnakAction::FiltersSet(patch) => {
            let before = state.filters.clone();
            state.filters.merge(patch);
            state.filters != before
        }
        AnakAction::FiltersReset => {
            state.filters = AnakFilters::default();
            true
        }
        AnakAction::CardToggle(id) => {
            state.expanded.toggle(id);
            true
        }
        AnakAction::ErrorClear => clear_errors([
            &mut state.list.op,
            &mut state.detail.op,
            &mut state.years.op,
            &mut state.jenis_kegiatan.op,
            &mut state.initialize,
            &mut state.refresh,
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binaan_dispatch::TestHarness;

    fn harness() -> TestHarness<AnakState, AnakAction> {
        TestHarness::new(AnakState::default(), reduce)
    }

    #[test]
    fn test_options_have_independent_flags() {
        let mut harness = harness();
        let years = RequestId::new(1);
        let jenis = RequestId::new(2);
        harness.dispatch(AnakAction::YearsFetch(years));
        harness.dispatch(AnakAction::JenisKegiatanFetch(jenis));

        harness.dispatch(AnakAction::YearsDidError(years, "Failed to fetch years".into()));

        assert_eq!(harness.state.years.op.error.as_deref(), Some("Failed to fetch years"));
        assert!(harness.state.jenis_kegiatan.op.loading);
        assert_eq!(harness.state.jenis_kegiatan.op.error, None);
    }

    #[test]
    fn test_fulfilled_clears_error() {
        let mut harness = harness();
        let first = RequestId::new(1);
        harness.dispatch(AnakAction::ListFetch(first));
        harness.dispatch(AnakAction::ListDidError(first, "Failed".into()));

        let retry = RequestId::new(2);
        harness.dispatch(AnakAction::ListFetch(retry));
        assert_eq!(harness.state.list.op.error, None);
        harness.dispatch(AnakAction::ListDidLoad(retry, ListPayload::new(vec![])));

        assert!(!harness.state.list.op.loading);
        assert_eq!(harness.state.list.op.error, None);
        assert_eq!(harness.state.error(), None);
    }

    #[test]
    fn test_sync_actions_leave_async_flags_alone() {
        let mut harness = harness();
        let id = RequestId::new(1);
        harness.dispatch(AnakAction::ListFetch(id));

        harness.dispatch(AnakAction::FiltersSet(AnakFilterPatch {
            search: Some(Some("rina".into())),
            ..Default::default()
        }));
        harness.dispatch(AnakAction::CardToggle(3));
        harness.dispatch(AnakAction::FiltersReset);

        assert!(harness.state.list.op.loading);
        assert!(harness.state.expanded.contains(&3));
        assert_eq!(harness.state.filters, AnakFilters::default());
    }

    #[test]
    fn test_unchanged_filters_report_no_change() {
        let mut harness = harness();
        let year = harness.state.filters.year;
        assert!(!harness.dispatch(AnakAction::FiltersSet(AnakFilterPatch {
            year: Some(year),
            ..Default::default()
        })));
    }
}
