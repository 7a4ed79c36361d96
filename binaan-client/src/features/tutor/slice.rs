use binaan_dispatch::{Action, ActionSummary, AsyncOp, Rejection, RequestId};
use serde::Serialize;

use super::{TutorDetail, TutorFilterPatch, TutorFilters, TutorReport, TutorSummary};
use crate::page::{
    DetailState, ExpandedSet, ListPayload, ListState, OptionsState, ReportFilters, clear_errors,
    first_error,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TutorState {
    pub list: ListState<TutorReport, TutorSummary>,
    pub detail: DetailState<TutorDetail>,
    pub years: OptionsState<i32>,
    pub jenis_kegiatan: OptionsState<String>,
    pub filters: TutorFilters,
    pub expanded: ExpandedSet<u64>,
    pub initialize: AsyncOp,
    pub refresh: AsyncOp,
}

impl TutorState {
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
pub enum TutorAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, ListPayload<TutorReport, TutorSummary>),
    ListDidError(RequestId, Rejection),

    DetailFetch(RequestId),
    DetailDidLoad(RequestId, TutorDetail),
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

    FiltersSet(TutorFilterPatch),
    FiltersReset,
    CardToggle(u64),
    ErrorClear,
}

impl ActionSummary for TutorAction {
    fn summary(&self) -> String {
        match self {
            TutorAction::ListDidLoad(id, payload) => {
                format!("ListDidLoad({id}, {} tutors)", payload.items.len())
            }
            TutorAction::DetailDidLoad(id, detail) => {
                format!("DetailDidLoad({id}, tutor {})", detail.tutor.id_tutor)
            }
            _ => format!("{:?}", self),
        }
    }
}

pub fn reduce(state: &mut TutorState, action: TutorAction) -> bool {
    match action {
        TutorAction::ListFetch(id) => {
            state.list.begin(id);
            true
        }
        TutorAction::ListDidLoad(id, payload) => state.list.load(id, payload),
        TutorAction::ListDidError(id, e) => state.list.fail(id, e),

        TutorAction::DetailFetch(id) => {
            state.detail.begin(id);
            true
        }
        TutorAction::DetailDidLoad(id, detail) => state.detail.load(id, detail),
        TutorAction::DetailDidError(id, e) => state.detail.fail(id, e),
        TutorAction::DetailClear => state.detail.clear(),

        TutorAction::YearsFetch(id) => {
            state.years.begin(id);
            true
        }
        TutorAction::YearsDidLoad(id, years) => state.years.load(id, years),
        TutorAction::YearsDidError(id, e) => state.years.fail(id, e),

        TutorAction::JenisKegiatanFetch(id) => {
            state.jenis_kegiatan.begin(id);
            true
        }
        TutorAction::JenisKegiatanDidLoad(id, values) => state.jenis_kegiatan.load(id, values),
        TutorAction::JenisKegiatanDidError(id, e) => state.jenis_kegiatan.fail(id, e),

        TutorAction::InitializeFetch(id) => {
            state.initialize.begin(id);
            true
        }
        TutorAction::InitializeDidComplete(id) => state.initialize.fulfill(id),
        TutorAction::InitializeDidError(id, e) => state.initialize.reject(id, e),

        TutorAction::RefreshFetch(id) => {
            state.refresh.begin(id);
            true
        }
        TutorAction::RefreshDidComplete(id) => state.refresh.fulfill(id),
        TutorAction::RefreshDidError(id, e) => state.refresh.reject(id, e),

        TutorAction::FiltersSet(patch) => {
            let before = state.filters.clone();
            state.filters.merge(patch);
            state.filters != before
        }
        TutorAction::FiltersReset => {
            state.filters = TutorFilters::default();
            true
        }
        TutorAction::CardToggle(id) => {
            state.expanded.toggle(id);
            true
        }
        TutorAction::ErrorClear => clear_errors([
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

    #[test]
    fn test_stale_detail_is_discarded() {
        let mut harness = TestHarness::new(TutorState::default(), reduce);
        let first = RequestId::new(1);
        let second = RequestId::new(2);
        harness.dispatch(TutorAction::DetailFetch(first));
        harness.dispatch(TutorAction::DetailFetch(second));

        assert!(!harness.dispatch(TutorAction::DetailDidError(first, "late".into())));
        assert!(harness.state.detail.op.loading);
        assert_eq!(harness.state.error(), None);
    }

    #[test]
    fn test_card_toggle_round_trip() {
        let mut harness = TestHarness::new(TutorState::default(), reduce);
        harness.dispatch(TutorAction::CardToggle(1));
        harness.dispatch(TutorAction::CardToggle(2));
        harness.dispatch(TutorAction::CardToggle(1));

        let expanded: Vec<u64> = harness.state.expanded.iter().copied().collect();
        assert_eq!(expanded, vec![2]);
    }
}
