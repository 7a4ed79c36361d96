use binaan_dispatch::{Action, ActionSummary, AsyncOp, Rejection, RequestId};
use serde::Serialize;

use super::{RaportDetail, RaportFilterPatch, RaportFilters, RaportReport, RaportSummary, Semester};
use crate::page::{
    DetailState, ExpandedSet, ListPayload, ListState, OptionsState, ReportFilters, clear_errors,
    first_error,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RaportState {
    pub list: ListState<RaportReport, RaportSummary>,
    pub detail: DetailState<RaportDetail>,
    pub years: OptionsState<i32>,
    pub semesters: OptionsState<Semester>,
    pub filters: RaportFilters,
    pub expanded: ExpandedSet<u64>,
    pub initialize: AsyncOp,
    pub refresh: AsyncOp,
}

impl RaportState {
    pub fn error(&self) -> Option<&str> {
        first_error([
            &self.list.op,
            &self.detail.op,
            &self.years.op,
            &self.semesters.op,
            &self.initialize,
            &self.refresh,
        ])
    }

    /// The semester currently selected in the filters
    pub fn selected_semester(&self) -> Option<&Semester> {
        let id = self.filters.semester_id?;
        self.semesters.values.iter().find(|s| s.id_semester == id)
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum RaportAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, ListPayload<RaportReport, RaportSummary>),
    ListDidError(RequestId, Rejection),

    DetailFetch(RequestId),
    DetailDidLoad(RequestId, RaportDetail),
    DetailDidError(RequestId, Rejection),
    DetailClear,

    YearsFetch(RequestId),
    YearsDidLoad(RequestId, Vec<i32>),
    YearsDidError(RequestId, Rejection),

    SemestersFetch(RequestId),
    SemestersDidLoad(RequestId, Vec<Semester>),
    SemestersDidError(RequestId, Rejection),

    InitializeFetch(RequestId),
    InitializeDidComplete(RequestId),
    InitializeDidError(RequestId, Rejection),

    RefreshFetch(RequestId),
    RefreshDidComplete(RequestId),
    RefreshDidError(RequestId, Rejection),

    FiltersSet(RaportFilterPatch),
    FiltersReset,
    CardToggle(u64),
    ErrorClear,
}

impl ActionSummary for RaportAction {
    fn summary(&self) -> String {
        match self {
            RaportAction::ListDidLoad(id, payload) => {
                format!("ListDidLoad({id}, {} raport)", payload.items.len())
            }
            RaportAction::DetailDidLoad(id, detail) => format!(
                "DetailDidLoad({id}, anak {}, {} raport)",
                detail.child.id_anak,
                detail.raports.len()
            ),
            _ => format!("{:?}", self),
        }
    }
}

pub fn reduce(state: &mut RaportState, action: RaportAction) -> bool {
    match action {
        RaportAction::ListFetch(id) => {
            state.list.begin(id);
            true
        }
        RaportAction::ListDidLoad(id, payload) => state.list.load(id, payload),
        RaportAction::ListDidError(id, e) => state.list.fail(id, e),

        RaportAction::DetailFetch(id) => {
            state.detail.begin(id);
            true
        }
        RaportAction::DetailDidLoad(id, detail) => state.detail.load(id, detail),
        RaportAction::DetailDidError(id, e) => state.detail.fail(id, e),
        RaportAction::DetailClear => state.detail.clear(),

        RaportAction::YearsFetch(id) => {
            state.years.begin(id);
            true
        }
        RaportAction::YearsDidLoad(id, years) => state.years.load(id, years),
        RaportAction::YearsDidError(id, e) => state.years.fail(id, e),

        RaportAction::SemestersFetch(id) => {
            state.semesters.begin(id);
            true
        }
        RaportAction::SemestersDidLoad(id, semesters) => state.semesters.load(id, semesters),
        RaportAction::SemestersDidError(id, e) => state.semesters.fail(id, e),

        RaportAction::InitializeFetch(id) => {
            state.initialize.begin(id);
            true
        }
        RaportAction::InitializeDidComplete(id) => state.initialize.fulfill(id),
        RaportAction::InitializeDidError(id, e) => state.initialize.reject(id, e),

        RaportAction::RefreshFetch(id) => {
            state.refresh.begin(id);
            true
        }
        RaportAction::RefreshDidComplete(id) => state.refresh.fulfill(id),
        RaportAction::RefreshDidError(id, e) => state.refresh.reject(id, e),

        RaportAction::FiltersSet(patch) => {
            let before = state.filters.clone();
            state.filters.merge(patch);
            state.filters != before
        }
        RaportAction::FiltersReset => {
            state.filters = RaportFilters::default();
            true
        }
        RaportAction::CardToggle(id) => {
            state.expanded.toggle(id);
            true
        }
        RaportAction::ErrorClear => clear_errors([
            &mut state.list.op,
            &mut state.detail.op,
            &mut state.years.op,
            &mut state.semesters.op,
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
    fn test_selected_semester() {
        let mut harness = TestHarness::new(RaportState::default(), reduce);
        let id = RequestId::new(1);
        harness.dispatch(RaportAction::SemestersFetch(id));
        harness.dispatch(RaportAction::SemestersDidLoad(
            id,
            vec![
                Semester {
                    id_semester: 1,
                    nama_semester: "Ganjil".into(),
                    tahun_ajaran: None,
                },
                Semester {
                    id_semester: 2,
                    nama_semester: "Genap".into(),
                    tahun_ajaran: None,
                },
            ],
        ));
        assert_eq!(harness.state.selected_semester(), None);

        harness.dispatch(RaportAction::FiltersSet(RaportFilterPatch {
            semester_id: Some(Some(2)),
            ..Default::default()
        }));
        assert_eq!(
            harness.state.selected_semester().map(|s| s.nama_semester.as_str()),
            Some("Genap")
        );
    }

    #[test]
    fn test_rejected_sets_error_and_stops_loading() {
        let mut harness = TestHarness::new(RaportState::default(), reduce);
        let id = RequestId::new(1);
        harness.dispatch(RaportAction::DetailFetch(id));
        harness.dispatch(RaportAction::DetailDidError(id, "Failed to fetch raport detail".into()));

        assert!(!harness.state.detail.op.loading);
        assert_eq!(harness.state.error(), Some("Failed to fetch raport detail"));
        assert!(harness.dispatch(RaportAction::ErrorClear));
        assert_eq!(harness.state.error(), None);
    }

    #[test]
    fn test_reset_after_many_changes() {
        let mut harness = TestHarness::new(RaportState::default(), reduce);
        harness.dispatch_all([
            RaportAction::FiltersSet(RaportFilterPatch {
                year: Some(2020),
                semester_id: Some(Some(4)),
                ..Default::default()
            }),
            RaportAction::FiltersSet(RaportFilterPatch {
                status: Some(Some("draft".into())),
                search: Some(Some("andi".into())),
                ..Default::default()
            }),
        ]);
        harness.dispatch(RaportAction::FiltersReset);
        assert_eq!(harness.state.filters, RaportFilters::default());
    }
}
