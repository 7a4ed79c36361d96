use binaan_dispatch::{Action, ActionSummary, AsyncOp, Rejection, RequestId};
use serde::Serialize;

use super::{Shelter, SurveyDetail, SurveyFilterPatch, SurveyFilters, SurveyRecord, SurveyStats};
use crate::page::{
    DetailState, ExpandedSet, ListPayload, ListState, OptionsState, ReportFilters, clear_errors,
    first_error,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurveyState {
    pub list: ListState<SurveyRecord, ()>,
    pub detail: DetailState<SurveyDetail>,
    pub stats: DetailState<SurveyStats>,
    pub shelters: OptionsState<Shelter>,
    pub filters: SurveyFilters,
    pub expanded: ExpandedSet<u64>,
    pub initialize: AsyncOp,
    pub refresh: AsyncOp,
    pub validate: AsyncOp,
}

impl SurveyState {
    pub fn error(&self) -> Option<&str> {
        first_error([
            &self.list.op,
            &self.detail.op,
            &self.stats.op,
            &self.shelters.op,
            &self.initialize,
            &self.refresh,
            &self.validate,
        ])
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum SurveyAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, ListPayload<SurveyRecord, ()>),
    ListDidError(RequestId, Rejection),

    DetailFetch(RequestId),
    DetailDidLoad(RequestId, SurveyDetail),
    DetailDidError(RequestId, Rejection),
    DetailClear,

    StatsFetch(RequestId),
    StatsDidLoad(RequestId, SurveyStats),
    StatsDidError(RequestId, Rejection),

    SheltersFetch(RequestId),
    SheltersDidLoad(RequestId, Vec<Shelter>),
    SheltersDidError(RequestId, Rejection),

    InitializeFetch(RequestId),
    InitializeDidComplete(RequestId),
    InitializeDidError(RequestId, Rejection),

    RefreshFetch(RequestId),
    RefreshDidComplete(RequestId),
    RefreshDidError(RequestId, Rejection),

    ValidateSubmit(RequestId),
    ValidateDidComplete(RequestId, SurveyRecord),
    ValidateDidError(RequestId, Rejection),

    FiltersSet(SurveyFilterPatch),
    FiltersReset,
    CardToggle(u64),
    ErrorClear,
}

impl ActionSummary for SurveyAction {
    fn summary(&self) -> String {
        match self {
            SurveyAction::ListDidLoad(id, payload) => {
                format!("ListDidLoad({id}, {} surveys)", payload.items.len())
            }
            SurveyAction::ValidateDidComplete(id, record) => format!(
                "ValidateDidComplete({id}, survey {} -> {})",
                record.id_survey, record.status_validasi
            ),
            _ => format!("{:?}", self),
        }
    }
}

pub fn reduce(state: &mut SurveyState, action: SurveyAction) -> bool {
    match action {
        SurveyAction::ListFetch(id) => {
            state.list.begin(id);
            true
        }
        SurveyAction::ListDidLoad(id, payload) => state.list.load(id, payload),
        SurveyAction::ListDidError(id, e) => state.list.fail(id, e),

        SurveyAction::DetailFetch(id) => {
            state.detail.begin(id);
            true
        }
        SurveyAction::DetailDidLoad(id, detail) => state.detail.load(id, detail),
        SurveyAction::DetailDidError(id, e) => state.detail.fail(id, e),
        SurveyAction::DetailClear => state.detail.clear(),

        SurveyAction::StatsFetch(id) => {
            state.stats.begin(id);
            true
        }
        SurveyAction::StatsDidLoad(id, stats) => state.stats.load(id, stats),
        SurveyAction::StatsDidError(id, e) => state.stats.fail(id, e),

        SurveyAction::SheltersFetch(id) => {
            state.shelters.begin(id);
            true
        }
        SurveyAction::SheltersDidLoad(id, shelters) => state.shelters.load(id, shelters),
        SurveyAction::SheltersDidError(id, e) => state.shelters.fail(id, e),

        SurveyAction::InitializeFetch(id) => {
            state.initialize.begin(id);
            true
        }
        SurveyAction::InitializeDidComplete(id) => state.initialize.fulfill(id),
        SurveyAction::InitializeDidError(id, e) => state.initialize.reject(id, e),

        SurveyAction::RefreshFetch(id) => {
            state.refresh.begin(id);
            true
        }
        SurveyAction::RefreshDidComplete(id) => state.refresh.fulfill(id),
        SurveyAction::RefreshDidError(id, e) => state.refresh.reject(id, e),

        SurveyAction::ValidateSubmit(id) => {
            state.validate.begin(id);
            true
        }
        SurveyAction::ValidateDidComplete(_, record) => {
            state.validate.succeed();
            let id_survey = record.id_survey;
            if let Some(detail) = &mut state.detail.value {
                if detail.record.id_survey == id_survey {
                    detail.record = record.clone();
                }
            }
            state
                .list
                .replace_where(|r| r.id_survey == id_survey, record);
            true
        }
        SurveyAction::ValidateDidError(_, e) => {
            state.validate.fail(e);
            true
        }

        SurveyAction::FiltersSet(patch) => {
            let before = state.filters.clone();
            state.filters.merge(patch);
            state.filters != before
        }
        SurveyAction::FiltersReset => {
            state.filters = SurveyFilters::default();
            true
        }
        SurveyAction::CardToggle(id) => {
            state.expanded.toggle(id);
            true
        }
        SurveyAction::ErrorClear => clear_errors([
            &mut state.list.op,
            &mut state.detail.op,
            &mut state.stats.op,
            &mut state.shelters.op,
            &mut state.initialize,
            &mut state.refresh,
            &mut state.validate,
        ]),
    }
}
