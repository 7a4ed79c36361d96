use binaan_dispatch::{Action, ActionSummary, AsyncOp, Rejection, RequestId};
use serde::Serialize;

use super::{
    Activation, Kurikulum, KurikulumDetail, KurikulumFilterPatch, KurikulumFilters,
    KurikulumStatus, UploadedMateri,
};
use crate::page::{
    DetailState, ExpandedSet, ListPayload, ListState, OptionsState, ReportFilters, clear_errors,
    first_error,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KurikulumState {
    pub list: ListState<Kurikulum, ()>,
    pub detail: DetailState<KurikulumDetail>,
    pub years: OptionsState<i32>,
    pub filters: KurikulumFilters,
    pub expanded: ExpandedSet<u64>,
    pub initialize: AsyncOp,
    pub refresh: AsyncOp,
    pub create: AsyncOp,
    pub update: AsyncOp,
    pub delete: AsyncOp,
    pub activate: AsyncOp,
    pub upload: AsyncOp,
}

impl KurikulumState {
    /// First error across all operations, list first
    pub fn error(&self) -> Option<&str> {
        first_error(self.ops())
    }

    pub fn is_loading(&self) -> bool {
        self.ops().iter().any(|op| op.loading)
    }

    fn ops(&self) -> [&AsyncOp; 10] {
        [
            &self.list.op,
            &self.detail.op,
            &self.years.op,
            &self.initialize,
            &self.refresh,
            &self.create,
            &self.update,
            &self.delete,
            &self.activate,
            &self.upload,
        ]
    }

    fn ops_mut(&mut self) -> [&mut AsyncOp; 10] {
        [
            &mut self.list.op,
            &mut self.detail.op,
            &mut self.years.op,
            &mut self.initialize,
            &mut self.refresh,
            &mut self.create,
            &mut self.update,
            &mut self.delete,
            &mut self.activate,
            &mut self.upload,
        ]
    }

    /// The kurikulum currently marked active, if loaded
    pub fn active(&self) -> Option<&Kurikulum> {
        self.list.find(|k| k.status == KurikulumStatus::Aktif)
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum KurikulumAction {
    ListFetch(RequestId),
    ListDidLoad(RequestId, ListPayload<Kurikulum, ()>),
    ListDidError(RequestId, Rejection),

    DetailFetch(RequestId),
    DetailDidLoad(RequestId, KurikulumDetail),
    DetailDidError(RequestId, Rejection),
    DetailClear,

    YearsFetch(RequestId),
    YearsDidLoad(RequestId, Vec<i32>),
    YearsDidError(RequestId, Rejection),

    InitializeFetch(RequestId),
    InitializeDidComplete(RequestId),
    InitializeDidError(RequestId, Rejection),

    RefreshFetch(RequestId),
    RefreshDidComplete(RequestId),
    RefreshDidError(RequestId, Rejection),

    CreateSubmit(RequestId),
    CreateDidComplete(RequestId, Kurikulum),
    CreateDidError(RequestId, Rejection),

    UpdateSubmit(RequestId),
    UpdateDidComplete(RequestId, Kurikulum),
    UpdateDidError(RequestId, Rejection),

    DeleteSubmit(RequestId),
    DeleteDidComplete(RequestId, u64),
    DeleteDidError(RequestId, Rejection),

    ActivateSubmit(RequestId),
    ActivateDidComplete(RequestId, Activation),
    ActivateDidError(RequestId, Rejection),

    UploadSubmit(RequestId),
    UploadDidComplete(RequestId, UploadedMateri),
    UploadDidError(RequestId, Rejection),

    FiltersSet(KurikulumFilterPatch),
    FiltersReset,
    CardToggle(u64),
    ErrorClear,
}

impl ActionSummary for KurikulumAction {
    fn summary(&self) -> String {
        match self {
            KurikulumAction::ListDidLoad(id, payload) => format!(
                "ListDidLoad({id}, {} items, page {:?})",
                payload.items.len(),
                payload.pagination.map(|p| p.current_page)
            ),
            KurikulumAction::DetailDidLoad(id, detail) => format!(
                "DetailDidLoad({id}, kurikulum {}, {} materi)",
                detail.kurikulum.id,
                detail.materi.len()
            ),
            _ => format!("{:?}", self),
        }
    }
}

/// Activation is exclusive: the target becomes active, every other active
/// kurikulum becomes inactive
fn apply_activation(kurikulum: &mut Kurikulum, activation: Activation) {
    if kurikulum.id == activation.id {
        kurikulum.status = activation.status;
    } else if activation.status == KurikulumStatus::Aktif
        && kurikulum.status == KurikulumStatus::Aktif
    {
        kurikulum.status = KurikulumStatus::Nonaktif;
    }
}

pub fn reduce(state: &mut KurikulumState, action: KurikulumAction) -> bool {
    match action {
        KurikulumAction::ListFetch(id) => {
            state.list.begin(id);
            true
        }
        KurikulumAction::ListDidLoad(id, payload) => state.list.load(id, payload),
        KurikulumAction::ListDidError(id, e) => state.list.fail(id, e),

        KurikulumAction::DetailFetch(id) => {
            state.detail.begin(id);
            true
        }
        KurikulumAction::DetailDidLoad(id, detail) => state.detail.load(id, detail),
        KurikulumAction::DetailDidError(id, e) => state.detail.fail(id, e),
        KurikulumAction::DetailClear => state.detail.clear(),

        KurikulumAction::YearsFetch(id) => {
            state.years.begin(id);
            true
        }
        KurikulumAction::YearsDidLoad(id, years) => state.years.load(id, years),
        KurikulumAction::YearsDidError(id, e) => state.years.fail(id, e),

        KurikulumAction::InitializeFetch(id) => {
            state.initialize.begin(id);
            true
        }
        KurikulumAction::InitializeDidComplete(id) => state.initialize.fulfill(id),
        KurikulumAction::InitializeDidError(id, e) => state.initialize.reject(id, e),

        KurikulumAction::RefreshFetch(id) => {
            state.refresh.begin(id);
            true
        }
        KurikulumAction::RefreshDidComplete(id) => state.refresh.fulfill(id),
        KurikulumAction::RefreshDidError(id, e) => state.refresh.reject(id, e),

        KurikulumAction::CreateSubmit(id) => {
            state.create.begin(id);
            true
        }
        KurikulumAction::CreateDidComplete(_, _) => {
            state.create.succeed();
            true
        }
        KurikulumAction::CreateDidError(_, e) => {
            state.create.fail(e);
            true
        }

        KurikulumAction::UpdateSubmit(id) => {
            state.update.begin(id);
            true
        }
        KurikulumAction::UpdateDidComplete(_, updated) => {
            state.update.succeed();
            if let Some(detail) = &mut state.detail.value {
                if detail.kurikulum.id == updated.id {
                    detail.kurikulum = updated;
                }
            }
            true
        }
        KurikulumAction::UpdateDidError(_, e) => {
            state.update.fail(e);
            true
        }

        KurikulumAction::DeleteSubmit(id) => {
            state.delete.begin(id);
            true
        }
        KurikulumAction::DeleteDidComplete(_, deleted) => {
            state.delete.succeed();
            state.list.remove_where(|k| k.id == deleted);
            state.expanded.remove(&deleted);
            if state
                .detail
                .value
                .as_ref()
                .is_some_and(|d| d.kurikulum.id == deleted)
            {
                state.detail.clear();
            }
            true
        }
        KurikulumAction::DeleteDidError(_, e) => {
            state.delete.fail(e);
            true
        }

        KurikulumAction::ActivateSubmit(id) => {
            state.activate.begin(id);
            true
        }
        KurikulumAction::ActivateDidComplete(_, activation) => {
            state.activate.succeed();
            for kurikulum in &mut state.list.items {
                apply_activation(kurikulum, activation);
            }
            if let Some(detail) = &mut state.detail.value {
                apply_activation(&mut detail.kurikulum, activation);
            }
            true
        }
        KurikulumAction::ActivateDidError(_, e) => {
            state.activate.fail(e);
            true
        }

        KurikulumAction::UploadSubmit(id) => {
            state.upload.begin(id);
            true
        }
        KurikulumAction::UploadDidComplete(_, uploaded) => {
            state.upload.succeed();
            if let Some(detail) = &mut state.detail.value {
                if detail.kurikulum.id == uploaded.kurikulum_id {
                    detail.materi.push(uploaded.materi);
                }
            }
            true
        }
        KurikulumAction::UploadDidError(_, e) => {
            state.upload.fail(e);
            true
        }

        KurikulumAction::FiltersSet(patch) => {
            let before = state.filters.clone();
            state.filters.merge(patch);
            state.filters != before
        }
        KurikulumAction::FiltersReset => {
            state.filters = KurikulumFilters::default();
            true
        }
        KurikulumAction::CardToggle(id) => {
            state.expanded.toggle(id);
            true
        }
        KurikulumAction::ErrorClear => clear_errors(state.ops_mut()),
    }
}
