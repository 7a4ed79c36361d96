use binaan_dispatch::Rejection;

use super::api;
use super::{RaportAction, RaportDetail, RaportFilterPatch, RaportReport, RaportSummary, Semester};
use crate::context::AppContext;
use crate::page::ListPayload;

pub const LIST_FALLBACK: &str = "Failed to fetch raport laporan";
pub const DETAIL_FALLBACK: &str = "Failed to fetch raport detail";
pub const YEARS_FALLBACK: &str = "Failed to fetch available years";
pub const SEMESTERS_FALLBACK: &str = "Failed to fetch semester options";

pub type RaportPage = ListPayload<RaportReport, RaportSummary>;

pub async fn fetch_list(ctx: &AppContext, page: u32) -> Result<RaportPage, Rejection> {
    let filters = ctx.select(|s| s.raport.filters.clone());
    ctx.run(
        RaportAction::ListFetch,
        async {
            api::list(ctx.api(), &filters, page)
                .await
                .map_err(|e| e.reject(LIST_FALLBACK))
        },
        RaportAction::ListDidLoad,
        RaportAction::ListDidError,
    )
    .await
}

pub async fn fetch_child_detail(ctx: &AppContext, id_anak: u64) -> Result<RaportDetail, Rejection> {
    let filters = ctx.select(|s| s.raport.filters.clone());
    ctx.run(
        RaportAction::DetailFetch,
        async {
            api::child_detail(ctx.api(), id_anak, &filters)
                .await
                .map_err(|e| e.reject(DETAIL_FALLBACK))
        },
        RaportAction::DetailDidLoad,
        RaportAction::DetailDidError,
    )
    .await
}

pub async fn fetch_years(ctx: &AppContext) -> Result<Vec<i32>, Rejection> {
    ctx.run(
        RaportAction::YearsFetch,
        async {
            api::years(ctx.api())
                .await
                .map_err(|e| e.reject(YEARS_FALLBACK))
        },
        RaportAction::YearsDidLoad,
        RaportAction::YearsDidError,
    )
    .await
}

pub async fn fetch_semesters(ctx: &AppContext, year: i32) -> Result<Vec<Semester>, Rejection> {
    ctx.run(
        RaportAction::SemestersFetch,
        async {
            api::semesters(ctx.api(), year)
                .await
                .map_err(|e| e.reject(SEMESTERS_FALLBACK))
        },
        RaportAction::SemestersDidLoad,
        RaportAction::SemestersDidError,
    )
    .await
}

/// Years, then the semesters of the selected year, then the first list page
pub async fn initialize(
    ctx: &AppContext,
    patch: Option<RaportFilterPatch>,
) -> Result<(), Rejection> {
    ctx.run(
        RaportAction::InitializeFetch,
        async {
            if let Some(patch) = patch {
                ctx.dispatch(RaportAction::FiltersSet(patch));
            }
            let years = fetch_years(ctx).await;
            ctx.policy.gate("raport", [years.as_ref().err()])?;

            let year = ctx.select(|s| s.raport.filters.year);
            let semesters = fetch_semesters(ctx, year).await;
            ctx.policy.gate("raport", [semesters.as_ref().err()])?;

            fetch_list(ctx, 1).await.map(|_| ())
        },
        |id, _| RaportAction::InitializeDidComplete(id),
        RaportAction::InitializeDidError,
    )
    .await
}

pub async fn refresh(ctx: &AppContext) -> Result<RaportPage, Rejection> {
    ctx.run(
        RaportAction::RefreshFetch,
        fetch_list(ctx, 1),
        |id, _| RaportAction::RefreshDidComplete(id),
        RaportAction::RefreshDidError,
    )
    .await
}

/// Merge `patch` and reload. A year change also reloads the semester
/// options for the new year; their failure stays in the semesters flag.
pub async fn update_filters_and_refresh(
    ctx: &AppContext,
    patch: RaportFilterPatch,
) -> Result<RaportPage, Rejection> {
    let previous_year = ctx.select(|s| s.raport.filters.year);
    let new_year = patch.year.filter(|year| *year != previous_year);

    ctx.dispatch(RaportAction::FiltersSet(patch));
    if let Some(year) = new_year {
        let _ = fetch_semesters(ctx, year).await;
    }
    refresh(ctx).await
}

pub fn reset_filters(ctx: &AppContext) {
    ctx.dispatch(RaportAction::FiltersReset);
}

pub fn toggle_card(ctx: &AppContext, id_raport: u64) {
    ctx.dispatch(RaportAction::CardToggle(id_raport));
}

pub fn clear_error(ctx: &AppContext) {
    ctx.dispatch(RaportAction::ErrorClear);
}
