use binaan_dispatch::Rejection;

use super::api;
use super::{AnakAction, AnakFilterPatch, AnakSummary, ChildDetail, ChildReport};
use crate::context::AppContext;
use crate::page::ListPayload;

pub const LIST_FALLBACK: &str = "Failed to fetch laporan anak binaan";
pub const DETAIL_FALLBACK: &str = "Failed to fetch child detail report";
pub const YEARS_FALLBACK: &str = "Failed to fetch available years";
pub const JENIS_KEGIATAN_FALLBACK: &str = "Failed to fetch jenis kegiatan options";

pub type AnakPage = ListPayload<ChildReport, AnakSummary>;

pub async fn fetch_list(ctx: &AppContext, page: u32) -> Result<AnakPage, Rejection> {
    let filters = ctx.select(|s| s.anak.filters.clone());
    ctx.run(
        AnakAction::ListFetch,
        async {
            api::list(ctx.api(), &filters, page)
                .await
                .map_err(|e| e.reject(LIST_FALLBACK))
        },
        AnakAction::ListDidLoad,
        AnakAction::ListDidError,
    )
    .await
}

pub async fn fetch_child_detail(ctx: &AppContext, id_anak: u64) -> Result<ChildDetail, Rejection> {
    let filters = ctx.select(|s| s.anak.filters.clone());
    ctx.run(
        AnakAction::DetailFetch,
        async {
            api::child_detail(ctx.api(), id_anak, &filters)
                .await
                .map_err(|e| e.reject(DETAIL_FALLBACK))
        },
        AnakAction::DetailDidLoad,
        AnakAction::DetailDidError,
    )
    .await
}

pub async fn fetch_years(ctx: &AppContext) -> Result<Vec<i32>, Rejection> {
    ctx.run(
        AnakAction::YearsFetch,
        async {
            api::years(ctx.api())
                .await
                .map_err(|e| e.reject(YEARS_FALLBACK))
        },
        AnakAction::YearsDidLoad,
        AnakAction::YearsDidError,
    )
    .await
}

pub async fn fetch_jenis_kegiatan(ctx: &AppContext) -> Result<Vec<String>, Rejection> {
    ctx.run(
        AnakAction::JenisKegiatanFetch,
        async {
            api::jenis_kegiatan_options(ctx.api())
                .await
                .map_err(|e| e.reject(JENIS_KEGIATAN_FALLBACK))
        },
        AnakAction::JenisKegiatanDidLoad,
        AnakAction::JenisKegiatanDidError,
    )
    .await
}

/// Years and activity types in parallel, then the first list page
pub async fn initialize(ctx: &AppContext, patch: Option<AnakFilterPatch>) -> Result<(), Rejection> {
    ctx.run(
        AnakAction::InitializeFetch,
        async {
            if let Some(patch) = patch {
                ctx.dispatch(AnakAction::FiltersSet(patch));
            }
            let (years, jenis) = tokio::join!(fetch_years(ctx), fetch_jenis_kegiatan(ctx));
            ctx.policy
                .gate("laporan anak", [years.as_ref().err(), jenis.as_ref().err()])?;
            fetch_list(ctx, 1).await.map(|_| ())
        },
        |id, _| AnakAction::InitializeDidComplete(id),
        AnakAction::InitializeDidError,
    )
    .await
}

pub async fn refresh(ctx: &AppContext) -> Result<AnakPage, Rejection> {
    ctx.run(
        AnakAction::RefreshFetch,
        fetch_list(ctx, 1),
        |id, _| AnakAction::RefreshDidComplete(id),
        AnakAction::RefreshDidError,
    )
    .await
}

pub async fn update_filters_and_refresh(
    ctx: &AppContext,
    patch: AnakFilterPatch,
) -> Result<AnakPage, Rejection> {
    ctx.dispatch(AnakAction::FiltersSet(patch));
    refresh(ctx).await
}

pub fn reset_filters(ctx: &AppContext) {
    ctx.dispatch(AnakAction::FiltersReset);
}

pub fn toggle_card(ctx: &AppContext, id_anak: u64) {
    ctx.dispatch(AnakAction::CardToggle(id_anak));
}

pub fn clear_error(ctx: &AppContext) {
    ctx.dispatch(AnakAction::ErrorClear);
}
