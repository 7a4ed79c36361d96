use binaan_dispatch::Rejection;

use super::api;
use super::{
    Shelter, SurveyAction, SurveyDetail, SurveyFilterPatch, SurveyRecord, SurveyStats, Validation,
};
use crate::config::InitPolicy;
use crate::context::AppContext;
use crate::page::ListPayload;

pub const LIST_FALLBACK: &str = "Failed to fetch survey list";
pub const DETAIL_FALLBACK: &str = "Failed to fetch survey detail";
pub const STATS_FALLBACK: &str = "Failed to fetch survey statistics";
pub const SHELTERS_FALLBACK: &str = "Failed to fetch shelters";
pub const VALIDATE_FALLBACK: &str = "Failed to validate survey";

pub type SurveyPage = ListPayload<SurveyRecord, ()>;

pub async fn fetch_list(ctx: &AppContext, page: u32) -> Result<SurveyPage, Rejection> {
    let filters = ctx.select(|s| s.survey.filters.clone());
    ctx.run(
        SurveyAction::ListFetch,
        async {
            api::list(ctx.api(), &filters, page)
                .await
                .map_err(|e| e.reject(LIST_FALLBACK))
        },
        SurveyAction::ListDidLoad,
        SurveyAction::ListDidError,
    )
    .await
}

pub async fn fetch_detail(ctx: &AppContext, id_survey: u64) -> Result<SurveyDetail, Rejection> {
    ctx.run(
        SurveyAction::DetailFetch,
        async {
            api::detail(ctx.api(), id_survey)
                .await
                .map_err(|e| e.reject(DETAIL_FALLBACK))
        },
        SurveyAction::DetailDidLoad,
        SurveyAction::DetailDidError,
    )
    .await
}

pub async fn fetch_stats(ctx: &AppContext) -> Result<SurveyStats, Rejection> {
    let filters = ctx.select(|s| s.survey.filters.clone());
    ctx.run(
        SurveyAction::StatsFetch,
        async {
            api::stats(ctx.api(), &filters)
                .await
                .map_err(|e| e.reject(STATS_FALLBACK))
        },
        SurveyAction::StatsDidLoad,
        SurveyAction::StatsDidError,
    )
    .await
}

pub async fn fetch_shelters(ctx: &AppContext) -> Result<Vec<Shelter>, Rejection> {
    ctx.run(
        SurveyAction::SheltersFetch,
        async {
            api::shelters(ctx.api())
                .await
                .map_err(|e| e.reject(SHELTERS_FALLBACK))
        },
        SurveyAction::SheltersDidLoad,
        SurveyAction::SheltersDidError,
    )
    .await
}

/// Shelter options first, then the list and the stats panel together
pub async fn initialize(
    ctx: &AppContext,
    patch: Option<SurveyFilterPatch>,
) -> Result<(), Rejection> {
    ctx.run(
        SurveyAction::InitializeFetch,
        async {
            if let Some(patch) = patch {
                ctx.dispatch(SurveyAction::FiltersSet(patch));
            }
            let shelters = fetch_shelters(ctx).await;
            ctx.policy.gate("survey", [shelters.as_ref().err()])?;

            let (list, stats) = tokio::join!(fetch_list(ctx, 1), fetch_stats(ctx));
            list?;
            match (stats, ctx.policy) {
                (Err(e), InitPolicy::FailFast) => Err(e),
                (Err(e), InitPolicy::BestEffort) => {
                    tracing::warn!(error = %e, "survey stats failed, keeping list");
                    Ok(())
                }
                (Ok(_), _) => Ok(()),
            }
        },
        |id, _| SurveyAction::InitializeDidComplete(id),
        SurveyAction::InitializeDidError,
    )
    .await
}

pub async fn refresh(ctx: &AppContext) -> Result<SurveyPage, Rejection> {
    ctx.run(
        SurveyAction::RefreshFetch,
        fetch_list(ctx, 1),
        |id, _| SurveyAction::RefreshDidComplete(id),
        SurveyAction::RefreshDidError,
    )
    .await
}

/// Stats follow the year and shelter filters, so they reload with the list
pub async fn update_filters_and_refresh(
    ctx: &AppContext,
    patch: SurveyFilterPatch,
) -> Result<SurveyPage, Rejection> {
    ctx.dispatch(SurveyAction::FiltersSet(patch));
    let (page, stats) = tokio::join!(refresh(ctx), fetch_stats(ctx));
    if let Err(e) = stats {
        tracing::warn!(error = %e, "survey stats refresh failed");
    }
    page
}

/// Record a verdict; the list row is replaced and the counts reloaded
pub async fn validate(
    ctx: &AppContext,
    id_survey: u64,
    validation: Validation,
) -> Result<SurveyRecord, Rejection> {
    let record = ctx
        .run(
            SurveyAction::ValidateSubmit,
            async {
                api::validate(ctx.api(), id_survey, &validation)
                    .await
                    .map_err(|e| e.reject(VALIDATE_FALLBACK))
            },
            SurveyAction::ValidateDidComplete,
            SurveyAction::ValidateDidError,
        )
        .await?;
    tracing::info!(id_survey, status = %record.status_validasi, "survey validated");

    if let Err(e) = fetch_stats(ctx).await {
        tracing::warn!(error = %e, "survey stats refresh failed");
    }
    Ok(record)
}

pub fn reset_filters(ctx: &AppContext) {
    ctx.dispatch(SurveyAction::FiltersReset);
}

pub fn toggle_card(ctx: &AppContext, id_survey: u64) {
    ctx.dispatch(SurveyAction::CardToggle(id_survey));
}

pub fn clear_error(ctx: &AppContext) {
    ctx.dispatch(SurveyAction::ErrorClear);
}
