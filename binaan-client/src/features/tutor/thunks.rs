use binaan_dispatch::Rejection;

use super::api;
use super::{TutorAction, TutorDetail, TutorFilterPatch, TutorReport, TutorSummary};
use crate::context::AppContext;
use crate::page::ListPayload;

pub const LIST_FALLBACK: &str = "Failed to fetch tutor report";
pub const DETAIL_FALLBACK: &str = "Failed to fetch tutor detail report";
pub const YEARS_FALLBACK: &str = "Failed to fetch available years";
pub const JENIS_KEGIATAN_FALLBACK: &str = "Failed to fetch jenis kegiatan options";

pub type TutorPage = ListPayload<TutorReport, TutorSummary>;

pub async fn fetch_list(ctx: &AppContext, page: u32) -> Result<TutorPage, Rejection> {
    let filters = ctx.select(|s| s.tutor.filters.clone());
    ctx.run(
        TutorAction::ListFetch,
        async {
            api::list(ctx.api(), &filters, page)
                .await
                .map_err(|e| e.reject(LIST_FALLBACK))
        },
        TutorAction::ListDidLoad,
        TutorAction::ListDidError,
    )
    .await
}

pub async fn fetch_detail(ctx: &AppContext, id_tutor: u64) -> Result<TutorDetail, Rejection> {
    let filters = ctx.select(|s| s.tutor.filters.clone());
    ctx.run(
        TutorAction::DetailFetch,
        async {
            api::detail(ctx.api(), id_tutor, &filters)
                .await
                .map_err(|e| e.reject(DETAIL_FALLBACK))
        },
        TutorAction::DetailDidLoad,
        TutorAction::DetailDidError,
    )
    .await
}

pub async fn fetch_years(ctx: &AppContext) -> Result<Vec<i32>, Rejection> {
    ctx.run(
        TutorAction::YearsFetch,
        async {
            api::years(ctx.api())
                .await
                .map_err(|e| e.reject(YEARS_FALLBACK))
        },
        TutorAction::YearsDidLoad,
        TutorAction::YearsDidError,
    )
    .await
}

pub async fn fetch_jenis_kegiatan(ctx: &AppContext) -> Result<Vec<String>, Rejection> {
    ctx.run(
        TutorAction::JenisKegiatanFetch,
        async {
            api::jenis_kegiatan_options(ctx.api())
                .await
                .map_err(|e| e.reject(JENIS_KEGIATAN_FALLBACK))
        },
        TutorAction::JenisKegiatanDidLoad,
        TutorAction::JenisKegiatanDidError,
    )
    .await
}

pub async fn initialize(
    ctx: &AppContext,
    patch: Option<TutorFilterPatch>,
) -> Result<(), Rejection> {
    ctx.run(
        TutorAction::InitializeFetch,
        async {
            if let Some(patch) = patch {
                ctx.dispatch(TutorAction::FiltersSet(patch));
            }
            let (years, jenis) = tokio::join!(fetch_years(ctx), fetch_jenis_kegiatan(ctx));
            ctx.policy
                .gate("tutor", [years.as_ref().err(), jenis.as_ref().err()])?;
            fetch_list(ctx, 1).await.map(|_| ())
        },
        |id, _| TutorAction::InitializeDidComplete(id),
        TutorAction::InitializeDidError,
    )
    .await
}

pub async fn refresh(ctx: &AppContext) -> Result<TutorPage, Rejection> {
    ctx.run(
        TutorAction::RefreshFetch,
        fetch_list(ctx, 1),
        |id, _| TutorAction::RefreshDidComplete(id),
        TutorAction::RefreshDidError,
    )
    .await
}

pub async fn update_filters_and_refresh(
    ctx: &AppContext,
    patch: TutorFilterPatch,
) -> Result<TutorPage, Rejection> {
    ctx.dispatch(TutorAction::FiltersSet(patch));
    refresh(ctx).await
}

pub fn reset_filters(ctx: &AppContext) {
    ctx.dispatch(TutorAction::FiltersReset);
}

pub fn toggle_card(ctx: &AppContext, id_tutor: u64) {
    ctx.dispatch(TutorAction::CardToggle(id_tutor));
}

pub fn clear_error(ctx: &AppContext) {
    ctx.dispatch(TutorAction::ErrorClear);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::config::InitPolicy;
    use crate::testing::{FakeBackend, test_context, tutor_report_json};
    use serde_json::json;

    const PATH: &str = "admin-shelter/laporan/tutor";

    fn report() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "tutors": [tutor_report_json(1, "Pak Darto"), tutor_report_json(2, "Bu Ani")],
                "summary": {"total_tutors": 2, "total_activities": 16, "average_attendance": 87.5}
            },
            "pagination": {"current_page": 1, "last_page": 3, "per_page": 2, "total": 6}
        })
    }

    #[tokio::test]
    async fn test_update_filters_and_refresh_merges_and_fetches() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, report());
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        ctx.dispatch(TutorAction::FiltersSet(TutorFilterPatch {
            year: Some(2024),
            search: Some(Some("ani".into())),
            ..Default::default()
        }));

        let page = update_filters_and_refresh(
            &ctx,
            TutorFilterPatch {
                jenis_kegiatan: Some(Some("Bimbel".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 2);
        let query = fake.last_request().unwrap().query;
        assert_eq!(query.get("start_date"), Some("2024-01-01"));
        assert_eq!(query.get("end_date"), Some("2024-12-31"));
        assert_eq!(query.get("jenis_kegiatan"), Some("Bimbel"));
        assert_eq!(query.get("search"), Some("ani"));
        assert_eq!(query.get("page"), Some("1"));

        let state = ctx.store.snapshot().tutor;
        assert_eq!(state.list.pagination.map(|p| p.last_page), Some(3));
        assert_eq!(state.list.summary.map(|s| s.total_tutors), Some(2));
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_both_flags() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, PATH, 503, Some("Server sedang maintenance"));
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let err = refresh(&ctx).await.unwrap_err();

        assert_eq!(err.message(), "Server sedang maintenance");
        let state = ctx.store.snapshot().tutor;
        assert_eq!(state.list.op.error.as_deref(), Some("Server sedang maintenance"));
        assert_eq!(state.refresh.error.as_deref(), Some("Server sedang maintenance"));
        assert!(!state.list.op.loading && !state.refresh.loading);
    }

    #[tokio::test]
    async fn test_initialize_best_effort_with_both_options_failing() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, "admin-shelter/laporan/tutor/years", 500, None);
        fake.respond_status(
            Method::Get,
            "admin-shelter/laporan/tutor/jenis-kegiatan-options",
            500,
            None,
        );
        fake.respond(Method::Get, PATH, report());
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        initialize(&ctx, None).await.unwrap();

        let state = ctx.store.snapshot().tutor;
        assert_eq!(state.years.op.error.as_deref(), Some(YEARS_FALLBACK));
        assert_eq!(
            state.jenis_kegiatan.op.error.as_deref(),
            Some(JENIS_KEGIATAN_FALLBACK)
        );
        assert_eq!(state.list.items.len(), 2);
    }

    #[tokio::test]
    async fn test_detail() {
        let fake = FakeBackend::new();
        fake.respond(
            Method::Get,
            "admin-shelter/laporan/tutor/2",
            json!({
                "success": true,
                "data": {
                    "tutor": {"id_tutor": 2, "nama": "Bu Ani", "maple": "Bahasa Inggris"},
                    "activities": [
                        {"id_aktivitas": 9, "jenis_kegiatan": "Bimbel", "materi": "Tenses", "tanggal": "2024-05-02", "status_kehadiran": "Hadir"}
                    ]
                }
            }),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let detail = fetch_detail(&ctx, 2).await.unwrap();

        assert_eq!(detail.tutor.nama, "Bu Ani");
        assert_eq!(detail.activities[0].materi.as_deref(), Some("Tenses"));
    }
}
