//! Kurikulum thunks
//!
//! Reads are latest-wins. Mutation flags stay loading while any submit of
//! that kind is in flight, and create/update refetch the current list page
//! afterwards instead of patching it locally.

use binaan_dispatch::Rejection;

use super::api::{self, MateriUpload};
use super::{
    Activation, Kurikulum, KurikulumAction, KurikulumDetail, KurikulumFilterPatch,
    KurikulumInput, UploadedMateri,
};
use crate::context::AppContext;
use crate::page::ListPayload;

pub const LIST_FALLBACK: &str = "Failed to fetch kurikulum list";
pub const DETAIL_FALLBACK: &str = "Failed to fetch kurikulum detail";
pub const YEARS_FALLBACK: &str = "Failed to fetch filter options";
pub const CREATE_FALLBACK: &str = "Failed to create kurikulum";
pub const UPDATE_FALLBACK: &str = "Failed to update kurikulum";
pub const DELETE_FALLBACK: &str = "Failed to delete kurikulum";
pub const ACTIVATE_FALLBACK: &str = "Failed to set active kurikulum";
pub const UPLOAD_FALLBACK: &str = "Failed to upload materi";

/// Fetch one page of the list with the stored filters
pub async fn fetch_list(
    ctx: &AppContext,
    page: u32,
) -> Result<ListPayload<Kurikulum, ()>, Rejection> {
    let filters = ctx.select(|s| s.kurikulum.filters.clone());
    ctx.run(
        KurikulumAction::ListFetch,
        async {
            api::list(ctx.api(), &filters, page)
                .await
                .map_err(|e| e.reject(LIST_FALLBACK))
        },
        KurikulumAction::ListDidLoad,
        KurikulumAction::ListDidError,
    )
    .await
}

pub async fn fetch_detail(ctx: &AppContext, id: u64) -> Result<KurikulumDetail, Rejection> {
    ctx.run(
        KurikulumAction::DetailFetch,
        async {
            api::detail(ctx.api(), id)
                .await
                .map_err(|e| e.reject(DETAIL_FALLBACK))
        },
        KurikulumAction::DetailDidLoad,
        KurikulumAction::DetailDidError,
    )
    .await
}

pub async fn fetch_years(ctx: &AppContext) -> Result<Vec<i32>, Rejection> {
    ctx.run(
        KurikulumAction::YearsFetch,
        async {
            api::filter_options(ctx.api())
                .await
                .map(|options| options.available_years)
                .map_err(|e| e.reject(YEARS_FALLBACK))
        },
        KurikulumAction::YearsDidLoad,
        KurikulumAction::YearsDidError,
    )
    .await
}

/// Load filter options, then the first page of the list
pub async fn initialize(
    ctx: &AppContext,
    patch: Option<KurikulumFilterPatch>,
) -> Result<(), Rejection> {
    ctx.run(
        KurikulumAction::InitializeFetch,
        async {
            if let Some(patch) = patch {
                ctx.dispatch(KurikulumAction::FiltersSet(patch));
            }
            let years = fetch_years(ctx).await;
            ctx.policy.gate("kurikulum", [years.as_ref().err()])?;
            fetch_list(ctx, 1).await.map(|_| ())
        },
        |id, _| KurikulumAction::InitializeDidComplete(id),
        KurikulumAction::InitializeDidError,
    )
    .await
}

/// Merge `patch` into the filters and reload from the first page
pub async fn update_filters_and_refresh(
    ctx: &AppContext,
    patch: KurikulumFilterPatch,
) -> Result<ListPayload<Kurikulum, ()>, Rejection> {
    ctx.dispatch(KurikulumAction::FiltersSet(patch));
    refresh(ctx).await
}

/// Reload the list from the first page with the current filters
pub async fn refresh(ctx: &AppContext) -> Result<ListPayload<Kurikulum, ()>, Rejection> {
    ctx.run(
        KurikulumAction::RefreshFetch,
        fetch_list(ctx, 1),
        |id, _| KurikulumAction::RefreshDidComplete(id),
        KurikulumAction::RefreshDidError,
    )
    .await
}

fn current_page(ctx: &AppContext) -> u32 {
    ctx.select(|s| s.kurikulum.list.current_page())
}

/// Refetch after a mutation; failures land in the list's own error
async fn reload_current_page(ctx: &AppContext) {
    let _ = fetch_list(ctx, current_page(ctx)).await;
}

pub async fn create(ctx: &AppContext, input: KurikulumInput) -> Result<Kurikulum, Rejection> {
    let created = ctx
        .run(
            KurikulumAction::CreateSubmit,
            async {
                api::create(ctx.api(), &input)
                    .await
                    .map_err(|e| e.reject(CREATE_FALLBACK))
            },
            KurikulumAction::CreateDidComplete,
            KurikulumAction::CreateDidError,
        )
        .await?;
    reload_current_page(ctx).await;
    Ok(created)
}

pub async fn update(
    ctx: &AppContext,
    id: u64,
    input: KurikulumInput,
) -> Result<Kurikulum, Rejection> {
    let updated = ctx
        .run(
            KurikulumAction::UpdateSubmit,
            async {
                api::update(ctx.api(), id, &input)
                    .await
                    .map_err(|e| e.reject(UPDATE_FALLBACK))
            },
            KurikulumAction::UpdateDidComplete,
            KurikulumAction::UpdateDidError,
        )
        .await?;
    reload_current_page(ctx).await;
    Ok(updated)
}

pub async fn delete(ctx: &AppContext, id: u64) -> Result<u64, Rejection> {
    ctx.run(
        KurikulumAction::DeleteSubmit,
        async {
            api::delete(ctx.api(), id)
                .await
                .map(|_| id)
                .map_err(|e| e.reject(DELETE_FALLBACK))
        },
        KurikulumAction::DeleteDidComplete,
        KurikulumAction::DeleteDidError,
    )
    .await
}

pub async fn set_active(ctx: &AppContext, id: u64) -> Result<Activation, Rejection> {
    ctx.run(
        KurikulumAction::ActivateSubmit,
        async {
            api::set_active(ctx.api(), id)
                .await
                .map_err(|e| e.reject(ACTIVATE_FALLBACK))
        },
        KurikulumAction::ActivateDidComplete,
        KurikulumAction::ActivateDidError,
    )
    .await
}

pub async fn upload_materi(
    ctx: &AppContext,
    kurikulum_id: u64,
    upload: MateriUpload,
) -> Result<UploadedMateri, Rejection> {
    ctx.run(
        KurikulumAction::UploadSubmit,
        async {
            api::upload_materi(ctx.api(), kurikulum_id, upload)
                .await
                .map_err(|e| e.reject(UPLOAD_FALLBACK))
        },
        KurikulumAction::UploadDidComplete,
        KurikulumAction::UploadDidError,
    )
    .await
}

pub fn reset_filters(ctx: &AppContext) {
    ctx.dispatch(KurikulumAction::FiltersReset);
}

pub fn toggle_card(ctx: &AppContext, id: u64) {
    ctx.dispatch(KurikulumAction::CardToggle(id));
}

pub fn clear_error(ctx: &AppContext) {
    ctx.dispatch(KurikulumAction::ErrorClear);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, RequestBody};
    use crate::config::InitPolicy;
    use crate::features::kurikulum::KurikulumStatus;
    use crate::testing::{FakeBackend, kurikulum_json, test_context};
    use binaan_dispatch::{Phase, RecordingMiddleware, phases};
    use serde_json::json;

    const PATH: &str = "admin-shelter/kurikulum";

    fn list_page(ids: &[u64], current_page: u32, last_page: u32, total: u64) -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "data": ids.iter().map(|id| kurikulum_json(*id, "nonaktif")).collect::<Vec<_>>(),
                "current_page": current_page,
                "last_page": last_page,
                "total": total
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_list_stores_paginator() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[1, 2, 3], 1, 2, 25));
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        let recorder = RecordingMiddleware::new();
        ctx.store.add_middleware(recorder.clone());

        let payload = fetch_list(&ctx, 1).await.unwrap();

        assert_eq!(payload.items.len(), 3);
        let pagination = ctx.select(|s| s.kurikulum.list.pagination).unwrap();
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.last_page, 2);
        assert_eq!(pagination.total, 25);
        assert!(!ctx.select(|s| s.kurikulum.list.op.loading));
        assert_eq!(
            phases(&recorder.take()),
            vec![Phase::Pending, Phase::Fulfilled]
        );
    }

    #[tokio::test]
    async fn test_fetch_list_failure_uses_fallback_message() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, PATH, 500, None);
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let err = fetch_list(&ctx, 1).await.unwrap_err();

        assert_eq!(err.message(), LIST_FALLBACK);
        let (loading, error) =
            ctx.select(|s| (s.kurikulum.list.op.loading, s.kurikulum.list.op.error.clone()));
        assert!(!loading);
        assert_eq!(error.as_deref(), Some("Failed to fetch kurikulum list"));
    }

    #[tokio::test]
    async fn test_list_query_carries_filters_and_page() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[], 2, 2, 0));
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        ctx.dispatch(KurikulumAction::FiltersSet(KurikulumFilterPatch {
            year: Some(2023),
            status: Some(Some(KurikulumStatus::Aktif)),
            ..Default::default()
        }));

        fetch_list(&ctx, 2).await.unwrap();

        let request = fake.last_request().unwrap();
        assert_eq!(request.query.get("tahun_berlaku"), Some("2023"));
        assert_eq!(request.query.get("status"), Some("aktif"));
        assert_eq!(request.query.get("page"), Some("2"));
        assert!(!request.query.contains("search"));
    }

    #[tokio::test]
    async fn test_initialize_is_best_effort_by_default() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, "admin-shelter/kurikulum/filter-options", 500, None);
        fake.respond(Method::Get, PATH, list_page(&[1], 1, 1, 1));
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        initialize(&ctx, None).await.unwrap();

        let state = ctx.store.snapshot().kurikulum;
        assert_eq!(state.years.op.error.as_deref(), Some(YEARS_FALLBACK));
        assert_eq!(state.list.items.len(), 1);
        assert!(state.initialize.is_idle());
    }

    #[tokio::test]
    async fn test_initialize_fail_fast_skips_list() {
        let fake = FakeBackend::new();
        fake.respond_status(Method::Get, "admin-shelter/kurikulum/filter-options", 500, None);
        fake.respond(Method::Get, PATH, list_page(&[1], 1, 1, 1));
        let ctx = test_context(&fake, InitPolicy::FailFast);

        let err = initialize(&ctx, None).await.unwrap_err();

        assert_eq!(err.message(), YEARS_FALLBACK);
        assert_eq!(fake.requests_to(Method::Get, PATH), 0);
        let state = ctx.store.snapshot().kurikulum;
        assert_eq!(state.initialize.error.as_deref(), Some(YEARS_FALLBACK));
        assert!(state.list.items.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_applies_patch_before_fetching() {
        let fake = FakeBackend::new();
        fake.respond(
            Method::Get,
            "admin-shelter/kurikulum/filter-options",
            json!({"success": true, "data": {"available_years": [2024, 2023]}}),
        );
        fake.respond(Method::Get, PATH, list_page(&[], 1, 1, 0));
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        initialize(
            &ctx,
            Some(KurikulumFilterPatch {
                year: Some(2023),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(ctx.select(|s| s.kurikulum.years.values.clone()), vec![2024, 2023]);
        let list_request = fake.last_request().unwrap();
        assert_eq!(list_request.query.get("tahun_berlaku"), Some("2023"));
    }

    #[tokio::test]
    async fn test_update_filters_and_refresh_resets_page() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[4], 1, 1, 1));
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        update_filters_and_refresh(
            &ctx,
            KurikulumFilterPatch {
                search: Some(Some("tematik".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let request = fake.last_request().unwrap();
        assert_eq!(request.query.get("search"), Some("tematik"));
        assert_eq!(request.query.get("page"), Some("1"));
        let state = ctx.store.snapshot().kurikulum;
        assert!(state.refresh.is_idle());
        assert_eq!(state.list.items[0].id, 4);
    }

    #[tokio::test]
    async fn test_delete_then_detail_is_cleared() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[1, 2], 1, 1, 2));
        fake.respond(
            Method::Get,
            "admin-shelter/kurikulum/2",
            json!({"success": true, "data": kurikulum_json(2, "draft")}),
        );
        fake.respond(
            Method::Delete,
            "admin-shelter/kurikulum/2",
            json!({"success": true, "message": "Kurikulum berhasil dihapus"}),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        fetch_list(&ctx, 1).await.unwrap();
        fetch_detail(&ctx, 2).await.unwrap();

        assert_eq!(delete(&ctx, 2).await.unwrap(), 2);

        let state = ctx.store.snapshot().kurikulum;
        assert_eq!(state.detail.value, None);
        assert_eq!(state.list.items.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_list() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[1], 1, 1, 1));
        fake.respond_status(
            Method::Delete,
            "admin-shelter/kurikulum/1",
            409,
            Some("Kurikulum masih dipakai"),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        fetch_list(&ctx, 1).await.unwrap();

        let err = delete(&ctx, 1).await.unwrap_err();

        assert_eq!(err.message(), "Kurikulum masih dipakai");
        let state = ctx.store.snapshot().kurikulum;
        assert_eq!(state.list.items.len(), 1);
        assert_eq!(state.delete.error.as_deref(), Some("Kurikulum masih dipakai"));
    }

    #[tokio::test]
    async fn test_set_active_deactivates_others() {
        let fake = FakeBackend::new();
        fake.respond(
            Method::Get,
            PATH,
            json!({
                "success": true,
                "data": {
                    "data": [kurikulum_json(1, "aktif"), kurikulum_json(3, "nonaktif")],
                    "current_page": 1, "last_page": 1, "total": 2
                }
            }),
        );
        fake.respond(
            Method::Post,
            "admin-shelter/kurikulum/3/set-active",
            json!({"success": true, "data": {"id": 3, "status": "aktif"}}),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        fetch_list(&ctx, 1).await.unwrap();

        set_active(&ctx, 3).await.unwrap();

        let items = ctx.select(|s| s.kurikulum.list.items.clone());
        assert_eq!(items[0].status, KurikulumStatus::Nonaktif);
        assert_eq!(items[1].status, KurikulumStatus::Aktif);
    }

    #[tokio::test]
    async fn test_create_refetches_current_page() {
        let fake = FakeBackend::new();
        fake.respond(Method::Get, PATH, list_page(&[1], 1, 1, 1));
        fake.respond(Method::Get, PATH, list_page(&[1, 7], 1, 1, 2));
        fake.respond(
            Method::Post,
            PATH,
            json!({"success": true, "data": kurikulum_json(7, "draft")}),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);
        fetch_list(&ctx, 1).await.unwrap();

        let created = create(
            &ctx,
            KurikulumInput {
                nama_kurikulum: "Kurikulum 7".into(),
                tahun_berlaku: 2024,
                deskripsi: None,
                id_jenjang: Some(2),
                status: KurikulumStatus::Draft,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.id, 7);
        let post = fake
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .unwrap();
        let RequestBody::Json(body) = post.body else {
            panic!("create sends JSON");
        };
        assert_eq!(body["nama_kurikulum"], "Kurikulum 7");
        assert!(body.get("deskripsi").is_none());
        assert_eq!(ctx.select(|s| s.kurikulum.list.items.len()), 2);
        assert!(ctx.select(|s| s.kurikulum.create.is_idle()));
    }

    #[tokio::test]
    async fn test_create_validation_error_is_flattened() {
        let fake = FakeBackend::new();
        fake.respond_json_status(
            Method::Post,
            PATH,
            422,
            json!({
                "message": "The given data was invalid.",
                "errors": {
                    "nama_kurikulum": ["Nama kurikulum wajib diisi."],
                    "tahun_berlaku": ["Tahun berlaku wajib diisi."]
                }
            }),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let err = create(
            &ctx,
            KurikulumInput {
                nama_kurikulum: String::new(),
                tahun_berlaku: 0,
                deskripsi: None,
                id_jenjang: None,
                status: KurikulumStatus::Draft,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.message(),
            "Nama kurikulum wajib diisi.\nTahun berlaku wajib diisi."
        );
        assert_eq!(fake.requests_to(Method::Get, PATH), 0);
    }

    #[tokio::test]
    async fn test_upload_materi_sends_multipart() {
        let fake = FakeBackend::new();
        fake.respond(
            Method::Post,
            "admin-shelter/kurikulum/4/materi",
            json!({"success": true, "data": {"id": 9, "nama_materi": "Pecahan"}}),
        );
        let ctx = test_context(&fake, InitPolicy::BestEffort);

        let uploaded = upload_materi(
            &ctx,
            4,
            MateriUpload {
                nama_materi: "Pecahan".into(),
                deskripsi: None,
                file: Some(crate::api::FileAttachment::new("pecahan.pdf", b"%PDF".to_vec())),
            },
        )
        .await
        .unwrap();

        assert_eq!(uploaded.kurikulum_id, 4);
        let request = fake.last_request().unwrap();
        assert!(request.is_upload());
        let RequestBody::Multipart(form) = request.body else {
            panic!("upload sends multipart");
        };
        assert_eq!(form.text_value("nama_materi"), Some("Pecahan"));
        assert!(form.has_file("file"));
    }
}
