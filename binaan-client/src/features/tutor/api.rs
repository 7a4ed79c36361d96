//! Tutor report endpoints (`admin-shelter/laporan/tutor`)

use serde::Deserialize;

use super::{TutorDetail, TutorFilters, TutorReport, TutorSummary};
use crate::api::{ApiError, ApiRequest, Backend, call};
use crate::page::{ListPayload, ReportFilters};

const BASE: &str = "admin-shelter/laporan/tutor";

#[derive(Debug, Deserialize)]
struct ReportData {
    tutors: Vec<TutorReport>,
    #[serde(default)]
    summary: Option<TutorSummary>,
}

pub async fn list(
    api: &dyn Backend,
    filters: &TutorFilters,
    page: u32,
) -> Result<ListPayload<TutorReport, TutorSummary>, ApiError> {
    let request = ApiRequest::get(BASE).query(filters.to_query().set("page", page));
    let (data, pagination) = call::<ReportData>(api, request).await?.into_page()?;
    Ok(ListPayload::new(data.tutors)
        .with_summary(data.summary)
        .with_pagination(pagination))
}

pub async fn detail(
    api: &dyn Backend,
    id_tutor: u64,
    filters: &TutorFilters,
) -> Result<TutorDetail, ApiError> {
    let query = filters.to_query();
    call(api, ApiRequest::get(format!("{BASE}/{id_tutor}")).query(query))
        .await?
        .into_data()
}

pub async fn years(api: &dyn Backend) -> Result<Vec<i32>, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/years")))
        .await?
        .into_data()
}

pub async fn jenis_kegiatan_options(api: &dyn Backend) -> Result<Vec<String>, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/jenis-kegiatan-options")))
        .await?
        .into_data()
}
