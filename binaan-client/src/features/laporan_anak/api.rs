//! Children report endpoints (`admin-shelter/laporan/anak-binaan`)

use serde::Deserialize;

use super::{AnakFilters, AnakSummary, ChildDetail, ChildReport};
use crate::api::{ApiError, ApiRequest, Backend, QueryParams, call};
use crate::page::{ListPayload, ReportFilters, year_bounds};

const BASE: &str = "admin-shelter/laporan/anak-binaan";

#[derive(Debug, Deserialize)]
struct ReportData {
    children: Vec<ChildReport>,
    #[serde(default)]
    summary: Option<AnakSummary>,
}

pub async fn list(
    api: &dyn Backend,
    filters: &AnakFilters,
    page: u32,
) -> Result<ListPayload<ChildReport, AnakSummary>, ApiError> {
    let request = ApiRequest::get(BASE).query(filters.to_query().set("page", page));
    let (data, pagination) = call::<ReportData>(api, request).await?.into_page()?;
    Ok(ListPayload::new(data.children)
        .with_summary(data.summary)
        .with_pagination(pagination))
}

/// Activities of one child within the filtered year
pub async fn child_detail(
    api: &dyn Backend,
    id_anak: u64,
    filters: &AnakFilters,
) -> Result<ChildDetail, ApiError> {
    let bounds = year_bounds(filters.year);
    let query = QueryParams::new()
        .opt("start_date", bounds.map(|(start, _)| start))
        .opt("end_date", bounds.map(|(_, end)| end))
        .opt("jenis_kegiatan", filters.jenis_kegiatan.as_deref());
    call(api, ApiRequest::get(format!("{BASE}/child/{id_anak}")).query(query))
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
