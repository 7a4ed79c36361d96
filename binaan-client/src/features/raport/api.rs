//! Report-card endpoints (`admin-shelter/laporan/raport`)

use serde::Deserialize;

use super::{RaportDetail, RaportFilters, RaportReport, RaportSummary, Semester};
use crate::api::{ApiError, ApiRequest, Backend, QueryParams, call};
use crate::page::{ListPayload, ReportFilters};

const BASE: &str = "admin-shelter/laporan/raport";

#[derive(Debug, Deserialize)]
struct ReportData {
    raport: Vec<RaportReport>,
    #[serde(default)]
    summary: Option<RaportSummary>,
}

pub async fn list(
    api: &dyn Backend,
    filters: &RaportFilters,
    page: u32,
) -> Result<ListPayload<RaportReport, RaportSummary>, ApiError> {
    let request = ApiRequest::get(BASE).query(filters.to_query().set("page", page));
    let (data, pagination) = call::<ReportData>(api, request).await?.into_page()?;
    Ok(ListPayload::new(data.raport)
        .with_summary(data.summary)
        .with_pagination(pagination))
}

pub async fn child_detail(
    api: &dyn Backend,
    id_anak: u64,
    filters: &RaportFilters,
) -> Result<RaportDetail, ApiError> {
    let query = QueryParams::new()
        .set("year", filters.year)
        .opt("semester_id", filters.semester_id);
    call(api, ApiRequest::get(format!("{BASE}/child/{id_anak}")).query(query))
        .await?
        .into_data()
}

pub async fn years(api: &dyn Backend) -> Result<Vec<i32>, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/filter-options/years")))
        .await?
        .into_data()
}

pub async fn semesters(api: &dyn Backend, year: i32) -> Result<Vec<Semester>, ApiError> {
    let request = ApiRequest::get(format!("{BASE}/filter-options/semesters"))
        .query(QueryParams::new().set("year", year));
    call(api, request).await?.into_data()
}
