//! Survey validation endpoints (`admin-cabang/survey-validation`)

use super::{Shelter, SurveyDetail, SurveyFilters, SurveyRecord, SurveyStats, Validation};
use crate::api::{ApiError, ApiRequest, Backend, Paginated, QueryParams, call};
use crate::page::{ListPayload, ReportFilters};

const BASE: &str = "admin-cabang/survey-validation";

pub async fn list(
    api: &dyn Backend,
    filters: &SurveyFilters,
    page: u32,
) -> Result<ListPayload<SurveyRecord, ()>, ApiError> {
    let request = ApiRequest::get(BASE).query(filters.to_query().set("page", page));
    let paginated = call::<Paginated<SurveyRecord>>(api, request)
        .await?
        .into_data()?;
    Ok(ListPayload::new(paginated.data).with_pagination(Some(paginated.page)))
}

pub async fn detail(api: &dyn Backend, id_survey: u64) -> Result<SurveyDetail, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/{id_survey}")))
        .await?
        .into_data()
}

/// Counts per validation status, for the year and shelter being viewed
pub async fn stats(api: &dyn Backend, filters: &SurveyFilters) -> Result<SurveyStats, ApiError> {
    let query = QueryParams::new()
        .set("year", filters.year)
        .opt("id_shelter", filters.shelter_id);
    call(api, ApiRequest::get(format!("{BASE}/stats")).query(query))
        .await?
        .into_data()
}

pub async fn shelters(api: &dyn Backend) -> Result<Vec<Shelter>, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/shelters")))
        .await?
        .into_data()
}

pub async fn validate(
    api: &dyn Backend,
    id_survey: u64,
    validation: &Validation,
) -> Result<SurveyRecord, ApiError> {
    let request = ApiRequest::post(format!("{BASE}/{id_survey}/validate")).json(validation)?;
    call(api, request).await?.into_data()
}
