//! Kurikulum endpoints (`admin-shelter/kurikulum`)

use serde::Deserialize;

use super::{
    Activation, Kurikulum, KurikulumDetail, KurikulumFilters, KurikulumInput, Materi,
    UploadedMateri,
};
use crate::api::{ApiError, ApiRequest, Backend, FileAttachment, MultipartForm, Paginated, call};
use crate::page::{ListPayload, ReportFilters};

const BASE: &str = "admin-shelter/kurikulum";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KurikulumFilterOptions {
    #[serde(default)]
    pub available_years: Vec<i32>,
}

/// Fields of a material upload
#[derive(Debug, Clone, PartialEq)]
pub struct MateriUpload {
    pub nama_materi: String,
    pub deskripsi: Option<String>,
    pub file: Option<FileAttachment>,
}

impl MateriUpload {
    fn into_form(self) -> MultipartForm {
        let form = MultipartForm::new()
            .text("nama_materi", self.nama_materi)
            .text_opt("deskripsi", self.deskripsi);
        match self.file {
            Some(file) => form.file("file", file),
            None => form,
        }
    }
}

pub async fn list(
    api: &dyn Backend,
    filters: &KurikulumFilters,
    page: u32,
) -> Result<ListPayload<Kurikulum, ()>, ApiError> {
    let request = ApiRequest::get(BASE).query(filters.to_query().set("page", page));
    let paginated = call::<Paginated<Kurikulum>>(api, request).await?.into_data()?;
    Ok(ListPayload::new(paginated.data).with_pagination(Some(paginated.page)))
}

pub async fn detail(api: &dyn Backend, id: u64) -> Result<KurikulumDetail, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/{id}")))
        .await?
        .into_data()
}

pub async fn create(api: &dyn Backend, input: &KurikulumInput) -> Result<Kurikulum, ApiError> {
    call(api, ApiRequest::post(BASE).json(input)?)
        .await?
        .into_data()
}

pub async fn update(
    api: &dyn Backend,
    id: u64,
    input: &KurikulumInput,
) -> Result<Kurikulum, ApiError> {
    call(api, ApiRequest::put(format!("{BASE}/{id}")).json(input)?)
        .await?
        .into_data()
}

pub async fn delete(api: &dyn Backend, id: u64) -> Result<Option<String>, ApiError> {
    call::<serde_json::Value>(api, ApiRequest::delete(format!("{BASE}/{id}")))
        .await?
        .into_message()
}

pub async fn set_active(api: &dyn Backend, id: u64) -> Result<Activation, ApiError> {
    call(api, ApiRequest::post(format!("{BASE}/{id}/set-active")))
        .await?
        .into_data()
}

pub async fn filter_options(api: &dyn Backend) -> Result<KurikulumFilterOptions, ApiError> {
    call(api, ApiRequest::get(format!("{BASE}/filter-options")))
        .await?
        .into_data()
}

pub async fn upload_materi(
    api: &dyn Backend,
    kurikulum_id: u64,
    upload: MateriUpload,
) -> Result<UploadedMateri, ApiError> {
    let request =
        ApiRequest::post(format!("{BASE}/{kurikulum_id}/materi")).multipart(upload.into_form());
    let materi: Materi = call(api, request).await?.into_data()?;
    Ok(UploadedMateri {
        kurikulum_id,
        materi,
    })
}
