//! Survey validation: branch admins review the family surveys submitted by
//! their shelters
//!
//! The statistics panel comes from its own endpoint rather than from the
//! list response, and is refetched after every validation.

pub mod api;
mod slice;
mod thunks;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::QueryParams;
use crate::page::{ReportFilters, current_year, patch_field};

pub use slice::{SurveyAction, SurveyState, reduce};
pub use thunks::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Layak,
    TidakLayak,
    TambahKelayakan,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Layak => "layak",
            ValidationStatus::TidakLayak => "tidak_layak",
            ValidationStatus::TambahKelayakan => "tambah_kelayakan",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(ValidationStatus::Pending),
            "layak" => Ok(ValidationStatus::Layak),
            "tidak_layak" => Ok(ValidationStatus::TidakLayak),
            "tambah_kelayakan" => Ok(ValidationStatus::TambahKelayakan),
            other => Err(format!("unknown validation status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id_survey: u64,
    /// Head of the surveyed family
    pub full_name: String,
    #[serde(default)]
    pub shelter_name: Option<String>,
    pub status_validasi: ValidationStatus,
    #[serde(default)]
    pub catatan_validasi: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub record: SurveyRecord,
    #[serde(default)]
    pub no_kk: Option<String>,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub penghasilan: Option<String>,
    #[serde(default)]
    pub jumlah_anak: Option<u32>,
    #[serde(default)]
    pub validated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub layak: u32,
    #[serde(default)]
    pub tidak_layak: u32,
    #[serde(default)]
    pub tambah_kelayakan: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub id_shelter: u64,
    pub nama_shelter: String,
}

/// Body of the validate call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub status_validasi: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catatan_validasi: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyFilters {
    pub year: i32,
    pub status: Option<ValidationStatus>,
    pub shelter_id: Option<u64>,
    pub search: Option<String>,
}

impl Default for SurveyFilters {
    fn default() -> Self {
        Self {
            year: current_year(),
            status: None,
            shelter_id: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyFilterPatch {
    pub year: Option<i32>,
    pub status: Option<Option<ValidationStatus>>,
    pub shelter_id: Option<Option<u64>>,
    pub search: Option<Option<String>>,
}

impl ReportFilters for SurveyFilters {
    type Patch = SurveyFilterPatch;

    fn merge(&mut self, patch: SurveyFilterPatch) {
        if let Some(year) = patch.year {
            self.year = year;
        }
        patch_field(&mut self.status, patch.status);
        patch_field(&mut self.shelter_id, patch.shelter_id);
        patch_field(&mut self.search, patch.search);
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set("year", self.year)
            .opt("status_validasi", self.status)
            .opt("id_shelter", self.shelter_id)
            .opt("search", self.search.as_deref())
    }
}
