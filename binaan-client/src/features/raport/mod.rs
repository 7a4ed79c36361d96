//! Raport laporan: report cards of the children in a shelter
//!
//! Semester options depend on the selected year, so the page loads years
//! first and semesters second.

pub mod api;
mod slice;
mod thunks;

use serde::{Deserialize, Serialize};

use crate::api::QueryParams;
use crate::page::{ReportFilters, current_year, patch_field};

pub use slice::{RaportAction, RaportState, reduce};
pub use thunks::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaportReport {
    pub id_raport: u64,
    pub id_anak: u64,
    pub full_name: String,
    pub semester: String,
    pub tahun_ajaran: String,
    #[serde(default)]
    pub nilai_rata_rata: Option<f64>,
    #[serde(default)]
    pub ranking: Option<u32>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaportSummary {
    pub total_raport: u32,
    #[serde(default)]
    pub published: u32,
    #[serde(default)]
    pub draft: u32,
    #[serde(default)]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id_semester: u64,
    pub nama_semester: String,
    #[serde(default)]
    pub tahun_ajaran: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NilaiMapel {
    pub mata_pelajaran: String,
    pub nilai: f64,
    #[serde(default)]
    pub predikat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaportEntry {
    pub id_raport: u64,
    pub semester: String,
    pub tahun_ajaran: String,
    #[serde(default)]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub catatan: Option<String>,
    #[serde(default)]
    pub nilai: Vec<NilaiMapel>,
}

impl RaportEntry {
    /// Mean of the subject grades, if any were recorded
    pub fn average(&self) -> Option<f64> {
        if self.nilai.is_empty() {
            return None;
        }
        let sum: f64 = self.nilai.iter().map(|n| n.nilai).sum();
        Some(sum / self.nilai.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaportChild {
    pub id_anak: u64,
    pub full_name: String,
    #[serde(default)]
    pub shelter_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaportDetail {
    pub child: RaportChild,
    #[serde(default)]
    pub raports: Vec<RaportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaportFilters {
    pub year: i32,
    pub semester_id: Option<u64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl Default for RaportFilters {
    fn default() -> Self {
        Self {
            year: current_year(),
            semester_id: None,
            status: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaportFilterPatch {
    pub year: Option<i32>,
    pub semester_id: Option<Option<u64>>,
    pub status: Option<Option<String>>,
    pub search: Option<Option<String>>,
}

impl ReportFilters for RaportFilters {
    type Patch = RaportFilterPatch;

    fn merge(&mut self, patch: RaportFilterPatch) {
        if let Some(year) = patch.year {
            self.year = year;
        }
        patch_field(&mut self.semester_id, patch.semester_id);
        patch_field(&mut self.status, patch.status);
        patch_field(&mut self.search, patch.search);
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set("year", self.year)
            .opt("semester_id", self.semester_id)
            .opt("status", self.status.as_deref())
            .opt("search", self.search.as_deref())
    }
}
