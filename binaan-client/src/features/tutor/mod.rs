//! Tutor laporan: attendance of the tutors teaching in a shelter

pub mod api;
mod slice;
mod thunks;

use serde::{Deserialize, Serialize};

use super::ActivityRecord;
use crate::api::QueryParams;
use crate::page::{ReportFilters, current_year, patch_field, year_bounds};

pub use slice::{TutorAction, TutorState, reduce};
pub use thunks::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorReport {
    pub id_tutor: u64,
    pub nama: String,
    /// Subject taught
    #[serde(default)]
    pub maple: Option<String>,
    pub total_activities: u32,
    pub attended: u32,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSummary {
    pub total_tutors: u32,
    pub total_activities: u32,
    pub average_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorInfo {
    pub id_tutor: u64,
    pub nama: String,
    #[serde(default)]
    pub maple: Option<String>,
    #[serde(default)]
    pub shelter_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorDetail {
    pub tutor: TutorInfo,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorFilters {
    pub year: i32,
    pub jenis_kegiatan: Option<String>,
    pub search: Option<String>,
}

impl Default for TutorFilters {
    fn default() -> Self {
        Self {
            year: current_year(),
            jenis_kegiatan: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TutorFilterPatch {
    pub year: Option<i32>,
    pub jenis_kegiatan: Option<Option<String>>,
    pub search: Option<Option<String>>,
}

impl ReportFilters for TutorFilters {
    type Patch = TutorFilterPatch;

    fn merge(&mut self, patch: TutorFilterPatch) {
        if let Some(year) = patch.year {
            self.year = year;
        }
        patch_field(&mut self.jenis_kegiatan, patch.jenis_kegiatan);
        patch_field(&mut self.search, patch.search);
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn to_query(&self) -> QueryParams {
        let bounds = year_bounds(self.year);
        QueryParams::new()
            .opt("start_date", bounds.map(|(start, _)| start))
            .opt("end_date", bounds.map(|(_, end)| end))
            .opt("jenis_kegiatan", self.jenis_kegiatan.as_deref())
            .opt("search", self.search.as_deref())
    }
}
