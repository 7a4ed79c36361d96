//! Laporan anak binaan: attendance report of the children in a shelter

pub mod api;
mod slice;
mod thunks;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ActivityRecord;
use crate::api::QueryParams;
use crate::page::{ReportFilters, current_year, patch_field, year_bounds};

pub use slice::{AnakAction, AnakState, reduce};
pub use thunks::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    #[serde(default)]
    pub total_activities: u32,
    #[serde(default)]
    pub attended: u32,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildReport {
    pub id_anak: u64,
    pub full_name: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub shelter_name: Option<String>,
    pub total_activities: u32,
    pub attended: u32,
    pub attendance_percentage: f64,
    /// Keyed by month number ("1".."12")
    #[serde(default)]
    pub monthly_data: BTreeMap<String, MonthlyAttendance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnakSummary {
    pub total_children: u32,
    pub total_activities: u32,
    pub average_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildInfo {
    pub id_anak: u64,
    pub full_name: String,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub shelter_name: Option<String>,
    #[serde(default)]
    pub kelompok: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDetail {
    pub child: ChildInfo,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

impl ChildDetail {
    pub fn attended(&self) -> usize {
        self.activities.iter().filter(|a| a.is_present()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnakFilters {
    pub year: i32,
    pub jenis_kegiatan: Option<String>,
    pub search: Option<String>,
}

impl Default for AnakFilters {
    fn default() -> Self {
        Self {
            year: current_year(),
            jenis_kegiatan: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnakFilterPatch {
    pub year: Option<i32>,
    pub jenis_kegiatan: Option<Option<String>>,
    pub search: Option<Option<String>>,
}

impl ReportFilters for AnakFilters {
    type Patch = AnakFilterPatch;

    fn merge(&mut self, patch: AnakFilterPatch) {
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
