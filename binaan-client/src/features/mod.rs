//! Report pages
//!
//! Every page follows the same lifecycle: initialize (filter options, then
//! the first list page), change filters and refresh, open a detail record.
//! Each module owns its DTOs, endpoint functions, state slice and thunks.

pub mod kurikulum;
pub mod laporan_anak;
pub mod raport;
pub mod survey;
pub mod tutor;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One attended or missed activity, as listed in child and tutor details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id_aktivitas: u64,
    pub jenis_kegiatan: String,
    #[serde(default)]
    pub materi: Option<String>,
    pub tanggal: NaiveDate,
    pub status_kehadiran: String,
}

impl ActivityRecord {
    pub fn is_present(&self) -> bool {
        matches!(
            self.status_kehadiran.to_ascii_lowercase().as_str(),
            "hadir" | "terlambat"
        )
    }
}
