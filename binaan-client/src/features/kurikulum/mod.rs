//! Kurikulum management: curricula of a shelter and their teaching materials
//!
//! Unlike the read-only reports this page also mutates: create, update,
//! delete, activate and material upload. Only one kurikulum is active at a
//! time; activating one deactivates the rest locally as well.

pub mod api;
mod slice;
mod thunks;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::QueryParams;
use crate::page::{ReportFilters, current_year, patch_field};

pub use slice::{KurikulumAction, KurikulumState, reduce};
pub use thunks::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KurikulumStatus {
    Aktif,
    Nonaktif,
    Draft,
}

impl KurikulumStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KurikulumStatus::Aktif => "aktif",
            KurikulumStatus::Nonaktif => "nonaktif",
            KurikulumStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for KurikulumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KurikulumStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aktif" => Ok(KurikulumStatus::Aktif),
            "nonaktif" => Ok(KurikulumStatus::Nonaktif),
            "draft" => Ok(KurikulumStatus::Draft),
            other => Err(format!("unknown kurikulum status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kurikulum {
    pub id: u64,
    pub nama_kurikulum: String,
    pub tahun_berlaku: i32,
    pub status: KurikulumStatus,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub id_jenjang: Option<u64>,
    #[serde(default)]
    pub total_materi: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Materi {
    pub id: u64,
    pub nama_materi: String,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KurikulumDetail {
    #[serde(flatten)]
    pub kurikulum: Kurikulum,
    #[serde(default)]
    pub materi: Vec<Materi>,
}

/// Body of create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KurikulumInput {
    pub nama_kurikulum: String,
    pub tahun_berlaku: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deskripsi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_jenjang: Option<u64>,
    pub status: KurikulumStatus,
}

/// `data` of the set-active response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub id: u64,
    pub status: KurikulumStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedMateri {
    pub kurikulum_id: u64,
    pub materi: Materi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KurikulumFilters {
    pub year: i32,
    pub status: Option<KurikulumStatus>,
    pub search: Option<String>,
}

impl Default for KurikulumFilters {
    fn default() -> Self {
        Self {
            year: current_year(),
            status: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KurikulumFilterPatch {
    pub year: Option<i32>,
    pub status: Option<Option<KurikulumStatus>>,
    pub search: Option<Option<String>>,
}

impl ReportFilters for KurikulumFilters {
    type Patch = KurikulumFilterPatch;

    fn merge(&mut self, patch: KurikulumFilterPatch) {
        if let Some(year) = patch.year {
            self.year = year;
        }
        patch_field(&mut self.status, patch.status);
        patch_field(&mut self.search, patch.search);
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .set("tahun_berlaku", self.year)
            .opt("status", self.status)
            .opt("search", self.search.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_merge_is_shallow() {
        let mut filters = KurikulumFilters {
            year: 2024,
            status: Some(KurikulumStatus::Aktif),
            search: Some("dasar".into()),
        };
        filters.merge(KurikulumFilterPatch {
            year: Some(2023),
            ..Default::default()
        });

        assert_eq!(filters.year, 2023);
        assert_eq!(filters.status, Some(KurikulumStatus::Aktif));
        assert_eq!(filters.search.as_deref(), Some("dasar"));
    }

    #[test]
    fn test_to_query_omits_unset() {
        let filters = KurikulumFilters {
            year: 2024,
            status: None,
            search: Some(String::new()),
        };
        let query = filters.to_query();
        assert_eq!(query.get("tahun_berlaku"), Some("2024"));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_detail_flattens_kurikulum() {
        let detail: KurikulumDetail = serde_json::from_value(json!({
            "id": 4,
            "nama_kurikulum": "Kurikulum Dasar",
            "tahun_berlaku": 2024,
            "status": "draft",
            "materi": [{"id": 1, "nama_materi": "Pecahan"}]
        }))
        .unwrap();

        assert_eq!(detail.kurikulum.id, 4);
        assert_eq!(detail.kurikulum.status, KurikulumStatus::Draft);
        assert_eq!(detail.materi[0].nama_materi, "Pecahan");
    }

    #[test]
    fn test_unknown_status_fails_loudly() {
        let result = serde_json::from_value::<Kurikulum>(json!({
            "id": 1,
            "nama_kurikulum": "X",
            "tahun_berlaku": 2024,
            "status": "archived"
        }));
        assert!(result.is_err());
    }
}
