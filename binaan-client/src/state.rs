//! Application state: one slice per page

use serde::Serialize;

use crate::features::kurikulum::KurikulumState;
use crate::features::laporan_anak::AnakState;
use crate::features::raport::RaportState;
use crate::features::survey::SurveyState;
use crate::features::tutor::TutorState;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub kurikulum: KurikulumState,
    pub anak: AnakState,
    pub raport: RaportState,
    pub tutor: TutorState,
    pub survey: SurveyState,
}
