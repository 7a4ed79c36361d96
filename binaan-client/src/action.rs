//! Application actions
//!
//! Each page has its own action enum; the app-level [`Action`] forwards to
//! them so names, phases and summaries come from the feature action while the
//! category names the page (`kurikulum`, `anak`, ...).

use binaan_dispatch::ActionSummary;

use crate::features::kurikulum::KurikulumAction;
use crate::features::laporan_anak::AnakAction;
use crate::features::raport::RaportAction;
use crate::features::survey::SurveyAction;
use crate::features::tutor::TutorAction;

#[derive(binaan_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    #[action(forward)]
    Kurikulum(KurikulumAction),

    #[action(forward)]
    Anak(AnakAction),

    #[action(forward)]
    Raport(RaportAction),

    #[action(forward)]
    Tutor(TutorAction),

    #[action(forward)]
    Survey(SurveyAction),

    /// Logout: every page back to its initial state
    SessionReset,
}

impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::Kurikulum(action) => action.summary(),
            Action::Anak(action) => action.summary(),
            Action::Raport(action) => action.summary(),
            Action::Tutor(action) => action.summary(),
            Action::Survey(action) => action.summary(),
            Action::SessionReset => "SessionReset".to_string(),
        }
    }
}

macro_rules! impl_from_feature {
    ($($variant:ident($feature:ty)),* $(,)?) => {
        $(
            impl From<$feature> for Action {
                fn from(action: $feature) -> Self {
                    Action::$variant(action)
                }
            }
        )*
    };
}

impl_from_feature!(
    Kurikulum(KurikulumAction),
    Anak(AnakAction),
    Raport(RaportAction),
    Tutor(TutorAction),
    Survey(SurveyAction),
);
