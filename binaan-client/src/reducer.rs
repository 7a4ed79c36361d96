//! Root reducer: routes each action to its page's slice

use crate::action::Action;
use crate::features::{kurikulum, laporan_anak, raport, survey, tutor};
use crate::state::AppState;

/// Returns `true` if the state changed
pub fn reducer(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::Kurikulum(action) => kurikulum::reduce(&mut state.kurikulum, action),
        Action::Anak(action) => laporan_anak::reduce(&mut state.anak, action),
        Action::Raport(action) => raport::reduce(&mut state.raport, action),
        Action::Tutor(action) => tutor::reduce(&mut state.tutor, action),
        Action::Survey(action) => survey::reduce(&mut state.survey, action),
        Action::SessionReset => {
            *state = AppState::default();
            true
        }
    }
}
