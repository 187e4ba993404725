use crate::data::RevealState;

/// Toggles a hidden cell to flagged and back. Revealed cells are returned
/// unchanged.
pub fn toggle_flag(state: &mut RevealState) -> RevealState {
    *state = match *state {
        RevealState::Hidden => RevealState::Flagged,
        RevealState::Flagged => RevealState::Hidden,
        RevealState::Revealed => RevealState::Revealed,
    };
    *state
}
