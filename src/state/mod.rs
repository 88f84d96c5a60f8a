//! In-process application state: the signed-in user and UI preferences.

mod session;
mod ui;

pub use session::SessionState;
pub use ui::{
    DEFAULT_TEXT_SCALE, MAX_TEXT_SCALE, MIN_TEXT_SCALE, UI_STORAGE_KEY, UiMode, UiPreferences,
    UiSettings, UnknownUiMode, clamp_text_scale,
};
