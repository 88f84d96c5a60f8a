//! Persisted display preferences.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::session::{KeyValueStore, StorageError};

/// Storage key holding the UI preferences object.
pub const UI_STORAGE_KEY: &str = "ui";

/// Smallest accepted text scale factor.
pub const MIN_TEXT_SCALE: f32 = 0.5;
/// Largest accepted text scale factor.
pub const MAX_TEXT_SCALE: f32 = 1.5;
/// Text scale factor used when nothing valid is stored.
pub const DEFAULT_TEXT_SCALE: f32 = 1.0;

/// Colour scheme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Follow the operating system.
    #[default]
    System,
    Light,
    Dark,
}

impl UiMode {
    /// Stored string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a UI mode name that is not `system`, `light` or `dark`.
#[derive(Debug, thiserror::Error)]
#[error("unknown UI mode '{0}' (expected system, light or dark)")]
pub struct UnknownUiMode(String);

impl FromStr for UiMode {
    type Err = UnknownUiMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(UnknownUiMode(value.to_string())),
        }
    }
}

/// The stored preferences document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    /// Colour scheme.
    #[serde(default)]
    pub ui_mode: UiMode,
    /// Text scale factor in `0.5..=1.5`.
    #[serde(default = "default_text_scale")]
    pub tsf: f32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            ui_mode: UiMode::System,
            tsf: DEFAULT_TEXT_SCALE,
        }
    }
}

fn default_text_scale() -> f32 {
    DEFAULT_TEXT_SCALE
}

/// Clamps `value` into the accepted text scale range.
///
/// Non-finite input falls back to the default scale.
#[must_use]
pub fn clamp_text_scale(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE)
    } else {
        DEFAULT_TEXT_SCALE
    }
}

/// Observable UI preferences written through to storage on every change.
#[derive(Debug, Clone)]
pub struct UiSettings {
    sender: Arc<watch::Sender<UiPreferences>>,
    store: Arc<dyn KeyValueStore>,
}

impl UiSettings {
    /// Loads preferences from `store`; absent or corrupt entries yield defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage medium cannot be read.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let preferences = match store.get(UI_STORAGE_KEY)? {
            None => UiPreferences::default(),
            Some(raw) => match serde_json::from_str::<UiPreferences>(&raw) {
                Ok(mut stored) => {
                    stored.tsf = clamp_text_scale(stored.tsf);
                    stored
                }
                Err(error) => {
                    warn!(error = %error, "Stored UI preferences are corrupt; using defaults");
                    UiPreferences::default()
                }
            },
        };

        let (sender, _receiver) = watch::channel(preferences);
        Ok(Self {
            sender: Arc::new(sender),
            store,
        })
    }

    /// Current preferences.
    #[must_use]
    pub fn current(&self) -> UiPreferences {
        *self.sender.borrow()
    }

    /// Subscribes to preference changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiPreferences> {
        self.sender.subscribe()
    }

    /// Sets the colour scheme and persists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the preferences cannot be written.
    pub fn set_mode(&self, mode: UiMode) -> Result<UiPreferences, StorageError> {
        self.update(|preferences| preferences.ui_mode = mode)
    }

    /// Sets the text scale (clamped to `0.5..=1.5`) and persists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the preferences cannot be written.
    pub fn set_text_scale(&self, tsf: f32) -> Result<UiPreferences, StorageError> {
        self.update(|preferences| preferences.tsf = clamp_text_scale(tsf))
    }

    fn update(&self, apply: impl FnOnce(&mut UiPreferences)) -> Result<UiPreferences, StorageError> {
        let mut updated = self.current();
        apply(&mut updated);

        let raw = serde_json::to_string(&updated)?;
        self.store.put(UI_STORAGE_KEY, &raw)?;
        self.sender.send_replace(updated);
        debug!(ui_mode = %updated.ui_mode, tsf = updated.tsf, "Saved UI preferences");
        Ok(updated)
    }
}
