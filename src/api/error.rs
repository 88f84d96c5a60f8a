//! Error types for API calls.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::{SessionError, StorageError};

/// Errors from an account action that no status-level outcome covers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Cookie or preference persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A success status arrived without the user record it must carry.
    #[error("{endpoint} succeeded (HTTP {status}) but returned no user payload")]
    MissingPayload {
        /// Endpoint that was called.
        endpoint: &'static str,
        /// Status code received.
        status: u16,
    },

    /// The response body of a success status was not a valid envelope.
    #[error("{endpoint} returned an unreadable response body: {source}")]
    Decode {
        /// Endpoint that was called.
        endpoint: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A profile picture file could not be read.
    #[error("cannot read picture file {path}: {source}")]
    PictureFile {
        /// File that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The initials avatar colour is not a 6-digit hex value.
    #[error("invalid avatar colour '{colour}': expected RRGGBB hex")]
    InvalidColour {
        /// The rejected colour.
        colour: String,
    },

    /// An action requiring a signed-in user ran without one.
    #[error("not signed in")]
    NotSignedIn,
}

impl ApiError {
    /// Returns `true` for failures worth a generic "try again" message.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Session(error) if error.is_transient())
    }
}
