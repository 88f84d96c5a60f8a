//! Profile picture sources for `update-profile`.

use std::path::{Path, PathBuf};

use super::error::ApiError;

const INITIALS_AVATAR_ENDPOINT: &str = "https://eu.ui-avatars.com/api/";
const INITIALS_AVATAR_SIZE: u32 = 128;

/// Where the new profile picture comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureSource {
    /// Keep the current picture URL.
    Unchanged(String),
    /// Use an externally hosted image.
    Url(String),
    /// Generate an initials avatar on the given `RRGGBB` background.
    Initials {
        /// Background colour as 6 hex digits, without `#`.
        background: String,
    },
    /// Upload a local image file.
    File(PathBuf),
}

/// Builds the initials avatar URL for `display_name`.
///
/// A leading `#` on `colour` is accepted.
///
/// # Errors
///
/// Returns [`ApiError::InvalidColour`] unless `colour` is exactly six hex digits.
pub fn initials_avatar_url(display_name: &str, colour: &str) -> Result<String, ApiError> {
    let hex = colour.strip_prefix('#').unwrap_or(colour);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::InvalidColour {
            colour: colour.to_string(),
        });
    }

    Ok(format!(
        "{INITIALS_AVATAR_ENDPOINT}?name={}&size={INITIALS_AVATAR_SIZE}&rounded=true&background={}",
        urlencoding::encode(display_name.trim()),
        hex.to_ascii_uppercase()
    ))
}

/// Upload name and content type for a picture file, keyed on its extension.
pub(crate) fn upload_metadata(path: &Path) -> (String, &'static str) {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    };

    let file_name = if extension.is_empty() {
        "profile-pic".to_string()
    } else {
        format!("profile-pic.{extension}")
    };
    (file_name, content_type)
}
