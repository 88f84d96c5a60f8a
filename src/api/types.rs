//! Request and response bodies exchanged with the commenter API.

use serde::{Deserialize, Serialize};

/// Account record returned in response payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier.
    pub uid: String,
    /// Name shown next to comments.
    pub display_name: String,
    /// Login e-mail address.
    pub email: String,
    /// Profile picture URL.
    #[serde(default)]
    pub pic: String,
    /// Free-form status line.
    #[serde(default)]
    pub status: String,
    /// Whether the account has been disabled by an administrator.
    #[serde(default)]
    pub disabled: bool,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    /// Human-readable result; the client branches on known values.
    #[serde(default)]
    pub message: String,
    /// Status code echoed by the server.
    #[serde(default)]
    pub code: u16,
    /// User record for endpoints that return one.
    #[serde(default)]
    pub payload: Option<User>,
}

/// Body of `POST login`.
#[derive(Clone, Serialize)]
pub struct LoginBody<'a> {
    /// Account e-mail.
    pub email: &'a str,
    /// Plain-text password (sent over HTTPS).
    pub password: &'a str,
}

/// Body of `POST sign-up`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody<'a> {
    /// Account e-mail.
    pub email: &'a str,
    /// Plain-text password (sent over HTTPS).
    pub password: &'a str,
    /// Initial display name.
    pub display_name: &'a str,
}

/// JSON `info` part of `POST update-profile`.
///
/// `None` fields are omitted so the server leaves them unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateBody {
    /// Account being updated.
    pub uid: String,
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New e-mail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New picture URL (when not uploading a file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    /// New status line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Whether a `file` part accompanies this update.
    pub has_pic_file: bool,
}
