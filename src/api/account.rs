//! Account actions: sign-in, sign-up, session restore, sign-out, profile edits.
//!
//! Each action sends one request through the [`SessionClient`], classifies
//! the response, and writes the resulting user into [`SessionState`].

use std::path::Path;

use reqwest::{Method, Response};
use tracing::{debug, info, instrument, warn};

use super::error::ApiError;
use super::outcome::{
    ActionOutcome, ReauthOutcome, classify_login, classify_profile_update, classify_re_auth,
    classify_sign_up,
};
use super::picture::{PictureSource, initials_avatar_url, upload_metadata};
use super::types::{Envelope, LoginBody, ProfileUpdateBody, SignUpBody, User};
use crate::session::{FormPart, SessionClient, SessionError};
use crate::state::SessionState;

const LOGIN_PATH: &str = "login";
const SIGN_UP_PATH: &str = "sign-up";
const RE_AUTH_PATH: &str = "re-auth";
const LOGOUT_PATH: &str = "logout";
const UPDATE_PROFILE_PATH: &str = "update-profile";

const INFO_PART: &str = "info";
const FILE_PART: &str = "file";

/// Values the user wants on their profile after an edit.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// Desired display name.
    pub display_name: String,
    /// Desired e-mail.
    pub email: String,
    /// Desired status line.
    pub status: String,
    /// New password; empty keeps the current one.
    pub password: String,
}

impl ProfileChanges {
    /// Starts from the user's current values with no password change.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            status: user.status.clone(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for ProfileChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileChanges")
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("status", &self.status)
            .field("password_changed", &!self.password.is_empty())
            .finish()
    }
}

/// Account operations bound to one API session.
#[derive(Debug, Clone)]
pub struct Account {
    client: SessionClient,
    session: SessionState,
}

impl Account {
    /// Binds `client` and the session holder it updates.
    #[must_use]
    pub fn new(client: SessionClient, session: SessionState) -> Self {
        Self { client, session }
    }

    /// The underlying HTTP session.
    #[must_use]
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// The signed-in user holder.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Signs in with e-mail and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when no response was received or a success
    /// response is unusable. Rejections are reported as outcomes.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<ActionOutcome, ApiError> {
        let body = LoginBody { email, password };
        let response = self
            .client
            .request(LOGIN_PATH, Method::POST, Some(&body))
            .await?;
        let (status, envelope) = read_envelope(LOGIN_PATH, response).await?;
        let outcome = classify_login(status, envelope.as_ref())?;
        self.record(LOGIN_PATH, &outcome);
        Ok(outcome)
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login).
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<ActionOutcome, ApiError> {
        let body = SignUpBody {
            email,
            password,
            display_name,
        };
        let response = self
            .client
            .request(SIGN_UP_PATH, Method::POST, Some(&body))
            .await?;
        let (status, envelope) = read_envelope(SIGN_UP_PATH, response).await?;
        let outcome = classify_sign_up(status, envelope.as_ref())?;
        self.record(SIGN_UP_PATH, &outcome);
        Ok(outcome)
    }

    /// Restores the session from the persisted cookie.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when no response was received.
    #[instrument(skip(self))]
    pub async fn re_auth(&self) -> Result<ReauthOutcome, ApiError> {
        let response = self
            .client
            .request_without_body(RE_AUTH_PATH, Method::GET)
            .await?;
        let (status, envelope) = read_envelope(RE_AUTH_PATH, response).await?;
        let outcome = classify_re_auth(status, envelope.as_ref())?;

        match &outcome {
            ReauthOutcome::Restored(user) => {
                info!(uid = %user.uid, "Session restored");
                self.session.set(user.clone());
            }
            ReauthOutcome::Expired => {
                info!("Session token expired");
                self.session.clear();
            }
            ReauthOutcome::SignedOut => {
                debug!(status, "No active session");
                self.session.clear();
            }
        }
        Ok(outcome)
    }

    /// Signs out: notifies the server, then clears cookies and the user.
    ///
    /// Local state is cleared even when the request fails; the request
    /// failure is reported afterwards.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ApiError::Session`] if it failed, otherwise
    /// [`ApiError::Storage`] if the emptied jar could not be persisted.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self
            .client
            .request_without_body(LOGOUT_PATH, Method::POST)
            .await;
        let cleared = self.client.jar().clear();
        self.session.clear();

        let response = request?;
        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Server rejected logout; local session cleared");
        }
        cleared?;
        info!("Signed out");
        Ok(())
    }

    /// Submits a profile edit for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotSignedIn`] without a current user,
    /// [`ApiError::PictureFile`] when an upload cannot be read,
    /// [`ApiError::InvalidColour`] for a bad initials background, and
    /// transport errors as for [`login`](Self::login).
    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        changes: &ProfileChanges,
        picture: PictureSource,
    ) -> Result<ActionOutcome, ApiError> {
        let current = self.session.current().ok_or(ApiError::NotSignedIn)?;

        let parts = match picture {
            PictureSource::Unchanged(pic) | PictureSource::Url(pic) => {
                let info = full_profile(&current, changes, pic);
                vec![FormPart::json(INFO_PART, &info)?]
            }
            PictureSource::Initials { background } => {
                let pic = initials_avatar_url(&changes.display_name, &background)?;
                let info = full_profile(&current, changes, pic);
                vec![FormPart::json(INFO_PART, &info)?]
            }
            PictureSource::File(path) => {
                let bytes = read_picture(&path).await?;
                let (file_name, content_type) = upload_metadata(&path);
                let info = changed_fields(&current, changes);
                vec![
                    FormPart::json(INFO_PART, &info)?,
                    FormPart::binary(FILE_PART, bytes, file_name, content_type),
                ]
            }
        };

        let response = self
            .client
            .request_multipart(UPDATE_PROFILE_PATH, parts)
            .await?;
        let (status, envelope) = read_envelope(UPDATE_PROFILE_PATH, response).await?;
        let outcome = classify_profile_update(status, envelope.as_ref())?;
        self.record(UPDATE_PROFILE_PATH, &outcome);
        Ok(outcome)
    }

    /// Returns `true` when `url` serves an image.
    pub async fn check_picture_url(&self, url: &str) -> bool {
        self.client.probe_image_url(url).await
    }

    fn record(&self, endpoint: &str, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Success(user) => {
                info!(endpoint, uid = %user.uid, "Account action succeeded");
                self.session.set(user.clone());
            }
            ActionOutcome::Rejected(error) => {
                debug!(endpoint, field = error.field.as_str(), rejection = %error.rejection, "Input rejected");
            }
            ActionOutcome::PayloadTooLarge => warn!(endpoint, "Upload rejected as too large"),
            ActionOutcome::ServerError => warn!(endpoint, "Server error"),
            ActionOutcome::Unhandled { status, message } => {
                warn!(endpoint, status, message = ?message, "Unhandled response");
            }
        }
    }
}

/// Reads the envelope leniently: error statuses with unreadable bodies yield
/// `None`, while a success status must carry a valid envelope.
async fn read_envelope(
    endpoint: &'static str,
    response: Response,
) -> Result<(u16, Option<Envelope>), ApiError> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|error| SessionError::from_transport(url, error))?;

    if body.is_empty() {
        return Ok((status.as_u16(), None));
    }

    match serde_json::from_slice::<Envelope>(&body) {
        Ok(envelope) => Ok((status.as_u16(), Some(envelope))),
        Err(source) if status.is_success() => Err(ApiError::Decode { endpoint, source }),
        Err(error) => {
            debug!(endpoint, status = status.as_u16(), error = %error, "Ignoring unreadable error body");
            Ok((status.as_u16(), None))
        }
    }
}

async fn read_picture(path: &Path) -> Result<Vec<u8>, ApiError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ApiError::PictureFile {
            path: path.to_path_buf(),
            source,
        })
}

fn new_password(changes: &ProfileChanges) -> Option<String> {
    (!changes.password.is_empty()).then(|| changes.password.clone())
}

fn full_profile(current: &User, changes: &ProfileChanges, pic: String) -> ProfileUpdateBody {
    ProfileUpdateBody {
        uid: current.uid.clone(),
        display_name: Some(changes.display_name.clone()),
        email: Some(changes.email.clone()),
        password: new_password(changes),
        pic: Some(pic),
        status: Some(changes.status.clone()),
        has_pic_file: false,
    }
}

fn changed_fields(current: &User, changes: &ProfileChanges) -> ProfileUpdateBody {
    let differs = |old: &str, new: &str| (old != new).then(|| new.to_string());
    ProfileUpdateBody {
        uid: current.uid.clone(),
        display_name: differs(&current.display_name, &changes.display_name),
        email: differs(&current.email, &changes.email),
        password: new_password(changes),
        pic: None,
        status: differs(&current.status, &changes.status),
        has_pic_file: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            pic: "https://cdn.example.com/ada.png".to_string(),
            status: "hello".to_string(),
            disabled: false,
        }
    }

    #[test]
    fn test_full_profile_sends_every_field() {
        let current = user();
        let changes = ProfileChanges::from_user(&current);
        let body = full_profile(&current, &changes, current.pic.clone());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "uid": "u1",
                "displayName": "Ada",
                "email": "ada@example.com",
                "pic": "https://cdn.example.com/ada.png",
                "status": "hello",
                "hasPicFile": false
            })
        );
    }

    #[test]
    fn test_changed_fields_only_includes_differences() {
        let current = user();
        let mut changes = ProfileChanges::from_user(&current);
        changes.status = "busy".to_string();
        changes.password = "correct horse".to_string();

        let json = serde_json::to_value(changed_fields(&current, &changes)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "uid": "u1",
                "password": "correct horse",
                "status": "busy",
                "hasPicFile": true
            })
        );
    }

    #[test]
    fn test_profile_changes_debug_hides_password() {
        let mut changes = ProfileChanges::from_user(&user());
        changes.password = "hunter22".to_string();
        let debug = format!("{changes:?}");
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("password_changed: true"));
    }
}
