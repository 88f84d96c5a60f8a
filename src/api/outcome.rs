//! Classification of API responses into typed outcomes.
//!
//! Each endpoint's status codes and envelope messages map onto a fixed set of
//! outcomes. Field-level rejections also name which inputs the form should
//! clear, so handlers never branch on raw strings.

use std::fmt;

use super::error::ApiError;
use super::message::ApiMessage;
use super::types::{Envelope, User};

/// Form inputs a rejection can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Account e-mail.
    Email,
    /// Account password.
    Password,
    /// Public display name.
    DisplayName,
    /// Free-text profile status.
    Status,
}

impl Field {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::DisplayName => "display name",
            Self::Status => "status",
        }
    }
}

/// Why the server rejected an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No account is registered for the e-mail.
    UserNotFound,
    /// The account exists but is disabled.
    AccountDisabled,
    /// The password does not match.
    IncorrectPassword,
    /// The password is below the minimum length.
    PasswordTooShort,
    /// The display name exceeds the maximum length.
    DisplayNameTooLong,
    /// The display name is blank.
    DisplayNameEmpty,
    /// The e-mail is not well formed.
    EmailMalformed,
    /// Another account already uses the e-mail.
    EmailInUse,
    /// The status exceeds the maximum length.
    StatusTooLong,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UserNotFound => "No account exists for this e-mail",
            Self::AccountDisabled => "This account has been disabled",
            Self::IncorrectPassword => "Incorrect password",
            Self::PasswordTooShort => "Password must be at least 8 characters",
            Self::DisplayNameTooLong => "Display name is too long",
            Self::DisplayNameEmpty => "Display name cannot be empty",
            Self::EmailMalformed => "E-mail is formatted incorrectly",
            Self::EmailInUse => "E-mail is already in use",
            Self::StatusTooLong => "Status is too long",
        };
        f.write_str(text)
    }
}

/// A rejection attached to one field, plus the inputs to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Field showing the error.
    pub field: Field,
    /// What was wrong.
    pub rejection: Rejection,
    /// Inputs whose contents should be discarded.
    pub clears: &'static [Field],
}

impl FieldError {
    const fn new(field: Field, rejection: Rejection, clears: &'static [Field]) -> Self {
        Self {
            field,
            rejection,
            clears,
        }
    }
}

/// Result of login, sign-up, or profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action succeeded and returned the current user.
    Success(User),
    /// An input was rejected.
    Rejected(FieldError),
    /// The uploaded picture exceeded the server limit (HTTP 413).
    PayloadTooLarge,
    /// Transient server failure (HTTP 500); inputs should be kept.
    ServerError,
    /// A status/message combination the client has no mapping for.
    Unhandled {
        /// Status code received.
        status: u16,
        /// Envelope message, when one could be read.
        message: Option<String>,
    },
}

/// Result of the start-up re-authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReauthOutcome {
    /// The stored cookie is valid.
    Restored(User),
    /// The stored session token has expired.
    Expired,
    /// No usable session; show the sign-in screen.
    SignedOut,
}

const CLEAR_NONE: &[Field] = &[];
const CLEAR_EMAIL: &[Field] = &[Field::Email];
const CLEAR_PASSWORD: &[Field] = &[Field::Password];
const CLEAR_DISPLAY_NAME: &[Field] = &[Field::DisplayName];
const CLEAR_CREDENTIALS: &[Field] = &[Field::Email, Field::Password];

/// Classifies a `login` response.
///
/// # Errors
///
/// Returns [`ApiError::MissingPayload`] when HTTP 200 carries no user.
pub fn classify_login(status: u16, envelope: Option<&Envelope>) -> Result<ActionOutcome, ApiError> {
    let outcome = match (status, message_of(envelope)) {
        (200, _) => return success("login", status, envelope),
        (404, _) => rejected(Field::Email, Rejection::UserNotFound, CLEAR_CREDENTIALS),
        (406, Some(ApiMessage::AccountDisabled)) => {
            rejected(Field::Email, Rejection::AccountDisabled, CLEAR_CREDENTIALS)
        }
        (406, Some(ApiMessage::IncorrectPassword)) => {
            rejected(Field::Password, Rejection::IncorrectPassword, CLEAR_PASSWORD)
        }
        (500, _) => ActionOutcome::ServerError,
        _ => unhandled(status, envelope),
    };
    Ok(outcome)
}

/// Classifies a `sign-up` response.
///
/// # Errors
///
/// Returns [`ApiError::MissingPayload`] when HTTP 201 carries no user.
pub fn classify_sign_up(
    status: u16,
    envelope: Option<&Envelope>,
) -> Result<ActionOutcome, ApiError> {
    let outcome = match (status, message_of(envelope)) {
        (201, _) => return success("sign-up", status, envelope),
        (406, Some(ApiMessage::PasswordTooShort)) => {
            rejected(Field::Password, Rejection::PasswordTooShort, CLEAR_NONE)
        }
        (406, Some(ApiMessage::DisplayNameTooLong)) => rejected(
            Field::DisplayName,
            Rejection::DisplayNameTooLong,
            CLEAR_DISPLAY_NAME,
        ),
        (406, Some(ApiMessage::DisplayNameEmpty)) => {
            rejected(Field::DisplayName, Rejection::DisplayNameEmpty, CLEAR_NONE)
        }
        (406, Some(ApiMessage::EmailInvalid)) => {
            rejected(Field::Email, Rejection::EmailMalformed, CLEAR_EMAIL)
        }
        (409, _) => rejected(Field::Email, Rejection::EmailInUse, CLEAR_EMAIL),
        (500, _) => ActionOutcome::ServerError,
        _ => unhandled(status, envelope),
    };
    Ok(outcome)
}

/// Classifies an `update-profile` response.
///
/// # Errors
///
/// Returns [`ApiError::MissingPayload`] when HTTP 200 carries no user.
pub fn classify_profile_update(
    status: u16,
    envelope: Option<&Envelope>,
) -> Result<ActionOutcome, ApiError> {
    let outcome = match (status, message_of(envelope)) {
        (200, _) => return success("update-profile", status, envelope),
        (406, Some(ApiMessage::DisplayNameEmpty)) => {
            rejected(Field::DisplayName, Rejection::DisplayNameEmpty, CLEAR_NONE)
        }
        (406, Some(ApiMessage::DisplayNameTooLong)) => {
            rejected(Field::DisplayName, Rejection::DisplayNameTooLong, CLEAR_NONE)
        }
        (406, Some(ApiMessage::PasswordTooShort)) => {
            rejected(Field::Password, Rejection::PasswordTooShort, CLEAR_NONE)
        }
        (406, Some(ApiMessage::StatusTooLong)) => {
            rejected(Field::Status, Rejection::StatusTooLong, CLEAR_NONE)
        }
        (406, Some(ApiMessage::EmailIncorrectlyFormatted)) => {
            rejected(Field::Email, Rejection::EmailMalformed, CLEAR_NONE)
        }
        (413, _) => ActionOutcome::PayloadTooLarge,
        (500, _) => ActionOutcome::ServerError,
        _ => unhandled(status, envelope),
    };
    Ok(outcome)
}

/// Classifies a `re-auth` response.
///
/// # Errors
///
/// Returns [`ApiError::MissingPayload`] when HTTP 200 carries no user.
pub fn classify_re_auth(status: u16, envelope: Option<&Envelope>) -> Result<ReauthOutcome, ApiError> {
    match (status, message_of(envelope)) {
        (200, _) => envelope
            .and_then(|envelope| envelope.payload.clone())
            .map(ReauthOutcome::Restored)
            .ok_or(ApiError::MissingPayload {
                endpoint: "re-auth",
                status,
            }),
        (406, Some(ApiMessage::JwtExpired)) => Ok(ReauthOutcome::Expired),
        _ => Ok(ReauthOutcome::SignedOut),
    }
}

fn message_of(envelope: Option<&Envelope>) -> Option<ApiMessage> {
    envelope.map(|envelope| ApiMessage::parse(&envelope.message))
}

fn success(
    endpoint: &'static str,
    status: u16,
    envelope: Option<&Envelope>,
) -> Result<ActionOutcome, ApiError> {
    envelope
        .and_then(|envelope| envelope.payload.clone())
        .map(ActionOutcome::Success)
        .ok_or(ApiError::MissingPayload { endpoint, status })
}

fn rejected(field: Field, rejection: Rejection, clears: &'static [Field]) -> ActionOutcome {
    ActionOutcome::Rejected(FieldError::new(field, rejection, clears))
}

fn unhandled(status: u16, envelope: Option<&Envelope>) -> ActionOutcome {
    ActionOutcome::Unhandled {
        status,
        message: envelope.map(|envelope| envelope.message.clone()),
    }
}
