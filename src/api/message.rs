//! Known `message` strings of the API envelope.

/// Result messages the client reacts to.
///
/// Anything else decodes to [`ApiMessage::Unhandled`] so callers can surface
/// it instead of ignoring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiMessage {
    /// `This account is disabled`.
    AccountDisabled,
    /// `Incorrect password`.
    IncorrectPassword,
    /// `Password is too short`.
    PasswordTooShort,
    /// The display name exceeds the server limit.
    DisplayNameTooLong,
    /// The display name is blank.
    DisplayNameEmpty,
    /// Sign-up wording for a malformed e-mail.
    EmailInvalid,
    /// Profile-update wording for a malformed e-mail.
    EmailIncorrectlyFormatted,
    /// The status exceeds the server limit.
    StatusTooLong,
    /// `JWT is expired`.
    JwtExpired,
    /// Any message without a dedicated variant, kept verbatim.
    Unhandled(String),
}

impl ApiMessage {
    /// Maps an envelope message onto a variant.
    #[must_use]
    pub fn parse(message: &str) -> Self {
        match message {
            "This account is disabled" => Self::AccountDisabled,
            "Incorrect password" => Self::IncorrectPassword,
            "Password is too short" => Self::PasswordTooShort,
            "Display name is too long" => Self::DisplayNameTooLong,
            "Display name cannot be empty" => Self::DisplayNameEmpty,
            "Email is invalid" => Self::EmailInvalid,
            "Email is incorrectly formatted" => Self::EmailIncorrectlyFormatted,
            "Status is too long" => Self::StatusTooLong,
            "JWT is expired" => Self::JwtExpired,
            other => Self::Unhandled(other.to_string()),
        }
    }
}
