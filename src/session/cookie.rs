//! Session cookie record and its persisted JSON shape.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Path assigned to cookies that arrive or are stored without one.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// A single session cookie held by the jar.
///
/// The value field is intentionally redacted in Debug output to prevent
/// accidental logging of session tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name (never empty).
    pub name: String,
    /// Host owning the cookie; the jar overwrites this with the request host.
    pub domain: String,
    /// URL path scope.
    pub path: String,
    /// Expiry as unix seconds, when the server sent one.
    pub expires: Option<i64>,
    /// Whether the cookie is restricted to HTTPS.
    pub secure: bool,
    /// Whether the cookie is hidden from scripts.
    pub http_only: bool,
    /// Cookie value (sensitive — never log).
    value: String,
}

/// Errors raised when a `Set-Cookie` header cannot be turned into a [`Cookie`].
#[derive(Debug, thiserror::Error)]
pub enum CookieParseError {
    /// Header bytes were not visible ASCII.
    #[error("Set-Cookie header is not valid text")]
    NotText,
    /// The header failed RFC 6265 parsing (missing `=`, empty name, ...).
    #[error("malformed Set-Cookie header: {0}")]
    Malformed(#[from] ::cookie::ParseError),
}

impl Cookie {
    /// Creates a session cookie with the default path and no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            path: DEFAULT_COOKIE_PATH.to_string(),
            expires: None,
            secure: false,
            http_only: false,
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Parses one `Set-Cookie` header value.
    ///
    /// The declared `Domain` attribute is ignored; the jar assigns the
    /// request host when the cookie is added.
    ///
    /// # Errors
    ///
    /// Returns [`CookieParseError::Malformed`] for headers without a
    /// `name=value` pair or with an empty name.
    pub fn parse_set_cookie(header: &str) -> Result<Self, CookieParseError> {
        let parsed = ::cookie::Cookie::parse(header)?;

        // Max-Age wins over Expires when both are present (RFC 6265 §5.3).
        let expires = match parsed.max_age() {
            Some(max_age) => Some(now_unix().saturating_add(max_age.whole_seconds())),
            None => parsed.expires_datetime().map(|at| at.unix_timestamp()),
        };

        let path = parsed
            .path()
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_COOKIE_PATH)
            .to_string();

        Ok(Self {
            name: parsed.name().to_string(),
            domain: String::new(),
            path,
            expires,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            value: parsed.value().to_string(),
        })
    }

    /// Renders the `name=value` pair used in a `Cookie` request header.
    #[must_use]
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// On-disk record. Every attribute but the name is optional so that records
/// written by older builds (no `path`) still load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredCookie {
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<i64>,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    http_only: bool,
}

impl StoredCookie {
    pub(crate) fn from_cookie(cookie: &Cookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: Some(cookie.path.clone()),
            expires: cookie.expires,
            secure: cookie.secure,
            http_only: cookie.http_only,
        }
    }

    pub(crate) fn into_cookie(self) -> Cookie {
        let path = self
            .path
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_PATH.to_string());
        Cookie {
            name: self.name,
            domain: self.domain,
            path,
            expires: self.expires,
            secure: self.secure,
            http_only: self.http_only,
            value: self.value,
        }
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_cookie_basic_pair() {
        let cookie = Cookie::parse_set_cookie("session=abc123").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path, "/");
        assert!(cookie.domain.is_empty(), "domain is assigned by the jar");
        assert!(cookie.expires.is_none());
    }

    #[test]
    fn test_parse_set_cookie_attributes() {
        let cookie = Cookie::parse_set_cookie(
            "token=xyz; Path=/api; Domain=evil.example; Secure; HttpOnly; Expires=Wed, 21 Oct 2037 07:28:00 GMT",
        )
        .unwrap();
        assert_eq!(cookie.path, "/api");
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.expires, Some(2_139_722_880));
        assert!(cookie.domain.is_empty(), "declared Domain must not be trusted");
    }

    #[test]
    fn test_parse_set_cookie_max_age_overrides_expires() {
        let before = now_unix();
        let cookie = Cookie::parse_set_cookie(
            "sid=v; Max-Age=60; Expires=Wed, 21 Oct 2037 07:28:00 GMT",
        )
        .unwrap();
        let expires = cookie.expires.unwrap();
        assert!(expires >= before + 60 && expires <= now_unix() + 60);
    }

    #[test]
    fn test_parse_set_cookie_empty_name_rejected() {
        assert!(Cookie::parse_set_cookie("=value").is_err());
        assert!(Cookie::parse_set_cookie("no-equals-sign").is_err());
    }

    #[test]
    fn test_cookie_debug_redacts_value() {
        let cookie = Cookie::new("session", "super_secret_token", "api.example.com");
        let debug_str = format!("{cookie:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(
            !debug_str.contains("super_secret_token"),
            "Debug output must NOT contain the actual value"
        );
    }

    #[test]
    fn test_stored_cookie_without_path_loads_with_root_path() {
        let stored: StoredCookie =
            serde_json::from_str(r#"{"name":"session","value":"abc","domain":"api.example.com"}"#)
                .unwrap();
        let cookie = stored.into_cookie();
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.value(), "abc");
    }

    #[test]
    fn test_stored_cookie_uses_camel_case_field_names() {
        let mut cookie = Cookie::new("session", "abc", "api.example.com");
        cookie.http_only = true;
        let json = serde_json::to_string(&StoredCookie::from_cookie(&cookie)).unwrap();
        assert!(json.contains("\"httpOnly\":true"), "got {json}");
        assert!(!json.contains("expires"), "absent expiry is omitted: {json}");
    }
}
