//! HTTP client bound to the API base URL and the persisted cookie jar.
//!
//! Every request goes through one `reqwest::Client` whose cookie provider is
//! the session [`CookieJar`]: cookies for the target host are attached before
//! sending and each `Set-Cookie` in the response is written back to the jar.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use super::error::SessionError;
use super::jar::CookieJar;
use crate::user_agent;

/// API base URL used when no configuration overrides it.
pub const DEFAULT_API_BASE_URL: &str = "https://game-repeatedly-glowworm.ngrok-free.app/";

/// Default HTTP connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (30 seconds).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

const APPLICATION_JSON: &str = "application/json";

/// Construction parameters for [`SessionClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base; request paths are appended to it verbatim.
    pub base_url: Url,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub read_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a config for `base_url` with default timeouts.
    ///
    /// A trailing `/` is appended to the base path when missing so that
    /// `base + path` concatenation never merges segments.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] unless `base_url` is an absolute
    /// http(s) URL with a host.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url =
            parse_web_url(&normalized).ok_or_else(|| SessionError::invalid_url(base_url))?;

        Ok(Self {
            base_url,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: user_agent::default_user_agent(),
        })
    }

    /// Overrides both timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_timeout: Duration, read_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.read_timeout = read_timeout;
        self
    }
}

/// One part of a multipart/form-data submission.
#[derive(Clone)]
pub enum FormPart {
    /// JSON-encoded metadata sent with `Content-Type: application/json`.
    Json {
        /// Form field name.
        name: String,
        /// Already-encoded JSON document.
        json: String,
    },
    /// Raw file bytes.
    Binary {
        /// Form field name.
        name: String,
        /// File contents.
        bytes: Vec<u8>,
        /// File name reported in `Content-Disposition`.
        file_name: String,
        /// MIME type of the contents.
        content_type: String,
    },
}

impl FormPart {
    /// Serializes `value` into a JSON part.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Encode`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<Self, SessionError> {
        let json = serde_json::to_string(value).map_err(|source| SessionError::Encode {
            target: name.to_string(),
            source,
        })?;
        Ok(Self::Json {
            name: name.to_string(),
            json,
        })
    }

    /// Creates a binary file part.
    #[must_use]
    pub fn binary(
        name: &str,
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::Binary {
            name: name.to_string(),
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Json { name, .. } | Self::Binary { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for FormPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json { name, json } => f
                .debug_struct("Json")
                .field("name", name)
                .field("bytes", &json.len())
                .finish(),
            Self::Binary {
                name,
                bytes,
                file_name,
                content_type,
            } => f
                .debug_struct("Binary")
                .field("name", name)
                .field("bytes", &bytes.len())
                .field("file_name", file_name)
                .field("content_type", content_type)
                .finish(),
        }
    }
}

/// Cookie-aware HTTP client for the commenter API.
///
/// Create once per application run and share; clones are cheap and reuse
/// the same connection pool and jar.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use commenter_core::session::{ClientConfig, CookieJar, MemoryStore, SessionClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let jar = Arc::new(CookieJar::load(Arc::new(MemoryStore::new()))?);
/// let client = SessionClient::new(ClientConfig::new("https://api.example.com/")?, jar)?;
/// let response = client.request_without_body("re-auth", reqwest::Method::GET).await?;
/// println!("status: {}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
    base_url: Url,
    jar: Arc<CookieJar>,
}

impl SessionClient {
    /// Builds the client and installs `jar` as its cookie provider.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ClientBuild`] if reqwest rejects the configuration.
    #[instrument(level = "debug", skip(jar), fields(base_url = %config.base_url))]
    pub fn new(config: ClientConfig, jar: Arc<CookieJar>) -> Result<Self, SessionError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent)
            .gzip(true)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(SessionError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: config.base_url,
            jar,
        })
    }

    /// The jar shared with the transport.
    #[must_use]
    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.jar
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host of the API base URL, the domain session cookies are stored under.
    #[must_use]
    pub fn api_host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// Sends a GET or POST to `base + path`, JSON-encoding `body` when given.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnsupportedMethod`] for methods other than GET
    /// and POST, [`SessionError::Encode`] when the body cannot be serialized,
    /// and [`SessionError::Timeout`]/[`SessionError::Network`] on transport
    /// failure. Non-2xx statuses are returned as responses, not errors.
    #[instrument(skip(self, body), fields(path = %path, method = %method))]
    pub async fn request<B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Response, SessionError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut builder = match method {
            Method::GET => self.client.get(url.clone()),
            Method::POST => self.client.post(url.clone()),
            other => return Err(SessionError::UnsupportedMethod { method: other }),
        };

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(|source| SessionError::Encode {
                target: path.to_string(),
                source,
            })?;
            builder = builder.header(CONTENT_TYPE, APPLICATION_JSON).body(encoded);
        }

        self.send(builder, &url).await
    }

    /// Sends a GET or POST without a body.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request).
    pub async fn request_without_body(
        &self,
        path: &str,
        method: Method,
    ) -> Result<Response, SessionError> {
        self.request::<()>(path, method, None).await
    }

    /// Submits `parts` as a multipart/form-data POST to `base + path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPart`] when a part's content type is not
    /// a valid MIME type, and transport errors as for [`request`](Self::request).
    #[instrument(skip(self, parts), fields(path = %path, parts = parts.len()))]
    pub async fn request_multipart(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<Response, SessionError> {
        let url = self.endpoint(path)?;

        let mut form = Form::new();
        for part in parts {
            let name = part.name().to_string();
            let (content_type, body) = match part {
                FormPart::Json { json, .. } => (APPLICATION_JSON.to_string(), Part::text(json)),
                FormPart::Binary {
                    bytes,
                    file_name,
                    content_type,
                    ..
                } => (content_type, Part::bytes(bytes).file_name(file_name)),
            };
            let body = body
                .mime_str(&content_type)
                .map_err(|_| SessionError::InvalidPart {
                    part: name.clone(),
                    content_type,
                })?;
            form = form.part(name, body);
        }

        self.send(self.client.post(url.clone()).multipart(form), &url)
            .await
    }

    /// Returns `true` iff `url` is a well-formed web URL whose HEAD response
    /// declares an `image/*` content type.
    ///
    /// Never fails: malformed URLs, transport errors, and missing headers all
    /// yield `false`.
    #[instrument(skip(self))]
    pub async fn probe_image_url(&self, url: &str) -> bool {
        let Some(target) = parse_web_url(url) else {
            debug!("Rejected malformed image URL");
            return false;
        };

        match self.client.head(target).send().await {
            Ok(response) => response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|content_type| {
                    content_type.to_ascii_lowercase().starts_with("image/")
                }),
            Err(error) => {
                debug!(error = %error, "Image probe request failed");
                false
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SessionError> {
        let raw = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|_| SessionError::invalid_url(raw))
    }

    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, SessionError> {
        let response = builder
            .send()
            .await
            .map_err(|error| SessionError::from_transport(url.as_str(), error))?;
        debug!(url = %url, status = response.status().as_u16(), "Received response");
        Ok(response)
    }
}

/// Parses `raw` as an absolute http(s) URL with a non-empty host.
#[must_use]
pub fn parse_web_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}
