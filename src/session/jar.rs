//! Persistent cookie jar shared by every request of a session.
//!
//! The jar keeps at most one cookie per `(name, domain)` and rewrites the
//! whole `cookies` storage entry after each mutation. It is installed into
//! reqwest as the cookie provider, so the transport both reads from and
//! writes to it without caller involvement.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::cookie::{Cookie, CookieParseError, StoredCookie};
use super::storage::{KeyValueStore, StorageError};

/// Storage key holding the JSON array of cookie records.
pub const COOKIES_STORAGE_KEY: &str = "cookies";

/// Errors raised when adding a cookie to the jar.
#[derive(Debug, Error)]
pub enum JarError {
    /// Cookies must carry a non-empty name.
    #[error("cookie name must not be empty")]
    EmptyName,
    /// The updated jar could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How the jar's initial contents were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing was stored yet.
    Empty,
    /// The stored array was restored with this many cookies.
    Restored(usize),
    /// The stored value was not a valid cookie array and was ignored.
    Discarded,
}

/// Session cookie collection with durable storage across restarts.
#[derive(Debug)]
pub struct CookieJar {
    cookies: Mutex<Vec<Cookie>>,
    store: Arc<dyn KeyValueStore>,
    load_source: LoadSource,
}

impl CookieJar {
    /// Loads the jar from `store`.
    ///
    /// A missing entry yields an empty jar. A stored value that does not
    /// parse as a cookie array is logged and replaced by an empty jar
    /// (reported as [`LoadSource::Discarded`]) so a corrupt entry never
    /// prevents start-up.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage medium itself cannot be read.
    #[instrument(level = "debug", skip(store))]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let (cookies, load_source) = match store.get(COOKIES_STORAGE_KEY)? {
            None => (Vec::new(), LoadSource::Empty),
            Some(raw) => match serde_json::from_str::<Vec<StoredCookie>>(&raw) {
                Ok(stored) => {
                    let total = stored.len();
                    let cookies: Vec<Cookie> = stored
                        .into_iter()
                        .map(StoredCookie::into_cookie)
                        .filter(|cookie| !cookie.name.is_empty())
                        .collect();
                    if cookies.len() < total {
                        warn!(
                            dropped = total - cookies.len(),
                            "Dropped persisted cookies without a name"
                        );
                    }
                    let count = cookies.len();
                    info!(cookies = count, "Loaded persisted session cookies");
                    (cookies, LoadSource::Restored(count))
                }
                Err(error) => {
                    warn!(
                        error = %error,
                        "Persisted cookies are corrupt; starting with an empty jar"
                    );
                    (Vec::new(), LoadSource::Discarded)
                }
            },
        };

        Ok(Self {
            cookies: Mutex::new(cookies),
            store,
            load_source,
        })
    }

    /// Reports how the initial contents were obtained.
    #[must_use]
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Stores `cookie` under `request_host`, replacing any cookie with the
    /// same name for that host, then persists the jar.
    ///
    /// Only the request origin is trusted for domain association; the
    /// cookie's own domain is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`JarError::EmptyName`] without touching the jar when the
    /// cookie has no name, and [`JarError::Storage`] if the jar cannot be
    /// persisted. The in-memory update is kept in the latter case.
    pub fn add(&self, mut cookie: Cookie, request_host: &str) -> Result<(), JarError> {
        if cookie.name.is_empty() {
            return Err(JarError::EmptyName);
        }
        cookie.domain = request_host.to_string();

        let mut cookies = self.lock();
        cookies.retain(|existing| !(existing.name == cookie.name && existing.domain == cookie.domain));
        debug!(name = %cookie.name, domain = %cookie.domain, "Stored session cookie");
        cookies.push(cookie);
        Ok(self.persist(&cookies)?)
    }

    /// Returns every cookie whose domain equals `request_host` exactly.
    #[must_use]
    pub fn get(&self, request_host: &str) -> Vec<Cookie> {
        self.lock()
            .iter()
            .filter(|cookie| cookie.domain == request_host)
            .cloned()
            .collect()
    }

    /// Returns a snapshot of all cookies in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Cookie> {
        self.lock().clone()
    }

    /// Number of cookies currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every cookie and persists the empty jar.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the empty jar cannot be persisted.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut cookies = self.lock();
        let removed = cookies.len();
        cookies.clear();
        info!(removed, "Cleared session cookies");
        self.persist(&cookies)
    }

    // Called with the lock held so persisted state follows mutation order.
    fn persist(&self, cookies: &[Cookie]) -> Result<(), StorageError> {
        let stored = cookies
            .iter()
            .map(StoredCookie::from_cookie)
            .collect::<Vec<_>>();
        let json = serde_json::to_string(&stored)?;
        self.store.put(COOKIES_STORAGE_KEY, &json)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Cookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };

        for header in cookie_headers {
            let parsed = header
                .to_str()
                .map_err(|_| CookieParseError::NotText)
                .and_then(Cookie::parse_set_cookie);
            match parsed {
                Ok(cookie) => {
                    if let Err(error) = self.add(cookie, host) {
                        warn!(host, error = %error, "Failed to persist received cookie");
                    }
                }
                Err(error) => {
                    warn!(host, error = %error, "Ignoring unparseable Set-Cookie header");
                }
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        let pairs = self
            .get(host)
            .iter()
            .filter_map(|cookie| {
                let pair = cookie.header_pair();
                if HeaderValue::from_str(&pair).is_ok() {
                    Some(pair)
                } else {
                    warn!(host, name = %cookie.name, "Skipping cookie not valid in a Cookie header");
                    None
                }
            })
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            return None;
        }

        HeaderValue::from_str(&pairs.join("; ")).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;

    const API_HOST: &str = "api.example.com";

    fn empty_jar() -> (CookieJar, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let jar = CookieJar::load(store.clone()).unwrap();
        (jar, store)
    }

    #[test]
    fn test_load_without_stored_entry_is_empty() {
        let (jar, _store) = empty_jar();
        assert!(jar.is_empty());
        assert_eq!(jar.load_source(), LoadSource::Empty);
    }

    #[test]
    fn test_add_same_name_and_host_replaces_existing() {
        let (jar, _store) = empty_jar();
        jar.add(Cookie::new("session", "first", ""), API_HOST).unwrap();
        jar.add(Cookie::new("session", "second", ""), API_HOST).unwrap();

        let cookies = jar.get(API_HOST);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(), "second");
    }

    #[test]
    fn test_add_overrides_declared_domain_with_request_host() {
        let (jar, _store) = empty_jar();
        jar.add(Cookie::new("session", "v", "attacker.example"), API_HOST)
            .unwrap();
        assert_eq!(jar.get(API_HOST)[0].domain, API_HOST);
        assert!(jar.get("attacker.example").is_empty());
    }

    #[test]
    fn test_same_name_on_different_hosts_kept_separately() {
        let (jar, _store) = empty_jar();
        jar.add(Cookie::new("session", "a", ""), API_HOST).unwrap();
        jar.add(Cookie::new("session", "b", ""), "other.example.com")
            .unwrap();
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get(API_HOST)[0].value(), "a");
        assert_eq!(jar.get("other.example.com")[0].value(), "b");
    }

    #[test]
    fn test_get_uses_exact_host_equality() {
        let (jar, _store) = empty_jar();
        jar.add(Cookie::new("session", "v", ""), "example.com").unwrap();
        assert!(jar.get("api.example.com").is_empty(), "no suffix matching");
        assert!(jar.get("EXAMPLE.COM").is_empty());
        assert_eq!(jar.get("example.com").len(), 1);
    }

    #[test]
    fn test_every_mutation_persists_full_jar() {
        let (jar, store) = empty_jar();
        jar.add(Cookie::new("a", "1", ""), API_HOST).unwrap();
        jar.add(Cookie::new("b", "2", ""), API_HOST).unwrap();

        let raw = store.get(COOKIES_STORAGE_KEY).unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["name"], "a");
        assert_eq!(stored[1]["domain"], API_HOST);
    }

    #[test]
    fn test_reload_restores_cookies() {
        let (jar, store) = empty_jar();
        let mut cookie = Cookie::new("session", "abc123", "");
        cookie.path = "/api".to_string();
        jar.add(cookie, API_HOST).unwrap();

        let reloaded = CookieJar::load(store).unwrap();
        assert_eq!(reloaded.load_source(), LoadSource::Restored(1));
        let cookies = reloaded.get(API_HOST);
        assert_eq!(cookies[0].name, "session");
        assert_eq!(cookies[0].value(), "abc123");
        assert_eq!(cookies[0].path, "/api");
    }

    #[test]
    fn test_load_record_without_path_defaults_to_root() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                COOKIES_STORAGE_KEY,
                r#"[{"name":"session","value":"abc","domain":"api.example.com"}]"#,
            )
            .unwrap();
        let jar = CookieJar::load(store).unwrap();
        assert_eq!(jar.get(API_HOST)[0].path, "/");
    }

    #[test]
    fn test_load_corrupt_entry_falls_back_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put(COOKIES_STORAGE_KEY, "{not json").unwrap();
        let jar = CookieJar::load(store).unwrap();
        assert!(jar.is_empty());
        assert_eq!(jar.load_source(), LoadSource::Discarded);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let (jar, store) = empty_jar();
        let result = jar.add(Cookie::new("", "x", ""), API_HOST);

        assert!(matches!(result, Err(JarError::EmptyName)));
        assert!(jar.is_empty());
        assert!(store.get(COOKIES_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_drops_records_without_name() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                COOKIES_STORAGE_KEY,
                r#"[{"name":"","value":"x","domain":"api.example.com"},
                    {"name":"session","value":"abc","domain":"api.example.com"}]"#,
            )
            .unwrap();
        let jar = CookieJar::load(store).unwrap();

        assert_eq!(jar.load_source(), LoadSource::Restored(1));
        let url: Url = "https://api.example.com/".parse().unwrap();
        assert_eq!(jar.cookies(&url).unwrap().to_str().unwrap(), "session=abc");
    }

    #[test]
    fn test_cookie_header_skips_only_invalid_values() {
        let (jar, _store) = empty_jar();
        jar.add(Cookie::new("good", "ok", ""), API_HOST).unwrap();
        jar.add(Cookie::new("bad", "a\nb", ""), API_HOST).unwrap();

        let url: Url = "https://api.example.com/".parse().unwrap();
        assert_eq!(jar.cookies(&url).unwrap().to_str().unwrap(), "good=ok");
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let (jar, store) = empty_jar();
        jar.add(Cookie::new("session", "v", ""), API_HOST).unwrap();
        jar.clear().unwrap();

        assert!(jar.get(API_HOST).is_empty());
        assert_eq!(store.get(COOKIES_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
        assert!(CookieJar::load(store).unwrap().is_empty());
    }

    #[test]
    fn test_cookie_store_round_trip_through_headers() {
        let (jar, _store) = empty_jar();
        let url: Url = "https://api.example.com/login".parse().unwrap();
        let headers = [
            HeaderValue::from_static("session=abc123; Path=/; HttpOnly"),
            HeaderValue::from_static("theme=dark"),
            HeaderValue::from_static("=broken"),
        ];
        jar.set_cookies(&mut headers.iter(), &url);

        assert_eq!(jar.len(), 2, "malformed header skipped");
        let header = jar.cookies(&url).unwrap();
        assert_eq!(header.to_str().unwrap(), "session=abc123; theme=dark");

        let other: Url = "https://cdn.example.com/".parse().unwrap();
        assert!(jar.cookies(&other).is_none());
    }
}
