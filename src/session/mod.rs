//! Cookie-backed HTTP session layer.
//!
//! This module keeps authentication alive across restarts:
//!
//! - [`CookieJar`] - session cookies keyed by name and host, persisted as JSON
//! - [`SessionClient`] - request helpers that attach and receive cookies via the jar
//! - [`KeyValueStore`] - the storage seam the jar (and UI preferences) persist through
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use commenter_core::session::{ClientConfig, CookieJar, FileStore, SessionClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileStore::in_default_dir()?);
//! let jar = Arc::new(CookieJar::load(store)?);
//! let client = SessionClient::new(ClientConfig::new("https://api.example.com/")?, jar)?;
//! let is_image = client.probe_image_url("https://cdn.example.com/avatar.png").await;
//! # Ok(())
//! # }
//! ```

mod client;
mod cookie;
mod error;
mod jar;
mod storage;

pub use client::{
    ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
    FormPart, SessionClient, parse_web_url,
};
pub use self::cookie::{Cookie, CookieParseError, DEFAULT_COOKIE_PATH};
pub use error::SessionError;
pub use jar::{COOKIES_STORAGE_KEY, CookieJar, JarError, LoadSource};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, default_data_dir};
