//! Commenter Core Library
//!
//! Session layer for the commenter chat client: a persisted cookie jar, an
//! HTTP client that reads and writes it on every request, and the account
//! API built on top of them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`session`] - Cookie jar, key-value storage, and the HTTP session client
//! - [`api`] - Request/response types, outcome classification, account actions
//! - [`state`] - Signed-in user and UI preference holders
//! - [`config`] - Config file loading
//! - [`context`] - Start-up wiring of the above

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod context;
pub mod session;
pub mod state;
mod user_agent;

// Re-export commonly used types
pub use api::{Account, ActionOutcome, ApiError, PictureSource, ProfileChanges, ReauthOutcome, User};
pub use config::{AppConfig, ConfigError, VerbositySetting};
pub use context::{AppContext, ContextError};
pub use session::{
    ClientConfig, Cookie, CookieJar, FileStore, JarError, KeyValueStore, LoadSource, MemoryStore,
    SessionClient, SessionError, StorageError,
};
pub use state::{SessionState, UiMode, UiPreferences, UiSettings};
