//! Wiring of storage, cookie jar, HTTP session and state holders.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::api::Account;
use crate::config::AppConfig;
use crate::session::{
    CookieJar, FileStore, KeyValueStore, LoadSource, MemoryStore, SessionClient, SessionError,
    StorageError,
};
use crate::state::{SessionState, UiSettings};

/// Errors raised while assembling the application context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Storage could not be opened or read.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Everything a command handler needs, built once at start-up.
#[derive(Debug, Clone)]
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    account: Account,
    ui: UiSettings,
}

impl AppContext {
    /// Builds the context: storage, then the cookie jar, then the client.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when storage is unavailable or the client
    /// configuration is invalid.
    pub fn build(config: &AppConfig) -> Result<Self, ContextError> {
        let store: Arc<dyn KeyValueStore> = if config.ephemeral {
            debug!("Using in-memory storage");
            Arc::new(MemoryStore::new())
        } else {
            let store = match &config.data_dir {
                Some(dir) => FileStore::new(dir),
                None => FileStore::in_default_dir()?,
            };
            debug!(dir = %store.dir().display(), "Using file storage");
            Arc::new(store)
        };
        Self::with_store(config, store)
    }

    /// Builds the context on top of an existing store.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn with_store(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ContextError> {
        let jar = Arc::new(CookieJar::load(Arc::clone(&store))?);
        match jar.load_source() {
            LoadSource::Empty => debug!("No persisted cookies"),
            LoadSource::Restored(count) => debug!(count, "Restored persisted cookies"),
            LoadSource::Discarded => info!("Discarded unreadable cookie store"),
        }

        let client = SessionClient::new(config.client_config()?, jar)?;
        let account = Account::new(client, SessionState::new());
        let ui = UiSettings::load(Arc::clone(&store))?;

        Ok(Self { store, account, ui })
    }

    /// Account actions and the shared HTTP session.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The cookie jar used by every request.
    #[must_use]
    pub fn jar(&self) -> &Arc<CookieJar> {
        self.account.client().jar()
    }

    /// The signed-in user holder.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        self.account.session()
    }

    /// Display preferences.
    #[must_use]
    pub fn ui(&self) -> &UiSettings {
        &self.ui
    }

    /// Backing storage.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}
