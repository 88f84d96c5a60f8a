//! Holder for the signed-in user.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::User;

/// Application-wide current user, observable through a watch channel.
///
/// Writes are last-write-wins. The state lives only in memory; a restart
/// recovers it through `re-auth` with the persisted cookie.
#[derive(Debug, Clone)]
pub struct SessionState {
    sender: Arc<watch::Sender<Option<User>>>,
}

impl SessionState {
    /// Creates a signed-out state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a copy of the current user.
    #[must_use]
    pub fn current(&self) -> Option<User> {
        self.sender.borrow().clone()
    }

    /// Returns `true` when a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Replaces the current user.
    pub fn set(&self, user: User) {
        self.sender.send_replace(Some(user));
    }

    /// Signs the user out locally.
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    /// Subscribes to user changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.sender.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
