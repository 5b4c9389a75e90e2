//! Persisted session: access token, refresh token, and the cached user.

use std::sync::Arc;

use covu_core::models::User;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::storage::{
    ACCESS_TOKEN_KEY, CURRENT_USER_KEY, REFRESH_TOKEN_KEY, Storage, StorageError,
};

/// Session tokens and profile, read through to storage on every call so
/// several handles over the same storage always agree.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("storage", &"[dyn Storage]")
            .finish()
    }
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The current access token, if signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        self.read_secret(ACCESS_TOKEN_KEY)
    }

    /// The current refresh token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn refresh_token(&self) -> Result<Option<SecretString>, StorageError> {
        self.read_secret(REFRESH_TOKEN_KEY)
    }

    /// Store both tokens after login or registration.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_tokens(
        &self,
        access: &SecretString,
        refresh: &SecretString,
    ) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access.expose_secret())?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh.expose_secret())
    }

    /// Replace only the access token, as after a refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_access_token(&self, access: &SecretString) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access.expose_secret())
    }

    /// Replace only the refresh token, as after a rotating refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_refresh_token(&self, refresh: &SecretString) -> Result<(), StorageError> {
        self.storage.set(REFRESH_TOKEN_KEY, refresh.expose_secret())
    }

    /// Forget the session: both tokens and the cached user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        self.storage.remove(CURRENT_USER_KEY)
    }

    /// Whether an access token is present. Says nothing about validity.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.access_token()?.is_some())
    }

    /// The cached profile, if any.
    ///
    /// A cached value that no longer parses is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, StorageError> {
        let Some(raw) = self.storage.get(CURRENT_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cached user");
                Ok(None)
            }
        }
    }

    /// Cache the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_current_user(&self, user: &User) -> Result<(), StorageError> {
        self.storage.set(CURRENT_USER_KEY, &serde_json::to_string(user)?)
    }

    fn read_secret(&self, key: &str) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .get(key)?
            .filter(|value| !value.is_empty())
            .map(SecretString::from))
    }
}
