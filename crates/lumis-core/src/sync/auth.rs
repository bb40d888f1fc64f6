//! Token storage for the sync client.
//!
//! Tokens live in the OS keyring, looked up by a fixed service name.
//! Tests use the in-memory backend so they never touch the keyring.

use std::sync::Mutex;

use crate::error::ApiError;

use super::TokenPair;

const SERVICE: &str = "lumis";
const ACCESS_ENTRY: &str = "access_token";
const REFRESH_ENTRY: &str = "refresh_token";

enum Backend {
    Keyring,
    Memory(Mutex<Option<TokenPair>>),
}

/// Access/refresh token storage.
pub struct TokenStore {
    backend: Backend,
}

impl TokenStore {
    /// Keyring-backed store used by the real client.
    pub fn new() -> Self {
        Self {
            backend: Backend::Keyring,
        }
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    fn entry(name: &str) -> Result<keyring::Entry, ApiError> {
        keyring::Entry::new(SERVICE, name).map_err(|e| ApiError::TokenStore(e.to_string()))
    }

    pub fn access_token(&self) -> Result<String, ApiError> {
        match &self.backend {
            Backend::Keyring => Self::entry(ACCESS_ENTRY)?
                .get_password()
                .map_err(|_| ApiError::Unauthorized),
            Backend::Memory(slot) => slot
                .lock()
                .map_err(|e| ApiError::TokenStore(e.to_string()))?
                .as_ref()
                .map(|t| t.access_token.clone())
                .ok_or(ApiError::Unauthorized),
        }
    }

    pub fn refresh_token(&self) -> Result<String, ApiError> {
        match &self.backend {
            Backend::Keyring => Self::entry(REFRESH_ENTRY)?
                .get_password()
                .map_err(|_| ApiError::Unauthorized),
            Backend::Memory(slot) => slot
                .lock()
                .map_err(|e| ApiError::TokenStore(e.to_string()))?
                .as_ref()
                .map(|t| t.refresh_token.clone())
                .ok_or(ApiError::Unauthorized),
        }
    }

    /// Store a fresh pair, replacing any previous one.
    pub fn set_tokens(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        match &self.backend {
            Backend::Keyring => {
                Self::entry(ACCESS_ENTRY)?
                    .set_password(&tokens.access_token)
                    .map_err(|e| ApiError::TokenStore(e.to_string()))?;
                Self::entry(REFRESH_ENTRY)?
                    .set_password(&tokens.refresh_token)
                    .map_err(|e| ApiError::TokenStore(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(slot) => {
                *slot
                    .lock()
                    .map_err(|e| ApiError::TokenStore(e.to_string()))? = Some(tokens.clone());
                Ok(())
            }
        }
    }

    /// Remove stored credentials.
    pub fn clear(&self) -> Result<(), ApiError> {
        match &self.backend {
            Backend::Keyring => {
                for name in [ACCESS_ENTRY, REFRESH_ENTRY] {
                    if let Ok(entry) = Self::entry(name) {
                        let _ = entry.delete_credential();
                    }
                }
                Ok(())
            }
            Backend::Memory(slot) => {
                *slot
                    .lock()
                    .map_err(|e| ApiError::TokenStore(e.to_string()))? = None;
                Ok(())
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_ok()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}
