//! Durable token storage
//!
//! One entry in a client-side key-value store holds the current token string.
//! The trait keeps the store injectable so tests and disk-less environments
//! can substitute the in-memory implementation.

use std::path::Path;
use std::sync::RwLock;

use crate::error::{AuthError, AuthResult};

/// Key under which the current token string lives.
const TOKEN_KEY: &str = "identity/token";

/// Storage seam for the persisted token entry
pub trait TokenStore: Send + Sync {
    /// Load the stored token string, if any.
    fn load(&self) -> AuthResult<Option<String>>;

    /// Persist the token string, replacing any previous entry.
    fn persist(&self, token: &str) -> AuthResult<()>;

    /// Remove the stored entry. Idempotent.
    fn clear(&self) -> AuthResult<()>;
}

/// Token store backed by an embedded sled database
pub struct SledTokenStore {
    db: sled::Db,
}

impl SledTokenStore {
    /// Open (or create) the store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> AuthResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl TokenStore for SledTokenStore {
    fn load(&self) -> AuthResult<Option<String>> {
        let value = self.db.get(TOKEN_KEY)?;
        match value {
            Some(bytes) => {
                let token = String::from_utf8(bytes.to_vec())
                    .map_err(|e| AuthError::Storage(e.to_string()))?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    fn persist(&self, token: &str) -> AuthResult<()> {
        self.db.insert(TOKEN_KEY, token.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        self.db.remove(TOKEN_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory token store for tests and disk-less environments
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> AuthResult<Option<String>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn persist(&self, token: &str) -> AuthResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| AuthError::Storage("store lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
