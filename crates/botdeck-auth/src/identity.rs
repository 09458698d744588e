//! Identity store
//!
//! Owns the dashboard's bearer token. Tokens are minted locally from a fixed
//! identity - there is no server issuance path at all, which is what lets the
//! dashboard stay demonstrable with no backend running. The public surface is
//! deliberately infallible: storage trouble degrades to an in-memory token,
//! never to an error the UI would have to render.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;

use crate::error::AuthResult;
use crate::store::{MemoryTokenStore, SledTokenStore, TokenStore};
use crate::token::{self, SessionToken};

/// Identity configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Subject claim for every minted token
    pub subject: String,
    /// Lifetime of a minted token
    pub token_lifetime: Duration,
    /// Local HMAC signing secret. Never verified client-side; present so the
    /// token is well-formed for any server that checks.
    pub signing_secret: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject: "botdeck-operator".to_string(),
            token_lifetime: Duration::hours(24),
            signing_secret: "botdeck-local-signing-secret".to_string(),
        }
    }
}

/// The identity store: one token, replaced rather than mutated
pub struct IdentityStore {
    config: IdentityConfig,
    store: Arc<dyn TokenStore>,
    current: RwLock<Option<SessionToken>>,
}

impl IdentityStore {
    /// Create a store over an injected storage backend.
    pub fn new(config: IdentityConfig, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            store,
            current: RwLock::new(None),
        }
    }

    /// Convenience constructor for tests and disk-less environments.
    pub fn in_memory() -> Self {
        Self::new(IdentityConfig::default(), Arc::new(MemoryTokenStore::new()))
    }

    /// Open a sled-backed store at the given directory.
    pub fn open_at(path: impl AsRef<std::path::Path>) -> AuthResult<Self> {
        let store = SledTokenStore::open(path)?;
        Ok(Self::new(IdentityConfig::default(), Arc::new(store)))
    }

    /// Return the current token, minting and persisting a fresh one if the
    /// cached or stored token is absent, malformed, or expired. Never fails.
    pub async fn get_or_create(&self) -> SessionToken {
        {
            let cached = self.current.read().await;
            if let Some(tok) = cached.as_ref() {
                if !tok.claims().is_expired() {
                    return tok.clone();
                }
            }
        }

        let mut cached = self.current.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(tok) = cached.as_ref() {
            if !tok.claims().is_expired() {
                return tok.clone();
            }
        }

        // Prefer the durable copy over minting.
        match self.store.load() {
            Ok(Some(raw)) => match token::parse(&raw) {
                Ok(tok) => {
                    *cached = Some(tok.clone());
                    return tok;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "stored token rejected, minting a fresh one");
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "token store unreadable, minting a fresh one");
            }
        }

        let tok = token::mint(
            &self.config.subject,
            self.config.token_lifetime,
            self.config.signing_secret.as_bytes(),
        );
        if let Err(err) = self.store.persist(tok.as_str()) {
            tracing::warn!(error = %err, "failed to persist fresh token, keeping in-memory copy");
        }
        tracing::debug!(
            sub = %tok.claims().sub,
            exp = tok.claims().exp,
            "minted fresh session token"
        );
        *cached = Some(tok.clone());
        tok
    }

    /// Drop the current token so the next `get_or_create` mints a fresh one.
    /// Idempotent; storage failures are logged, not surfaced.
    pub async fn invalidate(&self) {
        let mut cached = self.current.write().await;
        *cached = None;
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted token");
        }
    }

    /// Explicit sign-out: clears the token and any derived session state.
    pub async fn sign_out(&self) {
        tracing::info!("signing out local identity");
        self.invalidate().await;
    }

    /// Current token without minting, if one is cached or stored.
    pub async fn peek(&self) -> Option<SessionToken> {
        if let Some(tok) = self.current.read().await.clone() {
            return Some(tok);
        }
        let raw = self.store.load().ok().flatten()?;
        token::parse(&raw).ok()
    }
}
