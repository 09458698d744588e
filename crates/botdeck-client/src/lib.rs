//! BotDeck Resilient Request Layer
//!
//! Every remote call the dashboard makes runs through this crate:
//!
//! - **Bearer injection**: tokens come from an injected
//!   [`botdeck_auth::IdentityStore`], never from a global
//! - **Hard deadlines**: a fixed ~8 s timeout per attempt; overruns are
//!   indistinguishable from connection failures
//! - **Single retry on 401**: invalidate, reacquire, retry once - a second
//!   401 comes back as-is
//! - **Fallback synthesis**: transport failures resolve to canned payloads
//!   with the real endpoints' shapes, marked `simulation_mode: true`
//!
//! The result is a client that silently degrades instead of failing: the
//! dashboard stays demonstrable with no backend at all, and callers only see
//! `Err` for their own malformed call construction.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use botdeck_auth::IdentityStore;
//! use botdeck_client::{ClientConfig, DashboardClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let identity = Arc::new(IdentityStore::in_memory());
//!     let client = DashboardClient::new(ClientConfig::from_env(), identity)?;
//!
//!     // Works identically whether or not the service is reachable.
//!     let env = client.environment().await?;
//!     println!("{} models available", env.project.models_available);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod fallback;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use endpoints::{
    ChatMessage, ChatReply, EnvironmentInfo, EnvironmentReply, FileReadReply, ModelDescriptor,
    ModelsReply, PersistAck,
};
pub use error::{ClientError, ClientResult};
pub use executor::{ApiReply, DashboardClient, ReplySource, RequestOptions};

pub use reqwest::Method;
