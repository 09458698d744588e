//! Session token encoding and structural validation
//!
//! Tokens are three base64url segments (`header.payload.signature`) so they
//! present like any other bearer JWT on the wire. The signature is HMAC-SHA256
//! under a local signing secret; BotDeck never verifies it. The dashboard has
//! no trusted issuer it can reach, so a token counts as valid when it is
//! well-formed and unexpired, nothing more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Fixed header segment, identical for every minted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried in the token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the fixed local dashboard identity
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Unique token id, fresh on every mint
    pub jti: String,
}

impl TokenClaims {
    /// A token is expired once `now` reaches `exp`.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// A minted or reloaded bearer token together with its decoded claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    raw: String,
    claims: TokenClaims,
}

impl SessionToken {
    /// The full `header.payload.signature` string, as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decoded payload claims
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Remaining lifetime, `None` once expired
    pub fn ttl(&self) -> Option<std::time::Duration> {
        let exp = chrono::DateTime::from_timestamp(self.claims.exp, 0)?;
        let now = Utc::now();
        if exp > now {
            (exp - now).to_std().ok()
        } else {
            None
        }
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Mint a fresh token for the local identity.
///
/// Infallible: every input combination produces a well-formed three-segment
/// token. The `jti` claim guarantees two mints never produce the same string.
pub(crate) fn mint(subject: &str, lifetime: Duration, secret: &[u8]) -> SessionToken {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let header = encode_segment(&TokenHeader::default());
    let payload = encode_segment(&claims);
    let signing_input = format!("{header}.{payload}");
    let signature = sign(&signing_input, secret);

    SessionToken {
        raw: format!("{signing_input}.{signature}"),
        claims,
    }
}

/// Structurally parse a token string. Expiry is checked here as well so
/// callers reloading from storage reject stale tokens in one step.
pub(crate) fn parse(raw: &str) -> AuthResult<SessionToken> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| AuthError::InvalidPayload(e.to_string()))?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|e| AuthError::InvalidPayload(e.to_string()))?;

    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(SessionToken {
        raw: raw.to_string(),
        claims,
    })
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    // Serialization of these fixed structs cannot fail; fall back to an empty
    // object so mint stays infallible even if it somehow does.
    let bytes = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn sign(input: &str, secret: &[u8]) -> String {
    // Hmac accepts keys of any length, so construction cannot fail here.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(input.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}
