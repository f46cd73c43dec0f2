//! JWT Token Service
//!
//! Issues and verifies HS256 tokens of the form
//! `base64url(header).base64url(payload).base64url(hmac_sha256(header.payload))`.
//! The service is stateless: validity is derived from the token itself plus
//! the current time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::hmac;

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::codec::{self, Claims};
use crate::auth::error::TokenError;

/// Token service bound to one secret and one validity duration.
///
/// Immutable after construction, so a single instance can be shared across
/// handlers and threads behind an `Arc` without locking.
#[derive(Clone)]
pub struct TokenService {
    key: hmac::Key,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service that reads the system clock.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    /// Create a service with an explicit time source.
    ///
    /// Timestamps are whole seconds, so a ttl under one second would produce
    /// `exp == iat` and is rejected along with an empty secret.
    pub fn with_clock(
        secret: &[u8],
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Config("secret is required".into()));
        }
        if ttl.as_secs() == 0 {
            return Err(TokenError::Config("ttl must be at least one second".into()));
        }
        if i64::try_from(ttl.as_secs()).is_err() {
            return Err(TokenError::Config("ttl is out of range".into()));
        }

        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            ttl,
            clock,
        })
    }

    /// Validity duration applied at issuance.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for `subject`.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = self.clock.now();
        // Range checked in the constructor.
        let ttl_secs = self.ttl.as_secs() as i64;
        let expires_at = now
            .checked_add(ttl_secs)
            .ok_or_else(|| TokenError::Encoding("expiry overflows i64".into()))?;

        let claims = Claims {
            subject: subject.to_string(),
            expires_at,
            issued_at: now,
        };

        let (header, payload) = codec::encode(&claims)?;
        let unsigned = format!("{header}.{payload}");
        let signature = self.sign(&unsigned);

        Ok(format!("{unsigned}.{signature}"))
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in a fixed order: shape, signature, payload decoding,
    /// expiry. Nothing about the payload is inspected before the signature
    /// has been accepted. A token is still valid at exactly `exp` and expires
    /// one second later.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None)
                    if !h.is_empty() && !p.is_empty() && !s.is_empty() =>
                {
                    (h, p, s)
                }
                _ => return Err(TokenError::Malformed),
            };

        // Only the first two segments are signed, so slice them out of the
        // original text rather than re-joining.
        let unsigned = &token[..header.len() + 1 + payload.len()];
        let tag = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Signature)?;
        hmac::verify(&self.key, unsigned.as_bytes(), &tag).map_err(|_| TokenError::Signature)?;

        let claims = codec::decode(payload)?;

        if self.clock.now() > claims.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// HMAC-SHA256 over `unsigned`, base64url encoded without padding.
    fn sign(&self, unsigned: &str) -> String {
        let tag = hmac::sign(&self.key, unsigned.as_bytes());
        URL_SAFE_NO_PAD.encode(tag.as_ref())
    }
}
