//! Token Codec
//!
//! Converts [`Claims`] to and from the header and payload segments of a
//! token. Segments are JSON encoded with unpadded URL-safe base64. Signing
//! lives in [`super::jwt`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::auth::error::TokenError;

/// Claims carried in the payload segment of a token.
///
/// Field order matches the wire layout `{"sub":..,"exp":..,"iat":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier (the username)
    #[serde(rename = "sub")]
    pub subject: String,
    /// Expiration timestamp, unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
    /// Issued at timestamp, unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

/// Fixed token header. Only HS256 is ever produced.
#[derive(Debug, Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Encode claims into `(header_segment, payload_segment)`.
pub fn encode(claims: &Claims) -> Result<(String, String), TokenError> {
    let header_json =
        serde_json::to_vec(&HEADER).map_err(|e| TokenError::Encoding(format!("header: {e}")))?;
    let payload_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(format!("claims: {e}")))?;

    Ok((
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json),
    ))
}

/// Decode a payload segment back into claims.
pub fn decode(payload_segment: &str) -> Result<Claims, TokenError> {
    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_segment)
        .map_err(|e| TokenError::Decode(format!("base64: {e}")))?;

    serde_json::from_slice(&payload_json).map_err(|e| TokenError::Decode(format!("json: {e}")))
}
