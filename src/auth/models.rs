//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use serde::{Deserialize, Serialize};

/// Authenticated user information extracted from a verified token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
}

/// Credentials payload shared by register and login
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub username: String,
}

impl TokenResponse {
    pub fn new(token: String, expires_in: u64, username: String) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            username,
        }
    }
}
