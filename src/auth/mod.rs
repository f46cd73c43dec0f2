//! # Authentication Module
//!
//! Self-contained HS256 token issuance and verification, plus the axum
//! middleware that guards protected routes.

pub mod clock;
pub mod codec;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
