//! Authentication Middleware
//!
//! Axum middleware for bearer token validation and user authentication.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::TokenService, models::AuthUser};
use crate::errors::ApiError;

/// Name of the cookie set by the login handler
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authentication middleware that validates tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating bearer tokens.
    ///
    /// Every failure answers with the same `401 {"error":"unauthorized"}`;
    /// the precise reason only goes to the log.
    pub async fn validate_token(
        State(token_service): State<Arc<TokenService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let token = match extract_token(req.headers()) {
            Ok(token) => token,
            Err(reason) => {
                tracing::warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    reason,
                    "[AuthMiddleware] Rejected request"
                );
                return Err(ApiError::Unauthorized);
            }
        };

        let claims = match token_service.verify(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    kind = e.kind(),
                    "[AuthMiddleware] Token validation failed: {}",
                    e
                );
                return Err(e.into());
            }
        };

        tracing::debug!("[AuthMiddleware] Token validated for sub={}", claims.subject);

        // Insert the user into request extensions for downstream handlers
        req.extensions_mut().insert(AuthUser {
            username: claims.subject,
        });

        Ok(next.run(req).await)
    }
}

/// Pull the token from `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie when no Authorization header is sent.
fn extract_token(headers: &HeaderMap) -> Result<String, &'static str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| "authorization header is not ascii")?;
        let (scheme, token) = value
            .split_once(' ')
            .ok_or("invalid authorization header")?;
        if !scheme.eq_ignore_ascii_case("Bearer") {
            return Err("unsupported authorization scheme");
        }
        let token = token.trim();
        if token.is_empty() {
            return Err("empty bearer token");
        }
        return Ok(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(ACCESS_TOKEN_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
        .filter(|token| !token.is_empty())
        .ok_or("missing authorization header and access_token cookie")
}
