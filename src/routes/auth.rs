//! Auth routes for registration, login, logout, and user info

use axum::extract::{rejection::JsonRejection, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::post, Extension, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::auth::middleware::ACCESS_TOKEN_COOKIE;
use crate::auth::models::{AuthUser, Credentials, TokenResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::errors::ApiError;
use crate::server::AppState;
use crate::store::StoreError;

fn require_credentials(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, ApiError> {
    let Json(credentials) = payload?;
    if credentials.username.is_empty() {
        return Err(ApiError::BadRequest("username is required".into()));
    }
    if credentials.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".into()));
    }
    Ok(credentials)
}

/// `POST /api/v1/register`
pub async fn register(
    State(app_state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = require_credentials(payload)?;

    let password_hash = hash_password(&credentials.password).map_err(ApiError::Internal)?;
    let user = app_state
        .users
        .create(&credentials.username, &password_hash)
        .await?;

    tracing::info!("Registered user id={} username={}", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": user.id, "username": user.username })),
    ))
}

/// `POST /api/v1/login`
///
/// Unknown users and wrong passwords get the same 401 answer.
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = require_credentials(payload)?;

    let user = match app_state.users.get_by_username(&credentials.username).await {
        Ok(user) => user,
        Err(StoreError::UserNotFound) => {
            tracing::info!("Login failed: unknown user {}", credentials.username);
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&credentials.password, &user.password_hash).map_err(ApiError::Internal)? {
        tracing::info!("Login failed: wrong password for {}", user.username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = app_state.token_service.issue(&user.username).map_err(|e| {
        tracing::error!(kind = e.kind(), "Failed to issue token: {}", e);
        ApiError::from(e)
    })?;
    let expires_in = app_state.token_service.ttl().as_secs();

    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.clone());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(
        i64::try_from(expires_in).unwrap_or(i64::MAX),
    ));

    Ok((
        jar.add(cookie),
        Json(TokenResponse::new(token, expires_in, user.username)),
    ))
}

/// `POST /api/v1/logout`
///
/// Tokens are stateless; logging out only clears the cookie. The client
/// discards its bearer token.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}

/// `GET /api/v1/me` (protected)
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<serde_json::Value> {
    Json(json!({ "username": user.username }))
}

/// Public authentication routes
pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/register", post(register))
        .route("/api/v1/login", post(login))
        .route("/api/v1/logout", post(logout))
}
