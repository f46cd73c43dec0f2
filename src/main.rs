//! # CRUD Server
//!
//! HTTP API for managing users and devices, protected by HS256-signed bearer
//! tokens. Built with Axum and Tokio.
//!
//! ## Features
//! - Stateless token issuance and verification (HMAC-SHA256)
//! - Registration and login with Argon2 password hashing
//! - User and device CRUD behind the auth middleware
//! - PostgreSQL storage with embedded migrations, or in-memory storage
//! - Structured logging with tracing
//!
//! ## Architecture
//! - `server`: state, router assembly, and lifecycle
//! - `config`: environment variable configuration
//! - `auth`: token codec/service, middleware, password hashing
//! - `store`: user and device persistence backends
//! - `database`: connection pool, row models, migrations
//! - `routes`: HTTP handlers grouped by resource
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and set at least `JWT_SECRET`:
//! ```bash
//! cp .env.example .env
//! ```
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:8080/ping
//! ```

mod auth;
mod config;
mod database;
mod errors;
mod request_log;
mod routes;
mod server;
mod store;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading RUST_LOG or any config value
    let dotenv_result = dotenv::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting CRUD Server...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "🏗️  Build profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );
    match dotenv_result {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(_) => tracing::debug!("No .env file found; using process environment"),
    }

    let config = Config::from_env().inspect_err(|e| {
        tracing::error!("❌ Invalid configuration: {:#}", e);
    })?;
    tracing::debug!("Configuration: {:?}", config);

    server::start(config).await.inspect_err(|e| {
        tracing::error!("❌ Server failed: {:#}", e);
    })
}
