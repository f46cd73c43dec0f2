//! # Store Module
//!
//! Persistence ports for users and devices, with an in-memory backend and a
//! PostgreSQL backend.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Device, User};

pub use memory::{InMemoryDeviceStore, InMemoryUserStore};
pub use postgres::{PgDeviceStore, PgUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,

    #[error("username already exists")]
    UsernameExists,

    #[error("invalid username")]
    InvalidUsername,

    #[error("device not found")]
    DeviceNotFound,

    #[error("device already exists")]
    DeviceExists,

    #[error("invalid device: {0}")]
    InvalidDevice(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence. `update` leaves `None` fields untouched.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User>;
    async fn get_by_id(&self, id: i64) -> StoreResult<User>;
    async fn get_by_username(&self, username: &str) -> StoreResult<User>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn update(
        &self,
        id: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> StoreResult<User>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

/// Device persistence. `update` leaves `None` fields untouched.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn create(&self, name: &str, type_id: i64) -> StoreResult<Device>;
    async fn get_by_id(&self, id: i64) -> StoreResult<Device>;
    async fn list(&self) -> StoreResult<Vec<Device>>;
    async fn update(&self, id: i64, name: Option<&str>, type_id: Option<i64>)
        -> StoreResult<Device>;
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

/// Shared field rules so both backends reject the same input.
pub(crate) fn validate_username(username: &str) -> StoreResult<()> {
    if username.is_empty() {
        return Err(StoreError::InvalidUsername);
    }
    Ok(())
}

pub(crate) fn validate_device(name: Option<&str>, type_id: Option<i64>) -> StoreResult<()> {
    if name.is_some_and(str::is_empty) {
        return Err(StoreError::InvalidDevice("name is required".into()));
    }
    if type_id.is_some_and(|t| t <= 0) {
        return Err(StoreError::InvalidDevice("type_id must be positive".into()));
    }
    Ok(())
}
