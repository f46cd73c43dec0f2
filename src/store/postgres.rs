// PostgreSQL stores
//
// Rows are soft-deleted through `deleted_at`; every read filters them out and
// the unique indexes only cover live rows.

use anyhow::Context;
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::database::models::{Device, FromRow, User};
use crate::store::{
    validate_device, validate_username, DeviceStore, StoreError, StoreResult, UserStore,
};

/// Map a unique violation to `exists`, anything else to a backend error.
fn map_write_error(err: tokio_postgres::Error, exists: StoreError, what: &str) -> StoreError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        return exists;
    }
    StoreError::Backend(anyhow::Error::new(err).context(format!("Failed to {what}")))
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        validate_username(username)?;

        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username, password_hash, created_at, updated_at",
                &[&username, &password_hash],
            )
            .await
            .map_err(|e| map_write_error(e, StoreError::UsernameExists, "insert user"))?;

        Ok(User::from_row(&row).context("Failed to read inserted user")?)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<User> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT id, username, password_hash, created_at, updated_at FROM users WHERE id = $1 AND deleted_at IS NULL",
                &[&id],
            )
            .await
            .context("Failed to query user by id")?
            .ok_or(StoreError::UserNotFound)?;

        Ok(User::from_row(&row).context("Failed to read user row")?)
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<User> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT id, username, password_hash, created_at, updated_at FROM users WHERE username = $1 AND deleted_at IS NULL",
                &[&username],
            )
            .await
            .context("Failed to query user by username")?
            .ok_or(StoreError::UserNotFound)?;

        Ok(User::from_row(&row).context("Failed to read user row")?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT id, username, password_hash, created_at, updated_at FROM users WHERE deleted_at IS NULL ORDER BY id ASC",
                &[],
            )
            .await
            .context("Failed to list users")?;

        let users = rows
            .iter()
            .map(User::from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read user rows")?;
        Ok(users)
    }

    async fn update(
        &self,
        id: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> StoreResult<User> {
        if let Some(username) = username {
            validate_username(username)?;
        }

        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "UPDATE users SET username = COALESCE($2, username), \
                     password_hash = COALESCE($3, password_hash), updated_at = NOW() \
                     WHERE id = $1 AND deleted_at IS NULL RETURNING id, username, password_hash, created_at, updated_at",
                &[&id, &username, &password_hash],
            )
            .await
            .map_err(|e| map_write_error(e, StoreError::UsernameExists, "update user"))?
            .ok_or(StoreError::UserNotFound)?;

        Ok(User::from_row(&row).context("Failed to read updated user")?)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                &[&id],
            )
            .await
            .context("Failed to delete user")?;

        if n == 0 {
            return Err(StoreError::UserNotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgDeviceStore {
    pool: Pool,
}

impl PgDeviceStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for PgDeviceStore {
    async fn create(&self, name: &str, type_id: i64) -> StoreResult<Device> {
        validate_device(Some(name), Some(type_id))?;

        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO devices (name, type_id) VALUES ($1, $2) RETURNING id, name, type_id, created_at, updated_at",
                &[&name, &type_id],
            )
            .await
            .map_err(|e| map_write_error(e, StoreError::DeviceExists, "insert device"))?;

        Ok(Device::from_row(&row).context("Failed to read inserted device")?)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Device> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT id, name, type_id, created_at, updated_at FROM devices WHERE id = $1 AND deleted_at IS NULL",
                &[&id],
            )
            .await
            .context("Failed to query device by id")?
            .ok_or(StoreError::DeviceNotFound)?;

        Ok(Device::from_row(&row).context("Failed to read device row")?)
    }

    async fn list(&self) -> StoreResult<Vec<Device>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT id, name, type_id, created_at, updated_at FROM devices WHERE deleted_at IS NULL ORDER BY id ASC",
                &[],
            )
            .await
            .context("Failed to list devices")?;

        let devices = rows
            .iter()
            .map(Device::from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read device rows")?;
        Ok(devices)
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        type_id: Option<i64>,
    ) -> StoreResult<Device> {
        validate_device(name, type_id)?;

        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "UPDATE devices SET name = COALESCE($2, name), \
                     type_id = COALESCE($3, type_id), updated_at = NOW() \
                     WHERE id = $1 AND deleted_at IS NULL RETURNING id, name, type_id, created_at, updated_at",
                &[&id, &name, &type_id],
            )
            .await
            .map_err(|e| map_write_error(e, StoreError::DeviceExists, "update device"))?
            .ok_or(StoreError::DeviceNotFound)?;

        Ok(Device::from_row(&row).context("Failed to read updated device")?)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE devices SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                &[&id],
            )
            .await
            .context("Failed to delete device")?;

        if n == 0 {
            return Err(StoreError::DeviceNotFound);
        }
        Ok(())
    }
}
