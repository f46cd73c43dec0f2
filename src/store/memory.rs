//! In-memory stores used when no database is configured.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::database::models::{Device, User};
use crate::store::{
    validate_device, validate_username, DeviceStore, StoreError, StoreResult, UserStore,
};

#[derive(Debug)]
struct UserTable {
    next_id: i64,
    by_id: BTreeMap<i64, User>,
    by_name: HashMap<String, i64>,
}

/// Users kept in process memory. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(UserTable {
                next_id: 1,
                by_id: BTreeMap::new(),
                by_name: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        validate_username(username)?;

        let mut table = self.inner.write();
        if table.by_name.contains_key(username) {
            return Err(StoreError::UsernameExists);
        }

        let now = Utc::now();
        let user = User {
            id: table.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.next_id += 1;
        table.by_name.insert(user.username.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<User> {
        self.inner
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn get_by_username(&self, username: &str) -> StoreResult<User> {
        let table = self.inner.read();
        table
            .by_name
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().by_id.values().cloned().collect())
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

        let mut table = self.inner.write();
        let current = table.by_id.get(&id).ok_or(StoreError::UserNotFound)?.username.clone();

        if let Some(username) = username.filter(|name| *name != current) {
            if table.by_name.contains_key(username) {
                return Err(StoreError::UsernameExists);
            }
            table.by_name.remove(&current);
            table.by_name.insert(username.to_string(), id);
        }

        let user = table.by_id.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        if let Some(username) = username {
            user.username = username.to_string();
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash.to_string();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut table = self.inner.write();
        let user = table.by_id.remove(&id).ok_or(StoreError::UserNotFound)?;
        table.by_name.remove(&user.username);
        Ok(())
    }
}

#[derive(Debug)]
struct DeviceTable {
    next_id: i64,
    by_id: BTreeMap<i64, Device>,
}

/// Devices kept in process memory. Names are unique.
#[derive(Debug)]
pub struct InMemoryDeviceStore {
    inner: RwLock<DeviceTable>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DeviceTable {
                next_id: 1,
                by_id: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTable {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.by_id
            .values()
            .any(|d| d.name == name && Some(d.id) != except)
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn create(&self, name: &str, type_id: i64) -> StoreResult<Device> {
        validate_device(Some(name), Some(type_id))?;

        let mut table = self.inner.write();
        if table.name_taken(name, None) {
            return Err(StoreError::DeviceExists);
        }

        let now = Utc::now();
        let device = Device {
            id: table.next_id,
            name: name.to_string(),
            type_id,
            created_at: now,
            updated_at: now,
        };
        table.next_id += 1;
        table.by_id.insert(device.id, device.clone());
        Ok(device)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Device> {
        self.inner
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::DeviceNotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Device>> {
        Ok(self.inner.read().by_id.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        type_id: Option<i64>,
    ) -> StoreResult<Device> {
        validate_device(name, type_id)?;

        let mut table = self.inner.write();
        if !table.by_id.contains_key(&id) {
            return Err(StoreError::DeviceNotFound);
        }
        if let Some(name) = name {
            if table.name_taken(name, Some(id)) {
                return Err(StoreError::DeviceExists);
            }
        }

        let device = table.by_id.get_mut(&id).ok_or(StoreError::DeviceNotFound)?;
        if let Some(name) = name {
            device.name = name.to_string();
        }
        if let Some(type_id) = type_id {
            device.type_id = type_id;
        }
        device.updated_at = Utc::now();
        Ok(device.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.inner
            .write()
            .by_id
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::DeviceNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_crud() {
        let store = InMemoryUserStore::new();

        let alice = store.create("alice", "hash-a").await.unwrap();
        let bob = store.create("bob", "hash-b").await.unwrap();
        assert_eq!((alice.id, bob.id), (1, 2));

        assert_eq!(store.get_by_id(2).await.unwrap().username, "bob");
        assert_eq!(store.get_by_username("alice").await.unwrap().id, 1);

        let users = store.list().await.unwrap();
        assert_eq!(
            users.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![1, 2]
        );

        store.delete(1).await.unwrap();
        assert!(matches!(store.get_by_id(1).await, Err(StoreError::UserNotFound)));
        assert!(matches!(store.delete(1).await, Err(StoreError::UserNotFound)));

        // Ids are not reused after a delete.
        assert_eq!(store.create("carol", "hash-c").await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn test_user_validation_and_uniqueness() {
        let store = InMemoryUserStore::new();
        assert!(matches!(store.create("", "h").await, Err(StoreError::InvalidUsername)));

        store.create("alice", "h").await.unwrap();
        assert!(matches!(store.create("alice", "h").await, Err(StoreError::UsernameExists)));
    }

    #[tokio::test]
    async fn test_user_rename_keeps_index_consistent() {
        let store = InMemoryUserStore::new();
        let alice = store.create("alice", "h1").await.unwrap();
        store.create("bob", "h2").await.unwrap();

        assert!(matches!(
            store.update(alice.id, Some("bob"), None).await,
            Err(StoreError::UsernameExists)
        ));

        let renamed = store.update(alice.id, Some("alicia"), Some("h3")).await.unwrap();
        assert_eq!(renamed.username, "alicia");
        assert_eq!(renamed.password_hash, "h3");
        assert!(renamed.updated_at >= renamed.created_at);

        assert!(matches!(store.get_by_username("alice").await, Err(StoreError::UserNotFound)));
        assert_eq!(store.get_by_username("alicia").await.unwrap().id, alice.id);

        // Renaming to the current name is a no-op, not a conflict.
        assert!(store.update(alice.id, Some("alicia"), None).await.is_ok());

        // Freed name can be taken again.
        store.create("alice", "h4").await.unwrap();

        assert!(matches!(
            store.update(99, Some("zed"), None).await,
            Err(StoreError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_device_crud() {
        let store = InMemoryDeviceStore::new();

        let sensor = store.create("sensor-1", 3).await.unwrap();
        assert_eq!(sensor.id, 1);
        assert!(matches!(store.create("sensor-1", 4).await, Err(StoreError::DeviceExists)));
        assert!(matches!(store.create("", 4).await, Err(StoreError::InvalidDevice(_))));
        assert!(matches!(store.create("x", 0).await, Err(StoreError::InvalidDevice(_))));

        let updated = store.update(sensor.id, None, Some(7)).await.unwrap();
        assert_eq!((updated.name.as_str(), updated.type_id), ("sensor-1", 7));

        store.create("sensor-2", 3).await.unwrap();
        assert!(matches!(
            store.update(sensor.id, Some("sensor-2"), None).await,
            Err(StoreError::DeviceExists)
        ));

        assert_eq!(store.list().await.unwrap().len(), 2);
        store.delete(sensor.id).await.unwrap();
        assert!(matches!(store.get_by_id(sensor.id).await, Err(StoreError::DeviceNotFound)));
        assert!(matches!(store.delete(sensor.id).await, Err(StoreError::DeviceNotFound)));
    }
}
