//! Durable local key-value storage
//!
//! The storefront has no database; everything durable lives behind a small
//! key-value abstraction with JSON values. Malformed or missing stored data
//! falls back to defaults instead of failing the whole session.
//!
//! Concurrent instances over the same file are last-writer-wins; there is no
//! merge. Acceptable at this scale, but it is a property, not an accident.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::{Result, StorefrontError};

/// Persisted keys and their shapes.
pub mod keys {
    /// `Vec<User>` including password hashes.
    pub const USERS: &str = "users";
    /// `Vec<Order>`.
    pub const ORDERS: &str = "orders";
    /// Single user id, absent while anonymous.
    pub const CURRENT_USER_ID: &str = "current_user_id";
    /// `map<user_id, Vec<product_id>>`.
    pub const WISHLISTS: &str = "wishlists";
    /// `FilterSpec` minus the price bounds.
    pub const SHOP_FILTERS: &str = "shop_filters";
    /// `{min, max}`.
    pub const SHOP_PRICE_RANGE: &str = "shop_price_range";
}

pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Deserializes the stored value, or yields the type's default when the key
/// is absent or its contents do not parse.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> T {
    load(store, key).unwrap_or_default()
}

pub fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding malformed stored value");
            None
        }
    }
}

pub fn save<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|e| StorefrontError::Storage(e.to_string()))?;
    store.put(key, raw)
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// One JSON object per file on disk, rewritten on every put.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "starting from an empty store");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StorefrontError::Storage(e.to_string())),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StorefrontError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| StorefrontError::Storage(e.to_string()))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.flush()
    }
}
