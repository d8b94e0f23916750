use std::sync::Arc;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;

use super::store::KeyValueStore;

/// A typed value mirrored to one key of a [`KeyValueStore`].
///
/// Loaded once on construction; every successful mutation is written back
/// synchronously. Updaters always run against the latest in-memory value.
pub struct LocalStorage<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> std::fmt::Debug for LocalStorage<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> LocalStorage<T>
where
    T: Serialize + DeserializeOwned + Clone + Default,
{
    /// Load `key` from `store`, falling back to `T::default()` when the key is
    /// missing or its contents cannot be read.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let value = match store.load(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Stored value under '{key}' is unreadable, starting fresh: {e}");
                    T::default()
                }
            },
            Ok(None) => {
                debug!("No stored value under '{key}', using defaults");
                T::default()
            }
            Err(e) => {
                warn!("Failed to read '{key}' from store, using defaults: {e}");
                T::default()
            }
        };
        Self { store, key, value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and persist it.
    ///
    /// The in-memory value is replaced even if the write fails; the write
    /// error is returned.
    pub fn set(&mut self, value: T) -> Result<(), CoreError> {
        self.value = value;
        self.persist()
    }

    /// Apply `f` to a copy of the latest value. On `Ok` the copy becomes the
    /// new value and is persisted; on `Err` nothing changes.
    pub fn update<R>(
        &mut self,
        f: impl FnOnce(&mut T) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut next = self.value.clone();
        let result = f(&mut next)?;
        self.set(next)?;
        Ok(result)
    }

    /// Remove the key from the store and reset to `T::default()`.
    /// If the remove fails the in-memory value is left as it was.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.store.remove(&self.key)?;
        self.value = T::default();
        Ok(())
    }

    fn persist(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.value).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize '{}': {e}", self.key))
        })?;
        self.store.save(&self.key, &raw).map_err(|e| {
            error!("Failed to write '{}' to store: {e}", self.key);
            e
        })
    }
}
