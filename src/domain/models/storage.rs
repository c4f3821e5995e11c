use std::sync::Arc;

use anyhow::Result;

/// Synchronous string store that session state is mirrored into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites any previous value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that doesn't exist is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

pub type KeyValueStoreRef = Arc<dyn KeyValueStore + Send + Sync>;
