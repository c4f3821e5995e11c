pub mod file;
pub mod memory;

use std::sync::Arc;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::KeyValueStoreRef;

pub struct StorageManager {}

impl StorageManager {
    /// File backed store in the configured data directory, or an in memory
    /// store when `ephemeral` is set.
    pub fn get(ephemeral: bool) -> Result<KeyValueStoreRef> {
        if ephemeral {
            tracing::debug!("using in-memory session storage");
            return Ok(Arc::new(memory::MemoryStore::default()));
        }

        let dir = Config::get(ConfigKey::DataDir);
        tracing::debug!(dir = dir, "using file session storage");
        return Ok(Arc::new(file::FileStore::new(dir.into())?));
    }
}
