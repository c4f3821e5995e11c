#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::ErrorKind;
use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::KeyValueStore;

pub struct FileStore {
    dir: path::PathBuf,
}

impl FileStore {
    pub fn new(dir: path::PathBuf) -> Result<FileStore> {
        if dir.as_os_str().is_empty() {
            bail!("Storage directory is not defined");
        }

        return Ok(FileStore { dir });
    }

    pub fn dir(&self) -> &path::Path {
        return &self.dir;
    }

    fn get_file_path(&self, key: &str) -> Result<path::PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!(format!("Invalid storage key {key}"));
        }

        return Ok(self.dir.join(format!("{key}.json")));
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.get_file_path(key)?;
        match fs::read_to_string(file_path) {
            Ok(payload) => return Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.get_file_path(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        // Rename over the target so readers never see a partial blob.
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value.as_bytes())?;
        fs::rename(&tmp_path, &file_path)?;

        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.get_file_path(key)?;
        match fs::remove_file(file_path) {
            Ok(_) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    }
}
