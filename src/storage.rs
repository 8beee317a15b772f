use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::{CalError, Result};

/// Durable key-value storage for the client.
///
/// Each named slot is one JSON file in the data directory. Writes go through
/// a temporary file that is atomically moved into place, so a slot is
/// always either its old or its new content.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Directory holding one file per slot
    dir: PathBuf,
}

impl LocalStorage {
    /// Creates a storage handle rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Helper method to get the file path for a slot
    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot))
    }

    /// Reads the raw content of a slot; `None` when the slot was never written.
    pub fn get(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        if !path.exists() {
            trace!("Slot {} is empty ({} missing)", slot, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read slot file {}: {}", path.display(), e);
            CalError::Io(e)
        })?;
        Ok(Some(content))
    }

    /// Reads and decodes a JSON slot.
    ///
    /// Content that does not decode is reported as [`CalError::StorageCorrupt`];
    /// callers decide whether that is fatal.
    pub fn get_json<T: DeserializeOwned>(&self, slot: &str) -> Result<Option<T>> {
        match self.get(slot)? {
            None => Ok(None),
            Some(content) if content.trim().is_empty() => Ok(None),
            Some(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                warn!("Slot {} holds malformed JSON: {}", slot, e);
                CalError::StorageCorrupt {
                    slot: slot.to_string(),
                    message: e.to_string(),
                }
            }),
        }
    }

    /// Stores a value in a slot using an atomic replace
    pub fn set_json<T: Serialize + ?Sized>(&self, slot: &str, value: &T) -> Result<()> {
        trace!("Serializing slot {} to JSON", slot);
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            error!("Failed to serialize slot {}: {}", slot, e);
            CalError::Serialization(e)
        })?;
        self.set(slot, &json)
    }

    /// Stores raw text in a slot using an atomic replace
    pub fn set(&self, slot: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;

        let path = self.slot_path(slot);
        debug!("Writing slot {} to {}", slot, path.display());

        // Temporary file in the same directory so the final rename stays atomic
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            CalError::Io(e)
        })?;

        temp_file.write_all(content.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            CalError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            CalError::Io(e)
        })?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            CalError::Io(e.error)
        })?;

        trace!("Slot {} written", slot);
        Ok(())
    }

    /// Deletes a slot. Removing a missing slot is not an error.
    pub fn remove(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot);
        if path.exists() {
            debug!("Removing slot {} ({})", slot, path.display());
            fs::remove_file(&path).map_err(|e| {
                error!("Failed to remove slot file {}: {}", path.display(), e);
                CalError::Io(e)
            })?;
        }
        Ok(())
    }

    /// Copies a slot's file to `<slot>.corrupt.json` in the same directory.
    ///
    /// Returns the copy's path, or `None` when the slot was never written.
    pub fn quarantine(&self, slot: &str) -> Result<Option<PathBuf>> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let target = self.dir.join(format!("{}.corrupt.json", slot));
        fs::copy(&path, &target).map_err(|e| {
            error!("Failed to copy {} to {}: {}", path.display(), target.display(), e);
            CalError::Io(e)
        })?;
        warn!("Kept unreadable slot {} as {}", slot, target.display());
        Ok(Some(target))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            debug!("Storage directory does not exist, creating: {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(|e| {
                error!("Failed to create storage directory: {}", e);
                CalError::DirectoryError {
                    path: self.dir.clone(),
                }
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert_eq!(storage.get("nothing").unwrap(), None);
        assert_eq!(storage.get_json::<Vec<String>>("nothing").unwrap(), None);
    }

    #[test]
    fn writes_create_the_directory_and_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested").join("data"));
        storage.set_json("words", &vec!["a", "b"]).unwrap();
        let words: Vec<String> = storage.get_json("words").unwrap().unwrap();
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn malformed_json_is_reported_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.set("broken", "[{not json").unwrap();
        let err = storage.get_json::<Vec<String>>("broken").unwrap_err();
        assert!(matches!(err, CalError::StorageCorrupt { ref slot, .. } if slot == "broken"));
    }

    #[test]
    fn quarantine_copies_the_slot_aside() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert_eq!(storage.quarantine("broken").unwrap(), None);

        storage.set("broken", "[{not json").unwrap();
        let copy = storage.quarantine("broken").unwrap().unwrap();
        assert_eq!(copy, dir.path().join("broken.corrupt.json"));
        assert_eq!(fs::read_to_string(copy).unwrap(), "[{not json");
        assert_eq!(storage.get("broken").unwrap().as_deref(), Some("[{not json"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.set("code", "AMOR2024").unwrap();
        storage.remove("code").unwrap();
        storage.remove("code").unwrap();
        assert_eq!(storage.get("code").unwrap(), None);
    }
}
