//! Durable key-value slots holding the cart snapshot.

use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Fixed key the cart snapshot is stored under.
pub const CART_KEY: &str = "tiffin.cart";

/// Slot read/write failures.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Filesystem error
    #[error("slot I/O failed for {path}: {source}")]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The key contains characters that cannot be mapped to storage.
    #[error("invalid slot key: {0}")]
    InvalidKey(String),
}

/// Client-local persistence port.
pub trait CartSlot: Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the underlying storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the underlying storage cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Remove the value stored under `key`. Clearing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`SlotError`] if the underlying storage cannot be modified.
    fn clear(&mut self, key: &str) -> Result<(), SlotError>;
}

/// In-memory slot, used by tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    values: FxHashMap<String, String>,
}

impl MemorySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-seeded with one value.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut slot = Self::new();

        slot.values.insert(key.to_string(), value.into());

        slot
    }

    /// Peek at a stored value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl CartSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        self.values.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), SlotError> {
        self.values.remove(key);

        Ok(())
    }
}

/// Slot backed by one JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Store values under `dir`, which is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SlotError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');

        if valid {
            Ok(self.dir.join(format!("{key}.json")))
        } else {
            Err(SlotError::InvalidKey(key.to_string()))
        }
    }
}

impl CartSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir).map_err(|source| SlotError::Io {
            path: self.dir.clone(),
            source,
        })?;

        fs::write(&tmp, value).map_err(|source| SlotError::Io {
            path: tmp.clone(),
            source,
        })?;

        fs::rename(&tmp, &path).map_err(|source| SlotError::Io { path, source })
    }

    fn clear(&mut self, key: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SlotError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_slot_round_trips_and_clears() -> TestResult {
        let mut slot = MemorySlot::new();

        assert_eq!(slot.read(CART_KEY)?, None);

        slot.write(CART_KEY, "{}")?;
        assert_eq!(slot.read(CART_KEY)?.as_deref(), Some("{}"));

        slot.clear(CART_KEY)?;
        assert_eq!(slot.read(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn file_slot_creates_directory_and_persists() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut slot = FileSlot::new(dir.path().join("nested"));

        assert_eq!(slot.read(CART_KEY)?, None);

        slot.write(CART_KEY, "{\"lines\":[]}")?;

        let reopened = FileSlot::new(dir.path().join("nested"));

        assert_eq!(
            reopened.read(CART_KEY)?.as_deref(),
            Some("{\"lines\":[]}")
        );

        Ok(())
    }

    #[test]
    fn file_slot_clear_is_idempotent() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut slot = FileSlot::new(dir.path());

        slot.clear(CART_KEY)?;
        slot.write(CART_KEY, "x")?;
        slot.clear(CART_KEY)?;

        assert_eq!(slot.read(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn file_slot_rejects_path_like_keys() {
        let slot = FileSlot::new("unused");

        assert!(matches!(
            slot.read("../escape"),
            Err(SlotError::InvalidKey(_))
        ));
        assert!(matches!(slot.read(""), Err(SlotError::InvalidKey(_))));
    }
}
