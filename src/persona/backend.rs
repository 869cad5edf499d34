//! Durable key-value backends
//!
//! The persona store keeps its whole custom collection as one JSON document
//! under a single key. Backends only move strings; they know nothing about
//! personas.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::error::StorageError;

/// Minimal key-value contract the persona store and session mirror need
pub trait StorageBackend {
    /// Read a value; a missing key is `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a value; either the whole value lands or nothing changes
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

fn check_quota(key: &str, value: &str, quota: Option<usize>) -> Result<(), StorageError> {
    match quota {
        Some(quota) if value.len() > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Limit the size of any single value in bytes
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| Self::io_error(key, e))?;
        tmp.write_all(value.as_bytes()).map_err(|e| Self::io_error(key, e))?;
        tmp.flush().map_err(|e| Self::io_error(key, e))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| Self::io_error(key, e.error))?;

        log::debug!("Wrote {} bytes to {}", value.len(), self.path_for(key).display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// In-process backend, used by tests and embedding callers
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Seed a raw value, bypassing the quota
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Raw value currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_key_is_none() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::new(temp.path());
        assert!(backend.read("absent").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_write_then_read() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path().join("nested"));
        backend.write("custom_prompts", "{}").unwrap();
        assert_eq!(backend.read("custom_prompts").unwrap().as_deref(), Some("{}"));
        assert!(temp.path().join("nested/custom_prompts.json").exists());
    }

    #[test]
    fn test_file_backend_quota_leaves_previous_value() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path()).with_quota(8);
        backend.write("k", "small").unwrap();

        let err = backend.write("k", "much too large").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { size: 14, quota: 8, .. }));
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_file_backend_remove_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path());
        backend.write("k", "v").unwrap();
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert!(backend.read("k").unwrap().is_none());
    }

    #[test]
    fn test_memory_backend_quota() {
        let mut backend = MemoryBackend::new().with_quota(3);
        assert!(backend.write("k", "abc").is_ok());
        assert!(backend.write("k", "abcd").is_err());
        assert_eq!(backend.raw("k"), Some("abc"));
    }
}
