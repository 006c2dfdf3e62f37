/// Durable blob storage boundary.
///
/// The platform provides raw persistence (NVS on ESP-IDF, a file on a host);
/// the tracker only hands it named byte blobs. This is the one fallible seam
/// in the library, and every caller degrades gracefully on error.
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Storage failure. A missing blob is not an error (`Ok(None)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Medium could not be read (mount failure, driver error, ...)
    Read,
    /// Medium rejected the write
    Write,
    /// Blob exceeds what the medium can hold under one name
    TooLarge,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read => f.write_str("storage read failed"),
            StorageError::Write => f.write_str("storage write failed"),
            StorageError::TooLarge => f.write_str("blob too large for storage"),
        }
    }
}

/// Named blob persistence.
pub trait BlobStore {
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError>;
}

impl<S: BlobStore + ?Sized> BlobStore for &mut S {
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read(name)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(name, data)
    }
}

/// In-memory store for hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: &str, data: &[u8]) {
        self.blobs.insert(String::from(name), data.to_vec());
    }
}

impl BlobStore for MemoryStore {
    fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.get(name).cloned())
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        self.blobs.insert(String::from(name), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}
