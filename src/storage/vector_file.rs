//! A small, fully in-memory ordered sequence backed by a sidecar file that
//! is deserialised whole on construction and re-serialised whole on
//! `close`. Used for indexes small enough that paging them through the
//! B+-tree engine would be overkill, e.g. the train-index-to-display-ID
//! table.

use std::{fs, path::PathBuf};

use crate::error::{Error, Result};
use crate::storage::codec::Codec;

/// Upper bound on the number of elements a `VectorFile` will hold in
/// memory; construction and `push` both enforce it rather than silently
/// growing without limit.
pub const MAX_ENTRIES: usize = 1_000_000;

pub struct VectorFile<T> {
    path: PathBuf,
    entries: Vec<T>,
}

impl<T: Codec> VectorFile<T> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, entries: Vec::new() });
        }
        let bytes = fs::read(&path)?;
        if bytes.len() < 8 {
            return Err(Error::InvalidArgument(format!(
                "{}: truncated vector file header",
                path.display()
            )));
        }
        let mut count_buf = [0u8; 8];
        count_buf.copy_from_slice(&bytes[..8]);
        let count = u64::from_le_bytes(count_buf) as usize;
        if count > MAX_ENTRIES {
            return Err(Error::Capacity);
        }
        let mut entries = Vec::with_capacity(count);
        let mut offset = 8;
        for _ in 0..count {
            let end = offset + T::SIZE;
            if end > bytes.len() {
                return Err(Error::InvalidArgument(format!(
                    "{}: truncated vector file body",
                    path.display()
                )));
            }
            entries.push(T::decode(&bytes[offset..end]));
            offset = end;
        }
        Ok(Self { path, entries })
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        if index >= self.entries.len() {
            return Err(Error::NotFound);
        }
        self.entries[index] = value;
        Ok(())
    }

    pub fn push(&mut self, value: T) -> Result<usize> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(Error::Capacity);
        }
        self.entries.push(value);
        Ok(self.entries.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-serialises the whole container to its sidecar file.
    pub fn close(&self) -> Result<()> {
        let mut bytes = Vec::with_capacity(8 + self.entries.len() * T::SIZE);
        bytes.extend_from_slice(&(self.entries.len() as u64).to_le_bytes());
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl<T: Codec> Drop for VectorFile<T> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().to_path_buf();
        drop(f);
        std::fs::remove_file(&path).ok();
        path
    }

    #[test]
    fn persists_across_reopen() {
        let path = temp_path();
        {
            let mut v: VectorFile<u32> = VectorFile::open(&path).unwrap();
            v.push(10).unwrap();
            v.push(20).unwrap();
            v.close().unwrap();
        }
        let v: VectorFile<u32> = VectorFile::open(&path).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(0), Some(&10));
        assert_eq!(v.get(1), Some(&20));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_sidecar_starts_empty() {
        let path = temp_path();
        let v: VectorFile<u32> = VectorFile::open(&path).unwrap();
        assert!(v.is_empty());
    }
}
