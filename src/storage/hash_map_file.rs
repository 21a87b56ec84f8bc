//! A small, fully in-memory key-value map backed by a sidecar file,
//! serialised the same way as [`VectorFile`](super::vector_file::VectorFile)
//! (entry count, then flat `(K, V)` pairs) and rehashed into a `HashMap`
//! on load.

use std::{
    collections::HashMap,
    fs,
    hash::Hash,
    path::PathBuf,
};

use crate::error::{Error, Result};
use crate::storage::codec::Codec;
use crate::storage::vector_file::MAX_ENTRIES;

pub struct HashMapFile<K, V> {
    path: PathBuf,
    entries: HashMap<K, V>,
}

impl<K: Codec + Eq + Hash, V: Codec> HashMapFile<K, V> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, entries: HashMap::new() });
        }
        let bytes = fs::read(&path)?;
        if bytes.len() < 8 {
            return Err(Error::InvalidArgument(format!(
                "{}: truncated hash map file header",
                path.display()
            )));
        }
        let mut count_buf = [0u8; 8];
        count_buf.copy_from_slice(&bytes[..8]);
        let count = u64::from_le_bytes(count_buf) as usize;
        if count > MAX_ENTRIES {
            return Err(Error::Capacity);
        }
        let pair_size = K::SIZE + V::SIZE;
        let mut entries = HashMap::with_capacity(count);
        let mut offset = 8;
        for _ in 0..count {
            let end = offset + pair_size;
            if end > bytes.len() {
                return Err(Error::InvalidArgument(format!(
                    "{}: truncated hash map file body",
                    path.display()
                )));
            }
            let key = K::decode(&bytes[offset..offset + K::SIZE]);
            let value = V::decode(&bytes[offset + K::SIZE..end]);
            entries.insert(key, value);
            offset = end;
        }
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if self.entries.len() >= MAX_ENTRIES && !self.entries.contains_key(&key) {
            return Err(Error::Capacity);
        }
        Ok(self.entries.insert(key, value))
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn close(&self) -> Result<()> {
        let pair_size = K::SIZE + V::SIZE;
        let mut bytes = Vec::with_capacity(8 + self.entries.len() * pair_size);
        bytes.extend_from_slice(&(self.entries.len() as u64).to_le_bytes());
        for (key, value) in &self.entries {
            bytes.extend_from_slice(&key.to_bytes());
            bytes.extend_from_slice(&value.to_bytes());
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl<K: Codec + Eq + Hash, V: Codec> Drop for HashMapFile<K, V> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
