//! An untyped append-and-random-access store over a [`BlockFile`], one
//! record per block. Each heap's block size is rounded up to fit the one
//! record type it stores, independent of the B+-tree engine's page
//! `BLOCK_SIZE`, so a wide record (a seat matrix, a train timetable)
//! doesn't have to fit in one B+-tree-sized page. Exposes partial I/O for
//! the domain layer (e.g. rewriting a single day-slice of a seat matrix
//! without reading or writing the whole record).

use std::path::Path;

use crate::error::Result;
use crate::storage::block_file::BlockFile;

pub struct RecordHeap {
    block_file: BlockFile,
    record_size: usize,
}

fn round_up_to_4096(size: usize) -> usize {
    (size + 4095) / 4096 * 4096
}

impl RecordHeap {
    /// Creates a new, empty heap file sized for `record_size`-byte records.
    pub fn create<P: AsRef<Path>>(path: P, record_size: usize) -> Result<Self> {
        let block_file = BlockFile::create_sized(path, 1, round_up_to_4096(record_size))?;
        Ok(Self { block_file, record_size })
    }

    /// Opens an existing heap file sized for `record_size`-byte records.
    pub fn open<P: AsRef<Path>>(path: P, record_size: usize) -> Result<Self> {
        let block_file = BlockFile::open_sized(path, 1, round_up_to_4096(record_size))?;
        Ok(Self { block_file, record_size })
    }

    /// Appends a zero-filled record and returns its index.
    pub fn write_empty(&self) -> Result<u64> {
        self.block_file.allocate()
    }

    /// Appends `data` as a new record and returns its index. `data` must
    /// not exceed `record_size`.
    pub fn write(&self, data: &[u8]) -> Result<u64> {
        let index = self.block_file.allocate()?;
        self.block_file.write_block(index, data)?;
        Ok(index)
    }

    /// Reads `size` bytes starting at `offset` within record `index`.
    pub fn read(&self, index: u64, offset: usize, size: usize) -> Result<Vec<u8>> {
        let mut full = vec![0u8; self.block_file.block_size()];
        self.block_file.read_block(index, &mut full)?;
        Ok(full[offset..offset + size].to_vec())
    }

    /// Reads the full record at `index`.
    pub fn read_full(&self, index: u64) -> Result<Vec<u8>> {
        self.read(index, 0, self.record_size)
    }

    /// Number of records appended so far (indices `1..=len()`).
    pub fn len(&self) -> Result<u64> {
        self.block_file.block_count()
    }

    /// Overwrites `size` bytes starting at `offset` within record `index`,
    /// leaving the rest of the record untouched.
    pub fn update(&self, index: u64, offset: usize, data: &[u8]) -> Result<()> {
        let mut full = vec![0u8; self.block_file.block_size()];
        self.block_file.read_block(index, &mut full)?;
        full[offset..offset + data.len()].copy_from_slice(data);
        self.block_file.write_block(index, &full)
    }

    pub fn flush(&self) -> Result<()> {
        self.block_file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_heap(record_size: usize) -> (std::path::PathBuf, RecordHeap) {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().to_path_buf();
        drop(f);
        std::fs::remove_file(&path).ok();
        let heap = RecordHeap::create(&path, record_size).unwrap();
        (path, heap)
    }

    #[test]
    fn write_then_read_round_trips() {
        let (path, heap) = temp_heap(16);
        let index = heap.write(b"hello").unwrap();
        let out = heap.read(index, 0, 5).unwrap();
        assert_eq!(&out, b"hello");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_update_leaves_rest_untouched() {
        let (path, heap) = temp_heap(16);
        let index = heap.write(b"aaaaaaaaaa").unwrap();
        heap.update(index, 2, b"BB").unwrap();
        let out = heap.read(index, 0, 10).unwrap();
        assert_eq!(&out, b"aaBBaaaaaa");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn wide_record_spans_multiple_4k_pages() {
        let (path, heap) = temp_heap(10_000);
        let data = vec![7u8; 10_000];
        let index = heap.write(&data).unwrap();
        let out = heap.read_full(index).unwrap();
        assert_eq!(out, data);
        std::fs::remove_file(&path).ok();
    }
}
