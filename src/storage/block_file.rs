//! Fixed-size block storage backed by a single OS file: block 0 is
//! reserved for a handful of persistent integer "info slots" (root page
//! index, element count, free-list head...), and blocks 1.. hold opaque
//! fixed-size payloads addressed by index.
//!
//! Kept as a thin `RefCell<File>` wrapper with no caching of its own:
//! `BlockFile` only knows about raw bytes and block indices, the caching
//! and dirty-tracking concerns live one layer up in
//! [`crate::storage::page_cache`].

use std::{
    cell::RefCell,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

use crate::consts::BLOCK_SIZE;
use crate::error::Result;

const SLOT_WIDTH: usize = std::mem::size_of::<i64>();

/// A block-addressed file with a reserved header block of integer slots.
///
/// Block 0 is the header. Blocks 1, 2, 3... are the addressable payload
/// blocks; index 0 is never handed out by [`BlockFile::allocate`], which
/// mirrors `File::write()`'s `tellp() / BLOCK_SIZE` bookkeeping once the
/// header block has already been written.
///
/// Block size is an instance field, not always the global `BLOCK_SIZE`:
/// the original `DataFile<Tp, BLOCK_SIZE = (sizeof(Tp)+4095)/4096*4096>`
/// sizes each file's blocks to the record type it stores, rounded up to a
/// multiple of 4096. `create`/`open` use the shared `BLOCK_SIZE` (for
/// B+-tree pages); `create_sized`/`open_sized` let a caller (the record
/// heap) pick a block size that fits its own record type.
pub struct BlockFile {
    file: RefCell<File>,
    info_slots: usize,
    block_size: usize,
}

impl BlockFile {
    /// Creates a new, empty block file at `path`, writing a zeroed header
    /// block. Fails if `path` already exists.
    pub fn create<P: AsRef<Path>>(path: P, info_slots: usize) -> Result<Self> {
        Self::create_sized(path, info_slots, BLOCK_SIZE)
    }

    /// Opens an existing block file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, info_slots: usize) -> Result<Self> {
        Self::open_sized(path, info_slots, BLOCK_SIZE)
    }

    /// Like [`Self::create`], but with an explicit block size instead of
    /// the shared `BLOCK_SIZE`.
    pub fn create_sized<P: AsRef<Path>>(path: P, info_slots: usize, block_size: usize) -> Result<Self> {
        assert!(
            info_slots * SLOT_WIDTH <= block_size,
            "info_slots too large for block size"
        );
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        let block_file = Self {
            file: RefCell::new(file),
            info_slots,
            block_size,
        };
        block_file.file.borrow_mut().set_len(block_size as u64)?;
        Ok(block_file)
    }

    /// Like [`Self::open`], but with an explicit block size instead of the
    /// shared `BLOCK_SIZE`.
    pub fn open_sized<P: AsRef<Path>>(path: P, info_slots: usize, block_size: usize) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file: RefCell::new(file),
            info_slots,
            block_size,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Reads the 1-based integer slot `n` from the header block.
    pub fn get_slot(&self, n: usize) -> Result<i64> {
        assert!(n >= 1 && n <= self.info_slots, "slot {} out of range", n);
        let mut buf = [0u8; SLOT_WIDTH];
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(((n - 1) * SLOT_WIDTH) as u64))?;
        file.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Writes the 1-based integer slot `n` in the header block.
    pub fn set_slot(&self, n: usize, value: i64) -> Result<()> {
        assert!(n >= 1 && n <= self.info_slots, "slot {} out of range", n);
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(((n - 1) * SLOT_WIDTH) as u64))?;
        file.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Appends a new zeroed block and returns its index (always >= 1).
    pub fn allocate(&self) -> Result<u64> {
        let mut file = self.file.borrow_mut();
        let len = file.metadata()?.len();
        let index = len / self.block_size as u64;
        file.set_len(len + self.block_size as u64)?;
        Ok(index)
    }

    /// Reads block `index` in full.
    pub fn read_block(&self, index: u64, buf: &mut [u8]) -> Result<()> {
        assert!(buf.len() <= self.block_size);
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(index * self.block_size as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Overwrites block `index` in full. `data` must not exceed the block
    /// size; the remainder of the block keeps its previous contents.
    pub fn write_block(&self, index: u64, data: &[u8]) -> Result<()> {
        assert!(data.len() <= self.block_size);
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(index * self.block_size as u64))?;
        file.write_all(data)?;
        Ok(())
    }

    /// Number of payload blocks, not counting the header block.
    pub fn block_count(&self) -> Result<u64> {
        let len = self.file.borrow().metadata()?.len();
        Ok(len / self.block_size as u64 - 1)
    }

    pub fn flush(&self) -> Result<()> {
        self.file.borrow_mut().flush()?;
        Ok(())
    }
}
