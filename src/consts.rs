//! Tunable knobs for the storage engine, kept together in one place.

/// Bytes per block, including the reserved header block (block 0).
pub const BLOCK_SIZE: usize = 4096;

/// Default bound on the number of live page handles a `PageCache` keeps
/// before evicting the least-recently-used unreferenced entry.
pub const DEFAULT_CACHE_MAX: usize = 64;

/// Depth bound for the descent path stack; exceeding it is an assertion
/// failure (a bug), not a runtime error.
pub const MAX_PATH_DEPTH: usize = 40;

/// Reserved integer slots in the Block File header used by `BPlusTree`.
pub const SLOT_ROOT_INDEX: usize = 1;
pub const SLOT_SIZE: usize = 2;
pub const SLOT_FREE_LIST_HEAD: usize = 3;
pub const TREE_HEADER_SLOTS: usize = 3;
