//! On-disk storage primitives: block-addressed files, the bounded page
//! cache, the untyped record heap, and the two small whole-file-serialized
//! containers (`VectorFile`, `HashMapFile`).

pub mod block_file;
pub mod codec;
pub mod hash_map_file;
pub mod page_cache;
pub mod record_heap;
pub mod vector_file;

pub use block_file::BlockFile;
pub use codec::Codec;
pub use hash_map_file::HashMapFile;
pub use page_cache::{Page, PageCache};
pub use record_heap::RecordHeap;
pub use vector_file::VectorFile;
