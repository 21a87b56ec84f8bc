//! The generic paged B+-tree engine: page images ([`page_image`]) and the
//! tree walk that operates on them ([`tree`]).

pub mod page_image;
pub mod tree;

pub use page_image::PageId;
pub use tree::BPlusTree;
