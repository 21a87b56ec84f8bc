//! Page images for the generic B+-tree engine: a tagged [`PageId`] and the
//! inner/leaf page shapes it addresses. Pages use a contiguous
//! shift-array layout (`key[]`/`child[]`/`data[]` plus a `count`), not a
//! bitmap-slot layout.
//!
//! `PageId` is sign-tagged (positive for inner, negative for leaf), but
//! every encoded block also carries a leading tag byte identifying it as
//! inner or leaf, so a single [`crate::storage::page_cache::PageCache`]
//! can decode either shape without external context.

use crate::storage::codec::Codec;
use crate::storage::page_cache::Page;

const TAG_INNER: u8 = 1;
const TAG_LEAF: u8 = 2;
const HEADER_SIZE: usize = 5; // tag byte + u32 count
const CHILD_SIZE: usize = 8; // raw PageId encoding

/// A block index tagged with the inner/leaf polarity of the page it
/// names: positive is inner, negative is leaf, zero is "no page".
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PageId(i64);

impl PageId {
    pub const NONE: PageId = PageId(0);

    pub fn inner(block_index: u64) -> Self {
        assert!(block_index > 0, "block 0 is reserved for the header");
        PageId(block_index as i64)
    }

    pub fn leaf(block_index: u64) -> Self {
        assert!(block_index > 0, "block 0 is reserved for the header");
        PageId(-(block_index as i64))
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn is_inner(&self) -> bool {
        self.0 > 0
    }

    pub fn is_leaf(&self) -> bool {
        self.0 < 0
    }

    pub fn block_index(&self) -> u64 {
        self.0.unsigned_abs()
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn from_raw(raw: i64) -> Self {
        PageId(raw)
    }
}

impl std::fmt::Debug for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "PageId(none)")
        } else if self.is_inner() {
            write!(f, "PageId(inner:{})", self.block_index())
        } else {
            write!(f, "PageId(leaf:{})", self.block_index())
        }
    }
}

pub struct InnerPage<K> {
    pub keys: Vec<K>,
    pub children: Vec<PageId>,
}

impl<K> InnerPage<K> {
    pub fn new() -> Self {
        Self { keys: Vec::new(), children: Vec::new() }
    }

    pub fn count(&self) -> usize {
        self.children.len()
    }
}

pub struct LeafPage<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
    pub next: PageId,
}

impl<K, V> LeafPage<K, V> {
    pub fn new() -> Self {
        Self { keys: Vec::new(), values: Vec::new(), next: PageId::NONE }
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }
}

pub enum NodePage<K, V> {
    Inner(InnerPage<K>),
    Leaf(LeafPage<K, V>),
}

impl<K, V> NodePage<K, V> {
    pub fn as_inner(&self) -> &InnerPage<K> {
        match self {
            NodePage::Inner(p) => p,
            NodePage::Leaf(_) => panic!("expected inner page, found leaf page"),
        }
    }

    pub fn as_inner_mut(&mut self) -> &mut InnerPage<K> {
        match self {
            NodePage::Inner(p) => p,
            NodePage::Leaf(_) => panic!("expected inner page, found leaf page"),
        }
    }

    pub fn as_leaf(&self) -> &LeafPage<K, V> {
        match self {
            NodePage::Leaf(p) => p,
            NodePage::Inner(_) => panic!("expected leaf page, found inner page"),
        }
    }

    pub fn as_leaf_mut(&mut self) -> &mut LeafPage<K, V> {
        match self {
            NodePage::Leaf(p) => p,
            NodePage::Inner(_) => panic!("expected leaf page, found inner page"),
        }
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, NodePage::Inner(_))
    }
}

impl<K: Codec, V: Codec> Page for NodePage<K, V> {
    const SIZE: usize = crate::consts::BLOCK_SIZE;

    fn decode(_index: u64, buf: &[u8]) -> Self {
        let tag = buf[0];
        let count = u32::decode(&buf[1..5]) as usize;
        let mut offset = HEADER_SIZE;
        match tag {
            TAG_INNER => {
                let key_count = count.saturating_sub(1);
                let mut keys = Vec::with_capacity(key_count);
                for _ in 0..key_count {
                    keys.push(K::decode(&buf[offset..offset + K::SIZE]));
                    offset += K::SIZE;
                }
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    children.push(PageId::from_raw(i64::decode(&buf[offset..offset + CHILD_SIZE])));
                    offset += CHILD_SIZE;
                }
                NodePage::Inner(InnerPage { keys, children })
            }
            TAG_LEAF => {
                let mut keys = Vec::with_capacity(count);
                for _ in 0..count {
                    keys.push(K::decode(&buf[offset..offset + K::SIZE]));
                    offset += K::SIZE;
                }
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(V::decode(&buf[offset..offset + V::SIZE]));
                    offset += V::SIZE;
                }
                let next = PageId::from_raw(i64::decode(&buf[offset..offset + CHILD_SIZE]));
                NodePage::Leaf(LeafPage { keys, values, next })
            }
            other => panic!("malformed page tag {}", other),
        }
    }

    fn encode(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = 0;
        }
        match self {
            NodePage::Inner(page) => {
                buf[0] = TAG_INNER;
                (page.count() as u32).encode(&mut buf[1..5]);
                let mut offset = HEADER_SIZE;
                for key in &page.keys {
                    key.encode(&mut buf[offset..offset + K::SIZE]);
                    offset += K::SIZE;
                }
                for child in &page.children {
                    child.raw().encode(&mut buf[offset..offset + CHILD_SIZE]);
                    offset += CHILD_SIZE;
                }
            }
            NodePage::Leaf(page) => {
                buf[0] = TAG_LEAF;
                (page.count() as u32).encode(&mut buf[1..5]);
                let mut offset = HEADER_SIZE;
                for key in &page.keys {
                    key.encode(&mut buf[offset..offset + K::SIZE]);
                    offset += K::SIZE;
                }
                for value in &page.values {
                    value.encode(&mut buf[offset..offset + V::SIZE]);
                    offset += V::SIZE;
                }
                page.next.raw().encode(&mut buf[offset..offset + CHILD_SIZE]);
            }
        }
    }
}

/// Derives (M, L): the maximum inner-page fan-out and leaf-page capacity
/// such that both page shapes fit in one block. The original hard-codes
/// these as template parameters; here they follow from `BLOCK_SIZE` and
/// the encoded sizes of `K`/`V`.
pub fn compute_fanout(key_size: usize, value_size: usize) -> (usize, usize) {
    let block_size = crate::consts::BLOCK_SIZE;
    // HEADER_SIZE + (m-1)*key_size + m*CHILD_SIZE <= block_size
    let max_m = (block_size - HEADER_SIZE + key_size) / (key_size + CHILD_SIZE);
    // HEADER_SIZE + l*(key_size + value_size) + CHILD_SIZE <= block_size
    let max_l = (block_size - HEADER_SIZE - CHILD_SIZE) / (key_size + value_size);
    (max_m.max(4), max_l.max(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_page_round_trips() {
        let mut page = InnerPage::<u32>::new();
        page.keys = vec![10, 20];
        page.children = vec![PageId::leaf(1), PageId::leaf(2), PageId::inner(3)];
        let wrapped: NodePage<u32, u64> = NodePage::Inner(page);
        let mut buf = vec![0u8; crate::consts::BLOCK_SIZE];
        wrapped.encode(&mut buf);
        let decoded: NodePage<u32, u64> = NodePage::decode(1, &buf);
        let inner = decoded.as_inner();
        assert_eq!(inner.keys, vec![10, 20]);
        assert_eq!(inner.children.len(), 3);
        assert!(inner.children[0].is_leaf());
        assert!(inner.children[2].is_inner());
    }

    #[test]
    fn leaf_page_round_trips() {
        let mut page = LeafPage::<u32, u64>::new();
        page.keys = vec![1, 2, 3];
        page.values = vec![100, 200, 300];
        page.next = PageId::leaf(5);
        let wrapped: NodePage<u32, u64> = NodePage::Leaf(page);
        let mut buf = vec![0u8; crate::consts::BLOCK_SIZE];
        wrapped.encode(&mut buf);
        let decoded: NodePage<u32, u64> = NodePage::decode(1, &buf);
        let leaf = decoded.as_leaf();
        assert_eq!(leaf.keys, vec![1, 2, 3]);
        assert_eq!(leaf.values, vec![100, 200, 300]);
        assert_eq!(leaf.next.block_index(), 5);
    }

    #[test]
    fn fanout_fits_in_one_block() {
        let (m, l) = compute_fanout(8, 8);
        let inner_size = HEADER_SIZE + (m - 1) * 8 + m * CHILD_SIZE;
        let leaf_size = HEADER_SIZE + l * (8 + 8) + CHILD_SIZE;
        assert!(inner_size <= crate::consts::BLOCK_SIZE);
        assert!(leaf_size <= crate::consts::BLOCK_SIZE);
    }
}
