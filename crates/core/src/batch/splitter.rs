//! Order-preserving chunking

use std::collections::HashSet;
use std::hash::Hash;

/// A bounded slice of the input, tagged with its zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    /// Zero-based position among all chunks.
    pub index: usize,
    /// Items in input order.
    pub items: Vec<T>,
}

impl<T> Chunk<T> {
    /// Number of items in the chunk.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True for a chunk with no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of chunks [`split`] produces for `len` items.
pub fn chunk_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}

/// Split `items` into chunks of at most `batch_size` items.
///
/// Every chunk but the last holds exactly `batch_size` items and
/// concatenating the chunks in index order gives back `items`. A
/// `batch_size` of zero is treated as one.
pub fn split<T>(items: Vec<T>, batch_size: usize) -> Vec<Chunk<T>> {
    let batch_size = batch_size.max(1);
    let mut chunks = Vec::with_capacity(chunk_count(items.len(), batch_size));
    let mut remaining = items.into_iter();

    loop {
        let items: Vec<T> = remaining.by_ref().take(batch_size).collect();
        if items.is_empty() {
            break;
        }
        chunks.push(Chunk { index: chunks.len(), items });
    }

    chunks
}

/// Drop repeated items, keeping each at its first position.
pub fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
