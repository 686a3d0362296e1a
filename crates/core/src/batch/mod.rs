//! Chunked bulk execution
//!
//! - [`splitter`]: order-preserving chunking and de-duplication
//! - [`executor`]: bounded-parallelism execution of one item set
//! - [`fanout`]: one executor per zone under a second, zone-level bound

pub mod executor;
pub mod fanout;
pub mod splitter;

pub use executor::BatchExecutor;
pub use fanout::ZoneFanOut;
pub use splitter::{chunk_count, dedup_preserving_order, split, Chunk};
