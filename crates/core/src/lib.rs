//! # edgebulk Core
//!
//! The bulk-operation engine - no HTTP, no configuration files.
//!
//! This crate contains:
//! - Chunking, bounded-parallelism execution and zone fan-out ([`batch`])
//! - Zone resolution and hostname-to-zone matching ([`zones`])
//! - The cursor pagination driver ([`pagination`])
//! - Port traits for the transport and the zone listing ([`ports`])
//!
//! ## Architecture Principles
//! - Only depends on `edgebulk-common` and `edgebulk-domain`
//! - All remote access via traits
//! - Configuration passed explicitly to each engine

pub mod batch;
pub mod pagination;
pub mod ports;
pub mod zones;

// Re-export specific items to avoid ambiguity
pub use batch::{chunk_count, dedup_preserving_order, split, BatchExecutor, Chunk, ZoneFanOut};
pub use pagination::{collect_all, PaginationError, Paginator};
pub use ports::{HttpMethod, Transport, ZoneDirectory};
pub use zones::{HostMatchReport, HostZoneMatcher, ZoneError, ZoneIndex, ZoneResolver};
