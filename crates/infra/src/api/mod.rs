//! API-backed services
//!
//! Everything here talks to the remote API through a
//! [`Transport`](edgebulk_core::Transport) and runs bulk work through the
//! engine in `edgebulk-core`.

pub mod envelope;
pub mod kv;
pub mod purge;
pub mod zones;

pub use envelope::{ApiEnvelope, ApiMessage, ResultInfo};
pub use kv::{KvKey, KvService, PrefixDeletion};
pub use purge::{HostPurgeOutcome, PurgeKind, PurgeService};
pub use zones::ApiZoneDirectory;
