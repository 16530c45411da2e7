#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Local, persistent metadata-and-content cache backing a filesystem client
//! that mirrors a remote hierarchical storage service.
//!
//! The cache answers "what do I know about path P" without a network round
//! trip, tracks which entries are stale relative to the remote change
//! sequence, and atomically replaces a directory's children when a remote
//! listing refreshes. It performs no network I/O of its own and never
//! decides *when* to refresh; both are the embedding client's job.

mod content;
mod context;
mod descriptor;
mod error;
mod resource;
mod store;

pub use content::content_path;
pub use context::{
    resolve_default_cache_dir, CacheContext, DEFAULT_BUSY_TIMEOUT, DEFAULT_METADATA_TTL,
};
pub use descriptor::DescriptorStore;
pub use error::CacheError;
pub use resource::{Resource, ResourceKind, ResourceState, ServiceMetadata};
pub use store::MetadataStore;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn timestamp_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
