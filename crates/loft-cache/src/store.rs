use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, warn};

use crate::context::CacheContext;
use crate::error::CacheError;
use crate::resource::{Resource, ResourceKind, ResourceState, ServiceMetadata};
use crate::timestamp_secs;

mod connection;
mod resources;
mod service;

const DB_FILENAME: &str = "metadata.sqlite";
const SCHEMA_VERSION: i64 = 1;

/// Handle to the persistent resource/service-metadata store.
///
/// The handle holds configuration only, never a live connection: every
/// operation opens a scoped connection, executes, and closes before
/// returning. Cross-process contention is serialized by SQLite itself,
/// bounded by the configured busy timeout.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl MetadataStore {
    /// Open the store inside the configured cache directory, creating the
    /// directory and the schema if absent. Setup is idempotent; reopening
    /// an existing store leaves its data untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created, the
    /// database cannot be opened, or its schema version is incompatible.
    pub fn open(context: &CacheContext) -> Result<Self> {
        fs::create_dir_all(context.cache_dir()).with_context(|| {
            format!(
                "failed to create cache directory {}",
                context.cache_dir().display()
            )
        })?;
        let store = Self {
            db_path: context.cache_dir().join(DB_FILENAME),
            busy_timeout: context.busy_timeout(),
        };
        store.with_connection(|conn| {
            Self::init_schema(conn)?;
            store.enforce_schema_version(conn)
        })?;
        Ok(store)
    }

    #[must_use]
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests;
