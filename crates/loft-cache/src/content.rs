//! Deterministic location of a resource's cached file content.

use std::path::PathBuf;

use anyhow::Result;

use crate::context::CacheContext;
use crate::error::CacheError;
use crate::resource::Resource;

/// Derive the on-disk path for `resource`'s cached content.
///
/// Content is addressed by the remote identifier, not the local row
/// identity, so it survives local row recreation.
///
/// # Errors
///
/// Fails with `CacheError::MissingResourceId` when the resource was never
/// synced with the remote service.
pub fn content_path(context: &CacheContext, resource: &Resource) -> Result<PathBuf> {
    let resource_id = resource.resource_id.as_deref().ok_or_else(|| {
        CacheError::MissingResourceId {
            path: resource.path.clone(),
        }
    })?;
    Ok(context.cache_dir().join(resource_id))
}
