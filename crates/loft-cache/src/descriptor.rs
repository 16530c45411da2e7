//! Persistence of a resource's full remote descriptor document.
//!
//! The descriptor is an opaque serialized blob, one file per resource,
//! named by the resource's local numeric identity. The store never deletes
//! a blob on its own when the owning row goes away; that cleanup is the
//! filesystem-operation layer's duty, via [`DescriptorStore::remove`].

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::context::CacheContext;
use crate::error::CacheError;
use crate::resource::Resource;

const DESCRIPTOR_EXT: &str = "xml";

#[derive(Clone, Debug)]
pub struct DescriptorStore {
    cache_dir: PathBuf,
}

impl DescriptorStore {
    #[must_use]
    pub fn new(context: &CacheContext) -> Self {
        Self {
            cache_dir: context.cache_dir().to_path_buf(),
        }
    }

    /// Deterministic blob location for a resource identity.
    #[must_use]
    pub fn descriptor_path(&self, id: i64) -> PathBuf {
        self.cache_dir.join(format!("{id}.{DESCRIPTOR_EXT}"))
    }

    /// Write the descriptor for `resource`, overwriting any existing blob.
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path; a mid-write failure can leave partial content behind (the
    /// write is not atomic), which the next save overwrites.
    pub fn save(&self, resource: &Resource, descriptor: &[u8]) -> Result<()> {
        let path = self.descriptor_path(self.require_id(resource)?);
        let mut file = File::create(&path)
            .with_context(|| format!("failed to create descriptor blob {}", path.display()))?;
        file.write_all(descriptor)
            .with_context(|| format!("failed to write descriptor blob {}", path.display()))?;
        debug!(path = %path.display(), bytes = descriptor.len(), "descriptor save");
        Ok(())
    }

    /// Read the full descriptor for `resource`.
    pub fn load(&self, resource: &Resource) -> Result<Vec<u8>> {
        let path = self.descriptor_path(self.require_id(resource)?);
        if !path.exists() {
            return Err(CacheError::NotFound(format!(
                "descriptor blob for {}",
                resource.path
            ))
            .into());
        }
        fs::read(&path)
            .with_context(|| format!("failed to read descriptor blob {}", path.display()))
    }

    /// Delete the descriptor for `resource`, tolerating its absence.
    pub fn remove(&self, resource: &Resource) -> Result<()> {
        let path = self.descriptor_path(self.require_id(resource)?);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "descriptor remove");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove descriptor blob {}", path.display())),
        }
    }

    fn require_id(&self, resource: &Resource) -> Result<i64> {
        resource.id.ok_or_else(|| {
            CacheError::MissingId {
                path: resource.path.clone(),
            }
            .into()
        })
    }
}
