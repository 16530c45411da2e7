//! CRUD and query operations over resource records.

use super::*;

const RESOURCE_COLUMNS: &str = "id, resource_id, kind, md5_checksum, size, last_viewed, \
     last_modified, parent_path, path, state, changestamp, last_update";

/// Raw row image; enum columns are decoded after the statement completes so
/// corruption surfaces as a `CacheError`, not a SQLite mapping error.
struct ResourceRow {
    id: i64,
    resource_id: Option<String>,
    kind: String,
    md5_checksum: Option<String>,
    size: Option<i64>,
    last_viewed: Option<i64>,
    last_modified: Option<i64>,
    parent_path: String,
    path: String,
    state: String,
    changestamp: i64,
    last_update: i64,
}

impl ResourceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            resource_id: row.get(1)?,
            kind: row.get(2)?,
            md5_checksum: row.get(3)?,
            size: row.get(4)?,
            last_viewed: row.get(5)?,
            last_modified: row.get(6)?,
            parent_path: row.get(7)?,
            path: row.get(8)?,
            state: row.get(9)?,
            changestamp: row.get(10)?,
            last_update: row.get(11)?,
        })
    }

    fn into_resource(self) -> Result<Resource> {
        let kind = ResourceKind::try_from(self.kind.as_str())?;
        let state = ResourceState::try_from(self.state.as_str())?;
        Ok(Resource {
            id: Some(self.id),
            resource_id: self.resource_id,
            kind,
            md5_checksum: self.md5_checksum,
            size: self.size,
            last_viewed: self.last_viewed,
            last_modified: self.last_modified,
            parent_path: self.parent_path,
            path: self.path,
            state,
            changestamp: self.changestamp,
            last_update: self.last_update,
        })
    }
}

impl MetadataStore {
    /// Insert a new record, returning a copy carrying the store-assigned
    /// identity. The input must not already carry one; identity is assigned
    /// exactly once, at first insert.
    pub fn insert(&self, resource: &Resource) -> Result<Resource> {
        let inserted =
            self.with_connection(|conn| Self::insert_with_conn(conn, resource, timestamp_secs()))?;
        debug!(path = %inserted.path, id = inserted.id, "resource insert");
        Ok(inserted)
    }

    fn insert_with_conn(conn: &Connection, resource: &Resource, now: i64) -> Result<Resource> {
        if let Some(id) = resource.id {
            return Err(CacheError::IdentityAssigned {
                path: resource.path.clone(),
                id,
            }
            .into());
        }
        conn.execute(
            "INSERT INTO resource(resource_id, kind, md5_checksum, size, last_viewed, \
             last_modified, parent_path, path, state, changestamp, last_update) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                resource.resource_id,
                resource.kind.as_str(),
                resource.md5_checksum,
                resource.size,
                resource.last_viewed,
                resource.last_modified,
                resource.parent_path,
                resource.path,
                resource.state.as_str(),
                resource.changestamp,
                now,
            ],
        )
        .with_context(|| format!("failed to insert resource at {}", resource.path))?;
        let mut inserted = resource.clone();
        inserted.id = Some(conn.last_insert_rowid());
        inserted.last_update = now;
        Ok(inserted)
    }

    /// Rewrite all mutable columns of the row matching `resource.id`.
    ///
    /// Fails with `CacheError::NotFound` when no row matches; callers that
    /// race deletes against updates must be prepared for that.
    pub fn update(&self, resource: &Resource) -> Result<()> {
        let id = resource.id.ok_or_else(|| CacheError::MissingId {
            path: resource.path.clone(),
        })?;
        self.with_connection(|conn| {
            let affected = conn
                .execute(
                    "UPDATE resource SET resource_id = ?1, kind = ?2, md5_checksum = ?3, \
                     size = ?4, last_viewed = ?5, last_modified = ?6, parent_path = ?7, \
                     path = ?8, state = ?9, changestamp = ?10, last_update = ?11 \
                     WHERE id = ?12",
                    params![
                        resource.resource_id,
                        resource.kind.as_str(),
                        resource.md5_checksum,
                        resource.size,
                        resource.last_viewed,
                        resource.last_modified,
                        resource.parent_path,
                        resource.path,
                        resource.state.as_str(),
                        resource.changestamp,
                        timestamp_secs(),
                        id,
                    ],
                )
                .with_context(|| format!("failed to update resource at {}", resource.path))?;
            if affected == 0 {
                return Err(CacheError::NotFound(format!("resource with id {id}")).into());
            }
            Ok(())
        })?;
        debug!(path = %resource.path, id, "resource update");
        Ok(())
    }

    /// Remove the row matching `resource.id`. Removing an already-absent
    /// row is not an error.
    pub fn delete(&self, resource: &Resource) -> Result<()> {
        let id = resource.id.ok_or_else(|| CacheError::MissingId {
            path: resource.path.clone(),
        })?;
        self.with_connection(|conn| {
            conn.execute("DELETE FROM resource WHERE id = ?1", params![id])
                .with_context(|| format!("failed to delete resource at {}", resource.path))?;
            Ok(())
        })?;
        debug!(path = %resource.path, id, "resource delete");
        Ok(())
    }

    /// Remove every row filed directly under `parent_path`.
    pub fn delete_children(&self, parent_path: &str) -> Result<()> {
        let removed = self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM resource WHERE parent_path = ?1",
                params![parent_path],
            )
            .with_context(|| format!("failed to delete children of {parent_path}"))
        })?;
        debug!(parent_path, removed, "resource delete-children");
        Ok(())
    }

    /// Atomically swap the listing under `parent_path`: within one
    /// transaction, delete every existing row there, then insert each of
    /// `resources` with a fresh identity. Either all new rows become
    /// visible or none do.
    ///
    /// Returns the inserted records, in input order, with ids populated.
    pub fn replace_children(
        &self,
        resources: &[Resource],
        parent_path: &str,
    ) -> Result<Vec<Resource>> {
        let inserted = self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM resource WHERE parent_path = ?1",
                params![parent_path],
            )
            .with_context(|| format!("failed to clear children of {parent_path}"))?;
            let now = timestamp_secs();
            let mut inserted = Vec::with_capacity(resources.len());
            for resource in resources {
                inserted.push(Self::insert_with_conn(tx, resource, now)?);
            }
            Ok(inserted)
        })?;
        debug!(parent_path, count = inserted.len(), "resource replace-children");
        Ok(inserted)
    }

    /// Look up the row exactly matching `path`.
    pub fn find_by_path(&self, path: &str) -> Result<Option<Resource>> {
        self.with_connection(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {RESOURCE_COLUMNS} FROM resource WHERE path = ?1"),
                    params![path],
                    ResourceRow::from_row,
                )
                .optional()
                .with_context(|| format!("failed to look up resource at {path}"))?;
            row.map(ResourceRow::into_resource).transpose()
        })
    }

    /// All rows filed directly under `parent_path`, excluding records whose
    /// remote entry no longer exists. Row order is unspecified.
    pub fn list_children(&self, parent_path: &str) -> Result<Vec<Resource>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESOURCE_COLUMNS} FROM resource WHERE parent_path = ?1 AND state <> ?2"
            ))?;
            let rows = stmt.query_map(
                params![parent_path, ResourceState::NotFound.as_str()],
                ResourceRow::from_row,
            )?;
            let mut children = Vec::new();
            for row in rows {
                children.push(row?.into_resource()?);
            }
            Ok(children)
        })
    }

    /// Total number of known resource records, including `NotFound` ones.
    pub fn resource_count(&self) -> Result<u64> {
        self.with_connection(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM resource", [], |row| row.get(0))
                .context("failed to count resource records")?;
            Ok(count as u64)
        })
    }
}
