//! The singleton service-metadata row: global change counter plus quota.

use super::*;

impl MetadataStore {
    /// Upsert the single metadata row (fixed key 1), stamping
    /// `last_update` with the current wall clock. Returns the stamped copy.
    pub fn save_metadata(&self, metadata: &ServiceMetadata) -> Result<ServiceMetadata> {
        let mut stamped = *metadata;
        stamped.last_update = timestamp_secs();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO metadata(id, largest_changestamp, remaining_changestamps, \
                 quota_bytes_total, quota_bytes_used, last_update) \
                 VALUES (1, ?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(id) DO UPDATE SET \
                 largest_changestamp = excluded.largest_changestamp, \
                 remaining_changestamps = excluded.remaining_changestamps, \
                 quota_bytes_total = excluded.quota_bytes_total, \
                 quota_bytes_used = excluded.quota_bytes_used, \
                 last_update = excluded.last_update",
                params![
                    stamped.largest_changestamp,
                    stamped.remaining_changestamps,
                    stamped.quota_bytes_total,
                    stamped.quota_bytes_used,
                    stamped.last_update,
                ],
            )
            .context("failed to save service metadata")?;
            Ok(())
        })?;
        debug!(
            largest_changestamp = stamped.largest_changestamp,
            "service metadata save"
        );
        Ok(stamped)
    }

    /// Load the metadata row, or `None` if it was never saved.
    pub fn load_metadata(&self) -> Result<Option<ServiceMetadata>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT largest_changestamp, remaining_changestamps, quota_bytes_total, \
                 quota_bytes_used, last_update FROM metadata WHERE id = 1",
                [],
                |row| {
                    Ok(ServiceMetadata {
                        largest_changestamp: row.get(0)?,
                        remaining_changestamps: row.get(1)?,
                        quota_bytes_total: row.get(2)?,
                        quota_bytes_used: row.get(3)?,
                        last_update: row.get(4)?,
                    })
                },
            )
            .optional()
            .context("failed to load service metadata")
        })
    }
}
