//! Scoped connection acquisition, transaction bracket, and schema setup.

use super::*;

impl MetadataStore {
    fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).with_context(|| {
            format!("failed to open metadata db at {}", self.db_path.display())
        })?;
        conn.busy_timeout(self.busy_timeout)
            .context("failed to set busy timeout for metadata db")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("failed to enable WAL for metadata db")?;
        Ok(conn)
    }

    /// Run `f` on a fresh connection, closing it on every exit path.
    ///
    /// A failure to close is logged and swallowed; the caller cannot
    /// usefully react to it, and `f`'s own error must win.
    pub(super) fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.connection()?;
        let result = f(&mut conn);
        if let Err((_conn, err)) = conn.close() {
            warn!(
                db = %self.db_path.display(),
                %err,
                "failed to close metadata db connection"
            );
        }
        result
    }

    /// Run `f` inside one immediate transaction on a fresh connection.
    ///
    /// Commits only when `f` succeeds; on any failure the transaction
    /// guard rolls back before the error propagates, so no partial writes
    /// become visible to subsequent reads.
    pub(super) fn with_tx<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T>,
    {
        self.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .context("failed to start metadata transaction")?;
            let result = f(&tx)?;
            tx.commit()
                .context("failed to commit metadata transaction")?;
            Ok(result)
        })
    }

    pub(super) fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS resource (
                id INTEGER PRIMARY KEY,
                resource_id TEXT,
                kind TEXT NOT NULL,
                md5_checksum TEXT,
                size INTEGER,
                last_viewed INTEGER,
                last_modified INTEGER,
                parent_path TEXT NOT NULL,
                path TEXT NOT NULL,
                state TEXT NOT NULL,
                changestamp INTEGER NOT NULL,
                last_update INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS resource_path ON resource(path);
            CREATE INDEX IF NOT EXISTS resource_parent_path ON resource(parent_path);
            CREATE INDEX IF NOT EXISTS resource_resource_id ON resource(resource_id);
            CREATE TABLE IF NOT EXISTS metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                largest_changestamp INTEGER NOT NULL,
                remaining_changestamps INTEGER NOT NULL,
                quota_bytes_total INTEGER NOT NULL,
                quota_bytes_used INTEGER NOT NULL,
                last_update INTEGER NOT NULL
            );
            "#,
        )
        .context("failed to initialize metadata db schema")?;
        Ok(())
    }

    /// Stamp the schema version on first setup; refuse to operate on a
    /// store written by an incompatible layout.
    pub(super) fn enforce_schema_version(&self, conn: &Connection) -> Result<()> {
        let found: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .context("failed to read metadata db schema version")?;
        if found == 0 {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .context("failed to stamp metadata db schema version")?;
            return Ok(());
        }
        if found != SCHEMA_VERSION {
            return Err(CacheError::SchemaVersion {
                path: self.db_path.clone(),
                expected: SCHEMA_VERSION,
                found,
            }
            .into());
        }
        Ok(())
    }
}
