use super::*;

#[test]
fn open_creates_tables_and_indexes() -> Result<()> {
    let (_temp, store) = new_store()?;
    assert!(store.db_path().is_file(), "expected metadata.sqlite on disk");

    let conn = raw_connection(&store)?;
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    assert!(tables.contains(&"resource".to_string()));
    assert!(tables.contains(&"metadata".to_string()));

    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'index'")?;
    let indexes = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for index in ["resource_path", "resource_parent_path", "resource_resource_id"] {
        assert!(
            indexes.contains(&index.to_string()),
            "expected index {index} to exist"
        );
    }
    Ok(())
}

#[test]
fn reopening_preserves_existing_data() -> Result<()> {
    let temp = tempdir()?;
    let context = CacheContext::with_defaults(temp.path().join("cache"));
    let store = MetadataStore::open(&context)?;
    let inserted = store.insert(&sample_resource("/docs/a.txt", "/docs"))?;

    let reopened = MetadataStore::open(&context)?;
    assert_eq!(
        reopened.find_by_path("/docs/a.txt")?,
        Some(inserted),
        "idempotent setup must leave existing rows unchanged"
    );
    Ok(())
}

#[test]
fn incompatible_schema_version_is_rejected() -> Result<()> {
    let temp = tempdir()?;
    let context = CacheContext::with_defaults(temp.path().join("cache"));
    let store = MetadataStore::open(&context)?;

    let conn = raw_connection(&store)?;
    conn.pragma_update(None, "user_version", 9)?;
    drop(conn);

    let err = MetadataStore::open(&context).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<CacheError>(),
            Some(CacheError::SchemaVersion {
                expected: SCHEMA_VERSION,
                found: 9,
                ..
            })
        ),
        "expected SchemaVersion error, got {err:?}"
    );
    Ok(())
}
