use super::*;
use tempfile::tempdir;

mod schema;

fn new_store() -> Result<(tempfile::TempDir, MetadataStore)> {
    let temp = tempdir()?;
    let context = CacheContext::with_defaults(temp.path().join("cache"));
    let store = MetadataStore::open(&context)?;
    Ok((temp, store))
}

fn raw_connection(store: &MetadataStore) -> Result<Connection> {
    Connection::open(store.db_path()).context("failed to open raw test connection")
}

fn sample_resource(path: &str, parent_path: &str) -> Resource {
    Resource {
        id: None,
        resource_id: Some(format!("file:{}", path.trim_start_matches('/'))),
        kind: ResourceKind::File,
        md5_checksum: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
        size: Some(42),
        last_viewed: Some(1_700_000_000),
        last_modified: Some(1_700_000_100),
        parent_path: parent_path.to_string(),
        path: path.to_string(),
        state: ResourceState::ToDownload,
        changestamp: 5,
        last_update: 0,
    }
}

fn sample_metadata() -> ServiceMetadata {
    ServiceMetadata {
        largest_changestamp: 654_321,
        remaining_changestamps: 3,
        quota_bytes_total: 9_876_543_210,
        quota_bytes_used: 19_857,
        last_update: 0,
    }
}
