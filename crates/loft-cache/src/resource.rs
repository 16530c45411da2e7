use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::timestamp_secs;

/// Sync state of a cached resource record.
///
/// The store persists whatever value it is given; transitions between
/// states are the filesystem-operation layer's responsibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceState {
    /// Local record matches the remote as of its changestamp.
    InSync,
    /// Remote content is newer or uncached locally; a fetch is pending.
    ToDownload,
    /// Locally marked for removal, pending propagation to the remote.
    ToDelete,
    /// Local and remote diverged; requires external resolution.
    Conflict,
    /// Remote entry no longer exists; excluded from directory listings.
    NotFound,
}

impl ResourceState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InSync => "in-sync",
            Self::ToDownload => "to-download",
            Self::ToDelete => "to-delete",
            Self::Conflict => "conflict",
            Self::NotFound => "not-found",
        }
    }
}

impl TryFrom<&str> for ResourceState {
    type Error = CacheError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "in-sync" => Ok(Self::InSync),
            "to-download" => Ok(Self::ToDownload),
            "to-delete" => Ok(Self::ToDelete),
            "conflict" => Ok(Self::Conflict),
            "not-found" => Ok(Self::NotFound),
            other => Err(CacheError::InvalidState(other.to_string())),
        }
    }
}

/// Remote entry kind. Only folder-ness is ever consulted by the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    File,
    Folder,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl TryFrom<&str> for ResourceKind {
    type Error = CacheError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            other => Err(CacheError::UnknownKind(other.to_string())),
        }
    }
}

/// The cache's record of one remote file or folder: local hierarchy
/// placement plus a snapshot of the remote metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Local numeric identity, assigned by the store at first insert and
    /// stable for the life of the row. `None` until inserted.
    pub id: Option<i64>,
    /// Remote identifier; absent for entries not yet created remotely.
    pub resource_id: Option<String>,
    pub kind: ResourceKind,
    pub md5_checksum: Option<String>,
    pub size: Option<i64>,
    pub last_viewed: Option<i64>,
    pub last_modified: Option<i64>,
    pub parent_path: String,
    pub path: String,
    pub state: ResourceState,
    /// Global change counter value as of which this record is known correct.
    pub changestamp: i64,
    /// Unix seconds of the last write to this row; stamped by the store.
    pub last_update: i64,
}

impl Resource {
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == ResourceKind::Folder
    }

    /// A record is valid (not stale) iff its changestamp has caught up with
    /// the largest changestamp observed from the remote service.
    #[must_use]
    pub fn is_valid(&self, largest_changestamp: i64) -> bool {
        self.changestamp >= largest_changestamp
    }
}

/// The singleton service-metadata snapshot: global change counter plus the
/// remote account quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub largest_changestamp: i64,
    pub remaining_changestamps: i64,
    pub quota_bytes_total: i64,
    pub quota_bytes_used: i64,
    /// Unix seconds of the last refresh; stamped by the store on save.
    pub last_update: i64,
}

impl ServiceMetadata {
    /// Freshness is time-based: valid iff `now - last_update <= ttl`.
    #[must_use]
    pub fn is_valid_at(&self, ttl: Duration, now: i64) -> bool {
        now.saturating_sub(self.last_update) <= ttl.as_secs() as i64
    }

    /// Freshness against the wall clock.
    #[must_use]
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.is_valid_at(ttl, timestamp_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const ALL_STATES: [ResourceState; 5] = [
        ResourceState::InSync,
        ResourceState::ToDownload,
        ResourceState::ToDelete,
        ResourceState::Conflict,
        ResourceState::NotFound,
    ];

    fn sample(changestamp: i64) -> Resource {
        Resource {
            id: None,
            resource_id: Some("file:abc".to_string()),
            kind: ResourceKind::File,
            md5_checksum: None,
            size: None,
            last_viewed: None,
            last_modified: None,
            parent_path: "/docs".to_string(),
            path: "/docs/a.txt".to_string(),
            state: ResourceState::InSync,
            changestamp,
            last_update: 0,
        }
    }

    #[test]
    fn state_strings_round_trip() -> Result<()> {
        for state in ALL_STATES {
            assert_eq!(ResourceState::try_from(state.as_str())?, state);
        }
        Ok(())
    }

    #[test]
    fn unknown_state_string_is_fatal() {
        let err = ResourceState::try_from("downloaded").unwrap_err();
        assert_eq!(err, CacheError::InvalidState("downloaded".to_string()));
    }

    #[test]
    fn kind_strings_round_trip() -> Result<()> {
        for kind in [ResourceKind::File, ResourceKind::Folder] {
            assert_eq!(ResourceKind::try_from(kind.as_str())?, kind);
        }
        let err = ResourceKind::try_from("directory").unwrap_err();
        assert_eq!(err, CacheError::UnknownKind("directory".to_string()));
        Ok(())
    }

    #[test]
    fn folder_check_follows_kind() {
        let mut resource = sample(0);
        assert!(!resource.is_folder());
        resource.kind = ResourceKind::Folder;
        assert!(resource.is_folder());
    }

    #[test]
    fn staleness_boundary_is_inclusive() {
        let resource = sample(5);
        assert!(resource.is_valid(5), "equal changestamp is still valid");
        assert!(resource.is_valid(4));
        assert!(!resource.is_valid(6), "trailing changestamp is stale");
    }

    #[test]
    fn freshness_boundary_is_inclusive() {
        let metadata = ServiceMetadata {
            largest_changestamp: 10,
            remaining_changestamps: 0,
            quota_bytes_total: 1024,
            quota_bytes_used: 512,
            last_update: 1_000,
        };
        let ttl = Duration::from_secs(60);
        assert!(metadata.is_valid_at(ttl, 1_060), "exactly ttl is fresh");
        assert!(!metadata.is_valid_at(ttl, 1_061), "ttl + 1 is stale");
        assert!(
            metadata.is_valid_at(ttl, 999),
            "clock skew before last_update stays fresh"
        );
    }
}
