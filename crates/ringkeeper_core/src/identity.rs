//! Capabilities the path codec consumes from its collaborators.
//!
//! Both are passed in explicitly so that codec behavior is a function of its
//! arguments and can be exercised with fakes.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::Path;

/// Identity of the local node as it appears in remote backup keys.
pub trait ClusterIdentity {
    /// First segment of every remote key (bucket-relative backup root).
    fn backup_root(&self) -> &str;
    /// Cluster (application) name.
    fn cluster_name(&self) -> &str;
    /// Region (data center) the node runs in.
    fn region(&self) -> &str;
    /// Ring token of the node; disambiguates nodes within a cluster prefix.
    fn node_token(&self) -> &str;
}

/// Fixed identity values, typically resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    pub backup_root: String,
    pub cluster_name: String,
    pub region: String,
    pub node_token: String,
}

impl ClusterIdentity for StaticIdentity {
    fn backup_root(&self) -> &str {
        &self.backup_root
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn node_token(&self) -> &str {
        &self.node_token
    }
}

/// Result of a single metadata read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub exists: bool,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl FileStat {
    /// Metadata reported for a path that does not exist.
    pub fn missing() -> Self {
        Self {
            exists: false,
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            size: 0,
        }
    }
}

/// Source of filesystem metadata for local backup artifacts.
pub trait FileMetadataSource {
    /// Read metadata for `path`. Absent files yield [`FileStat::missing`].
    fn stat(&self, path: &Path) -> FileStat;
}

/// Reads metadata from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl FileMetadataSource for LocalFilesystem {
    fn stat(&self, path: &Path) -> FileStat {
        match std::fs::metadata(path) {
            Ok(metadata) => FileStat {
                exists: true,
                last_modified: metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                size: metadata.len(),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => FileStat::missing(),
            Err(err) => {
                tracing::warn!("Failed to read metadata for {}: {}", path.display(), err);
                FileStat::missing()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reports_epoch() {
        let dir = TempDir::new().expect("temp dir");
        let stat = LocalFilesystem.stat(&dir.path().join("absent.db"));
        assert_eq!(stat, FileStat::missing());
        assert_eq!(stat.last_modified.timestamp_millis(), 0);
    }

    #[test]
    fn existing_file_reports_size_and_mtime() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("mc-1-Data.db");
        std::fs::write(&path, b"sstable").expect("write file");

        let stat = LocalFilesystem.stat(&path);
        assert!(stat.exists);
        assert_eq!(stat.size, 7);
        assert!(stat.last_modified.timestamp() > 0);
    }
}
