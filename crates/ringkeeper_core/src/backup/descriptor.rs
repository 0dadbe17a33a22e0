//! In-memory identity of one backup artifact.

use super::algorithm::{CompressionType, EncryptionAlgorithm};
use super::file_type::BackupFileType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Identity of one backup artifact, local or remote.
///
/// Built by [`super::PathCodec::classify_local`] or
/// [`super::PathCodec::parse_remote_key`]; only the timestamp and algorithm
/// choices can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFileDescriptor {
    pub(crate) base_directory: String,
    pub(crate) cluster_name: String,
    pub(crate) region: Option<String>,
    pub(crate) token: String,
    pub(crate) file_type: BackupFileType,
    pub(crate) keyspace: Option<String>,
    pub(crate) column_family: Option<String>,
    pub(crate) secondary_index_name: Option<String>,
    pub(crate) file_name: String,
    pub(crate) time: DateTime<Utc>,
    pub(crate) last_modified: DateTime<Utc>,
    pub(crate) compression: CompressionType,
    pub(crate) encryption: EncryptionAlgorithm,
    pub(crate) size: u64,
    pub(crate) local_path: Option<PathBuf>,
}

impl BackupFileDescriptor {
    /// Backup root the artifact is stored under.
    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Region of the producing node. V1 keys carry it; V2 keys do not, so
    /// descriptors parsed from V2 keys report `None`.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Token of the node that produced the artifact.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn file_type(&self) -> BackupFileType {
        self.file_type
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn column_family(&self) -> Option<&str> {
        self.column_family.as_deref()
    }

    /// Dotted index directory, e.g. `.users_email_idx`.
    pub fn secondary_index_name(&self) -> Option<&str> {
        self.secondary_index_name.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Grouping time of legacy keys (snapshot tag, manifest stamp, or mtime).
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Override the modification time, e.g. when staging for upload.
    pub fn set_last_modified(&mut self, last_modified: DateTime<Utc>) {
        self.last_modified = last_modified;
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn set_compression(&mut self, compression: CompressionType) {
        self.compression = compression;
    }

    pub fn encryption(&self) -> EncryptionAlgorithm {
        self.encryption
    }

    pub fn set_encryption(&mut self, encryption: EncryptionAlgorithm) {
        self.encryption = encryption;
    }

    /// Size in bytes at classification time; zero for remote descriptors.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Local file the descriptor was classified from.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }
}
