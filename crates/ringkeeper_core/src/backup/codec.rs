//! Bidirectional mapping between local backup files and remote object keys.
//!
//! V2 keys:
//! `<root>/<hash>_<cluster>/<token>/<TYPE>/<epochMillis>[/<ks>/<cf>[/<index>]]/<COMPRESSION>/<ENCRYPTION>/<file>`
//!
//! V1 keys:
//! `<root>/<region>/<cluster>/<token>/<yyyyMMddHHmm>/<TYPE>[/<ks>/<cf>]/<file>`
//!
//! The V2 timestamp is always a whole second expressed in milliseconds, and
//! `<hash>` spreads key prefixes of many clusters sharing one bucket.

use super::algorithm::{CompressionType, EncryptionAlgorithm};
use super::descriptor::BackupFileDescriptor;
use super::file_type::{BackupFileType, BackupFolder};
use super::time_util::{
    format_minute_stamp, parse_minute_stamp, truncate_to_second, whole_second_millis,
};
use crate::config::Config;
use crate::constants::{
    CLUSTER_HASH_MODULUS, META_V2_PREFIX, META_V2_SUFFIX, REMOTE_KEY_DELIMITER,
};
use crate::error::PlacementError;
use crate::identity::{ClusterIdentity, FileMetadataSource, LocalFilesystem};
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};

/// Segments shared by every V2 key: root, cluster, token, type, time,
/// compression, encryption, file.
const V2_BASE_SEGMENTS: usize = 8;
/// Segments shared by every V1 key: root, region, cluster, token, time, type, file.
const V1_BASE_SEGMENTS: usize = 7;

/// 31-multiplier hash over UTF-16 code units with wrapping `i32` arithmetic.
///
/// Existing remote keys embed this value, so it must not change.
pub fn legacy_string_hash(value: &str) -> i32 {
    value.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// Cluster segment of V2 keys, `<hash % 10000>_<cluster>`.
pub fn hashed_cluster_name(cluster_name: &str) -> String {
    format!(
        "{}_{}",
        legacy_string_hash(cluster_name) % CLUSTER_HASH_MODULUS,
        cluster_name
    )
}

/// Reverse of [`hashed_cluster_name`], verifying the embedded hash.
pub fn strip_cluster_hash(segment: &str) -> Result<&str, String> {
    let (hash, cluster_name) = segment
        .split_once('_')
        .ok_or_else(|| format!("cluster segment '{}' has no hash prefix", segment))?;
    let hash: i32 = hash
        .parse()
        .map_err(|_| format!("cluster segment '{}' has a non-numeric hash", segment))?;
    if hash != legacy_string_hash(cluster_name) % CLUSTER_HASH_MODULUS {
        return Err(format!(
            "cluster segment '{}' hash does not match '{}'",
            segment, cluster_name
        ));
    }
    Ok(cluster_name)
}

/// Time embedded in a V2 manifest name (`meta_v2_<yyyyMMddHHmm>.json`).
pub fn manifest_time(file_name: &str) -> Option<DateTime<Utc>> {
    file_name
        .strip_prefix(META_V2_PREFIX)?
        .strip_suffix(META_V2_SUFFIX)
        .and_then(parse_minute_stamp)
}

/// Check that an identity value fits in exactly one key segment.
fn key_segment(name: &str, value: &str) -> Result<(), PlacementError> {
    if value.is_empty() || value.contains(REMOTE_KEY_DELIMITER) {
        return Err(PlacementError::InvalidArgument(format!(
            "{} '{}' must be a non-empty key segment without '{}'",
            name, value, REMOTE_KEY_DELIMITER
        )));
    }
    Ok(())
}

/// Location of a data file relative to the data directory.
struct DataLayout<'a> {
    keyspace: &'a str,
    column_family: &'a str,
    snapshot_tag: Option<&'a str>,
    index_dir: Option<&'a str>,
}

/// Classifies local backup files and converts descriptors to and from remote
/// keys for one node.
#[derive(Debug, Clone)]
pub struct PathCodec<I, F = LocalFilesystem> {
    identity: I,
    fs: F,
    data_dir: PathBuf,
    compression: CompressionType,
    encryption: EncryptionAlgorithm,
}

impl PathCodec<Config, LocalFilesystem> {
    /// Codec reading identity, data directory and algorithms from `config`.
    ///
    /// # Errors
    /// Same as [`PathCodec::new`].
    pub fn from_config(config: Config) -> Result<Self, PlacementError> {
        let data_dir = config.data_dir.clone();
        let (compression, encryption) = (config.compression, config.encryption);
        Ok(Self::new(config, LocalFilesystem, data_dir)?.with_algorithms(compression, encryption))
    }
}

impl<I, F> PathCodec<I, F>
where
    I: ClusterIdentity,
    F: FileMetadataSource,
{
    /// Create a codec using the default V2 algorithms.
    ///
    /// # Arguments
    /// - `identity`: Node identity written into every remote key.
    /// - `fs`: Metadata source consulted by [`PathCodec::classify_local`].
    /// - `data_dir`: Root of the local keyspace directories.
    ///
    /// # Returns
    /// A codec whose keys parse back into the identity they were built from.
    ///
    /// # Errors
    /// `InvalidArgument` when an identity value is empty or contains the key
    /// delimiter, since it would not survive a round trip through a key.
    pub fn new(identity: I, fs: F, data_dir: impl Into<PathBuf>) -> Result<Self, PlacementError> {
        key_segment("backup root", identity.backup_root())?;
        key_segment("cluster name", identity.cluster_name())?;
        key_segment("region", identity.region())?;
        key_segment("node token", identity.node_token())?;
        Ok(Self {
            identity,
            fs,
            data_dir: data_dir.into(),
            compression: CompressionType::default(),
            encryption: EncryptionAlgorithm::default(),
        })
    }

    /// Algorithms attached to newly classified V2 artifacts.
    pub fn with_algorithms(
        mut self,
        compression: CompressionType,
        encryption: EncryptionAlgorithm,
    ) -> Self {
        self.compression = compression;
        self.encryption = encryption;
        self
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Build a descriptor for the local file at `path`.
    ///
    /// Data files are located relative to the data directory; manifests only
    /// need a file name. A missing file is not an error and yields an epoch
    /// modification time.
    ///
    /// # Arguments
    /// - `path`: Local artifact, under the data directory for data file types.
    /// - `file_type`: Layout rule the path must follow.
    ///
    /// # Returns
    /// A descriptor carrying this node's identity and the file's metadata.
    ///
    /// # Errors
    /// `InvalidPath` when the path does not match the layout of `file_type`.
    pub fn classify_local(
        &self,
        path: &Path,
        file_type: BackupFileType,
    ) -> Result<BackupFileDescriptor, PlacementError> {
        let display = path.display().to_string();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PlacementError::invalid_path(&display, "missing UTF-8 file name"))?
            .to_string();
        let stat = self.fs.stat(path);

        let mut keyspace = None;
        let mut column_family = None;
        let mut secondary_index_name = None;
        let mut time = stat.last_modified;
        match file_type {
            BackupFileType::Meta => {}
            BackupFileType::MetaV2 => {
                time = manifest_time(&file_name).ok_or_else(|| {
                    PlacementError::invalid_path(
                        &display,
                        format!(
                            "manifest name must look like {}<yyyyMMddHHmm>{}",
                            META_V2_PREFIX, META_V2_SUFFIX
                        ),
                    )
                })?;
            }
            BackupFileType::Sst
            | BackupFileType::Snap
            | BackupFileType::SstV2
            | BackupFileType::SecondaryIndexV2 => {
                let layout = self.split_data_path(path, &display, file_type)?;
                if file_type == BackupFileType::Snap {
                    let tag = layout.snapshot_tag.unwrap_or_default();
                    time = parse_minute_stamp(tag).ok_or_else(|| {
                        PlacementError::invalid_path(
                            &display,
                            format!("snapshot tag '{}' is not yyyyMMddHHmm", tag),
                        )
                    })?;
                }
                keyspace = Some(layout.keyspace.to_string());
                column_family = Some(layout.column_family.to_string());
                secondary_index_name = layout.index_dir.map(str::to_string);
            }
        }

        let (compression, encryption) = if file_type.is_v2() {
            (self.compression, self.encryption)
        } else {
            (CompressionType::Snappy, EncryptionAlgorithm::Plaintext)
        };

        tracing::debug!(
            "Classified {} as {} (exists: {})",
            path.display(),
            file_type,
            stat.exists
        );
        Ok(BackupFileDescriptor {
            base_directory: self.identity.backup_root().to_string(),
            cluster_name: self.identity.cluster_name().to_string(),
            region: Some(self.identity.region().to_string()),
            token: self.identity.node_token().to_string(),
            file_type,
            keyspace,
            column_family,
            secondary_index_name,
            file_name,
            time,
            last_modified: stat.last_modified,
            compression,
            encryption,
            size: stat.size,
            local_path: Some(path.to_path_buf()),
        })
    }

    fn split_data_path<'a>(
        &self,
        path: &'a Path,
        display: &str,
        file_type: BackupFileType,
    ) -> Result<DataLayout<'a>, PlacementError> {
        let relative = path.strip_prefix(&self.data_dir).map_err(|_| {
            PlacementError::invalid_path(
                display,
                format!("not under data directory {}", self.data_dir.display()),
            )
        })?;
        let parts = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<&str>>>()
            .ok_or_else(|| PlacementError::invalid_path(display, "non UTF-8 path segment"))?;
        if parts.len() < 4 {
            return Err(PlacementError::invalid_path(
                display,
                "expected <keyspace>/<table>/<folder>/.../<file>",
            ));
        }

        let folder = BackupFolder::from_name(parts[2]).ok_or_else(|| {
            PlacementError::invalid_path(display, format!("unknown backup folder '{}'", parts[2]))
        })?;
        if !file_type.accepts_folder(folder) {
            return Err(PlacementError::invalid_path(
                display,
                format!("{} files do not live under '{}'", file_type, parts[2]),
            ));
        }

        let inner = &parts[3..parts.len() - 1];
        let (snapshot_tag, inner) = match folder {
            BackupFolder::Backups => (None, inner),
            BackupFolder::Snapshots => {
                let (tag, rest) = inner.split_first().ok_or_else(|| {
                    PlacementError::invalid_path(display, "missing snapshot tag directory")
                })?;
                (Some(*tag), rest)
            }
        };

        let index_dir = match (file_type, inner) {
            (BackupFileType::SecondaryIndexV2, [dir]) if dir.starts_with('.') => Some(*dir),
            (BackupFileType::SecondaryIndexV2, _) => {
                return Err(PlacementError::invalid_path(
                    display,
                    "expected a dotted secondary index directory above the file",
                ));
            }
            (_, []) => None,
            (_, _) => {
                return Err(PlacementError::invalid_path(
                    display,
                    format!("unexpected directories for {} file", file_type),
                ));
            }
        };

        Ok(DataLayout {
            keyspace: parts[0],
            column_family: parts[1],
            snapshot_tag,
            index_dir,
        })
    }

    /// Remote key of `descriptor`, in the schema its file type belongs to.
    pub fn to_remote_key(&self, descriptor: &BackupFileDescriptor) -> String {
        let d = descriptor;
        let mut parts: Vec<String> = Vec::with_capacity(V2_BASE_SEGMENTS + 3);
        if d.file_type.is_v2() {
            parts.push(d.base_directory.clone());
            parts.push(hashed_cluster_name(&d.cluster_name));
            parts.push(d.token.clone());
            parts.push(d.file_type.to_string());
            parts.push(whole_second_millis(d.last_modified).to_string());
            if d.file_type.is_data_file() {
                parts.push(d.keyspace.clone().unwrap_or_default());
                parts.push(d.column_family.clone().unwrap_or_default());
            }
            if d.file_type == BackupFileType::SecondaryIndexV2 {
                parts.push(d.secondary_index_name.clone().unwrap_or_default());
            }
            parts.push(d.compression.to_string());
            parts.push(d.encryption.to_string());
        } else {
            parts.push(d.base_directory.clone());
            parts.push(d.region.clone().unwrap_or_default());
            parts.push(d.cluster_name.clone());
            parts.push(d.token.clone());
            parts.push(format_minute_stamp(d.time));
            parts.push(d.file_type.to_string());
            if d.file_type.is_data_file() {
                parts.push(d.keyspace.clone().unwrap_or_default());
                parts.push(d.column_family.clone().unwrap_or_default());
            }
        }
        parts.push(d.file_name.clone());
        parts.join(&REMOTE_KEY_DELIMITER.to_string())
    }

    /// Parse a remote key produced by [`PathCodec::to_remote_key`].
    ///
    /// A type name in the fourth segment selects the V2 grammar; anything else
    /// is parsed as a V1 key. A single leading delimiter is tolerated.
    ///
    /// # Arguments
    /// - `key`: Object key, relative to the bucket.
    ///
    /// # Returns
    /// The descriptor the key was built from. V2 keys carry no region, so
    /// their descriptors report none.
    ///
    /// # Errors
    /// `InvalidFormat` when the key does not match either grammar or contains
    /// an empty segment.
    pub fn parse_remote_key(&self, key: &str) -> Result<BackupFileDescriptor, PlacementError> {
        let parts: Vec<&str> = key
            .strip_prefix(REMOTE_KEY_DELIMITER)
            .unwrap_or(key)
            .split(REMOTE_KEY_DELIMITER)
            .collect();
        if parts.iter().any(|segment| segment.is_empty()) {
            return Err(PlacementError::invalid_format(key, "empty key segment"));
        }
        if parts.len() < V1_BASE_SEGMENTS {
            return Err(PlacementError::invalid_format(
                key,
                format!("expected at least {} segments", V1_BASE_SEGMENTS),
            ));
        }

        let descriptor = match parts[3].parse::<BackupFileType>() {
            Ok(file_type) => self.parse_v2(key, &parts, file_type)?,
            Err(_) => self.parse_v1(key, &parts)?,
        };
        tracing::debug!("Parsed remote key {} as {}", key, descriptor.file_type);
        Ok(descriptor)
    }

    fn parse_v2(
        &self,
        key: &str,
        parts: &[&str],
        file_type: BackupFileType,
    ) -> Result<BackupFileDescriptor, PlacementError> {
        let invalid = |reason: String| PlacementError::invalid_format(key, reason);
        if !file_type.is_v2() {
            return Err(invalid(format!("{} is not a V2 file type", file_type)));
        }
        let expected = V2_BASE_SEGMENTS
            + if file_type.is_data_file() { 2 } else { 0 }
            + usize::from(file_type == BackupFileType::SecondaryIndexV2);
        if parts.len() != expected {
            return Err(invalid(format!(
                "expected {} segments for {}, found {}",
                expected,
                file_type,
                parts.len()
            )));
        }

        let cluster_name = strip_cluster_hash(parts[1]).map_err(invalid)?;
        let last_modified = parts[4]
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| invalid(format!("bad timestamp '{}'", parts[4])))?;

        let mut rest = parts[5..].iter().copied();
        let mut next = || rest.next().unwrap_or_default().to_string();
        let (keyspace, column_family) = if file_type.is_data_file() {
            (Some(next()), Some(next()))
        } else {
            (None, None)
        };
        let secondary_index_name =
            (file_type == BackupFileType::SecondaryIndexV2).then(&mut next);
        let compression = next().parse::<CompressionType>().map_err(invalid)?;
        let encryption = next().parse::<EncryptionAlgorithm>().map_err(invalid)?;
        let file_name = next();

        let time = match file_type {
            BackupFileType::MetaV2 => manifest_time(&file_name).unwrap_or(last_modified),
            _ => last_modified,
        };
        Ok(BackupFileDescriptor {
            base_directory: parts[0].to_string(),
            cluster_name: cluster_name.to_string(),
            region: None,
            token: parts[2].to_string(),
            file_type,
            keyspace,
            column_family,
            secondary_index_name,
            file_name,
            time,
            last_modified,
            compression,
            encryption,
            size: 0,
            local_path: None,
        })
    }

    fn parse_v1(&self, key: &str, parts: &[&str]) -> Result<BackupFileDescriptor, PlacementError> {
        let invalid = |reason: String| PlacementError::invalid_format(key, reason);
        let file_type = parts[5].parse::<BackupFileType>().map_err(invalid)?;
        if file_type.is_v2() {
            return Err(invalid(format!("{} is not a V1 file type", file_type)));
        }
        let expected = V1_BASE_SEGMENTS + if file_type.is_data_file() { 2 } else { 0 };
        if parts.len() != expected {
            return Err(invalid(format!(
                "expected {} segments for {}, found {}",
                expected,
                file_type,
                parts.len()
            )));
        }

        let time = parse_minute_stamp(parts[4])
            .ok_or_else(|| invalid(format!("bad time stamp '{}'", parts[4])))?;
        let (keyspace, column_family) = if file_type.is_data_file() {
            (Some(parts[6].to_string()), Some(parts[7].to_string()))
        } else {
            (None, None)
        };

        Ok(BackupFileDescriptor {
            base_directory: parts[0].to_string(),
            cluster_name: parts[2].to_string(),
            region: Some(parts[1].to_string()),
            token: parts[3].to_string(),
            file_type,
            keyspace,
            column_family,
            secondary_index_name: None,
            file_name: parts[parts.len() - 1].to_string(),
            time,
            last_modified: time,
            compression: CompressionType::Snappy,
            encryption: EncryptionAlgorithm::Plaintext,
            size: 0,
            local_path: None,
        })
    }

    /// Key prefix covering every V2 artifact of `file_type` for this node.
    ///
    /// A `base_directory` of at most one segment uses the configured backup
    /// root and cluster. A longer one is read as `<bucket>/<root>/<hash>_<cluster>`
    /// and its second and third segments replace the configured values.
    ///
    /// # Arguments
    /// - `base_directory`: Empty, a bucket name, or `<bucket>/<root>/<hash>_<cluster>`.
    /// - `file_type`: Artifact type the prefix lists.
    ///
    /// # Returns
    /// `<root>/<hash>_<cluster>/<token>/<TYPE>`, without a trailing delimiter.
    ///
    /// # Errors
    /// `InvalidPath` for a two-segment base directory or a cluster segment
    /// whose hash does not match.
    pub fn remote_prefix(
        &self,
        base_directory: &Path,
        file_type: BackupFileType,
    ) -> Result<String, PlacementError> {
        let display = base_directory.display().to_string();
        let segments: Vec<&str> = base_directory
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect();

        let (root, cluster_name) = match segments.as_slice() {
            [] | [_] => (
                self.identity.backup_root(),
                self.identity.cluster_name(),
            ),
            [_, _] => {
                return Err(PlacementError::invalid_path(
                    display,
                    "expected <bucket>/<root>/<hash>_<cluster>",
                ));
            }
            [_, root, cluster, ..] => {
                let cluster_name = strip_cluster_hash(cluster)
                    .map_err(|reason| PlacementError::invalid_path(&display, reason))?;
                (*root, cluster_name)
            }
        };

        Ok([
            root.to_string(),
            hashed_cluster_name(cluster_name),
            self.identity.node_token().to_string(),
            file_type.to_string(),
        ]
        .join(&REMOTE_KEY_DELIMITER.to_string()))
    }

    /// Local destination for restoring `descriptor` under the data directory.
    pub fn restore_path(&self, descriptor: &BackupFileDescriptor) -> PathBuf {
        let mut path = self.data_dir.clone();
        if descriptor.file_type.is_data_file() {
            path.push(descriptor.keyspace().unwrap_or_default());
            path.push(descriptor.column_family().unwrap_or_default());
            if let Some(index) = descriptor.secondary_index_name() {
                path.push(index);
            }
        }
        path.push(descriptor.file_name());
        path
    }

    /// Stage `descriptor` for upload with `now` as its modification time,
    /// truncated to the precision remote keys keep.
    pub fn stage_for_upload(&self, descriptor: &mut BackupFileDescriptor, now: DateTime<Utc>) {
        descriptor.set_last_modified(truncate_to_second(now));
    }
}
