//! Backup file-type taxonomy and on-disk folder markers.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kind of backup artifact. Each variant fixes a local layout and a remote
/// key shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupFileType {
    /// Legacy incremental SSTable (`<ks>/<cf>/backup(s)/<file>`).
    Sst,
    /// Legacy snapshot member (`<ks>/<cf>/snapshot(s)/<tag>/<file>`).
    Snap,
    /// Legacy manifest.
    Meta,
    /// SSTable from an incremental backup or a snapshot.
    SstV2,
    /// Manifest named `meta_v2_<yyyyMMddHHmm>.json`.
    MetaV2,
    /// SSTable of a secondary index (`.../.<cf>_<field>_idx/<file>`).
    SecondaryIndexV2,
}

impl BackupFileType {
    pub const ALL: [Self; 6] = [
        Self::Sst,
        Self::Snap,
        Self::Meta,
        Self::SstV2,
        Self::MetaV2,
        Self::SecondaryIndexV2,
    ];

    /// Name used as the type segment of remote keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sst => "SST",
            Self::Snap => "SNAP",
            Self::Meta => "META",
            Self::SstV2 => "SST_V2",
            Self::MetaV2 => "META_V2",
            Self::SecondaryIndexV2 => "SECONDARY_INDEX_V2",
        }
    }

    /// Whether the artifact belongs to a keyspace and table.
    pub fn is_data_file(&self) -> bool {
        match self {
            Self::Sst | Self::Snap | Self::SstV2 | Self::SecondaryIndexV2 => true,
            Self::Meta | Self::MetaV2 => false,
        }
    }

    /// Whether the artifact uses the current (V2) key schema.
    pub fn is_v2(&self) -> bool {
        match self {
            Self::SstV2 | Self::MetaV2 | Self::SecondaryIndexV2 => true,
            Self::Sst | Self::Snap | Self::Meta => false,
        }
    }

    /// Folder markers a local path of this type may sit under.
    pub fn accepts_folder(&self, folder: BackupFolder) -> bool {
        match self {
            Self::Sst => folder == BackupFolder::Backups,
            Self::Snap => folder == BackupFolder::Snapshots,
            Self::SstV2 | Self::SecondaryIndexV2 => true,
            Self::Meta | Self::MetaV2 => false,
        }
    }
}

impl fmt::Display for BackupFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackupFileType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|file_type| file_type.as_str() == value)
            .ok_or_else(|| format!("unknown backup file type '{}'", value))
    }
}

/// Directory under `<ks>/<cf>` that the database writes backup files to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFolder {
    /// `backup` or `backups`: incremental backups, files directly inside.
    Backups,
    /// `snapshot` or `snapshots`: one directory per snapshot tag.
    Snapshots,
}

impl BackupFolder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "backup" | "backups" => Some(Self::Backups),
            "snapshot" | "snapshots" => Some(Self::Snapshots),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_parse_back() {
        for file_type in BackupFileType::ALL {
            assert_eq!(file_type.as_str().parse(), Ok(file_type));
        }
        assert!("CL".parse::<BackupFileType>().is_err());
        assert!("sst".parse::<BackupFileType>().is_err());
    }

    #[test]
    fn classification_flags() {
        assert!(BackupFileType::Snap.is_data_file());
        assert!(!BackupFileType::MetaV2.is_data_file());
        assert!(BackupFileType::SecondaryIndexV2.is_v2());
        assert!(!BackupFileType::Sst.is_v2());
    }

    #[test]
    fn folder_markers() {
        assert_eq!(BackupFolder::from_name("backup"), Some(BackupFolder::Backups));
        assert_eq!(BackupFolder::from_name("snapshots"), Some(BackupFolder::Snapshots));
        assert_eq!(BackupFolder::from_name("foo"), None);
        assert!(!BackupFileType::Sst.accepts_folder(BackupFolder::Snapshots));
        assert!(BackupFileType::SstV2.accepts_folder(BackupFolder::Snapshots));
    }
}
