//! Core data-placement library for the Ringkeeper sidecar (tokens, backup addressing).

/// Backup artifact descriptors and the local/remote path codec.
pub mod backup;
/// Configuration loading and defaults.
pub mod config;
/// Shared default values.
pub mod constants;
/// Process-global environment mutation helpers.
pub mod env;
/// Error types for token and path computations.
pub mod error;
/// Cluster identity and filesystem metadata capabilities.
pub mod identity;
/// Ring token arithmetic.
pub mod token;

pub use backup::{
    BackupFileDescriptor, BackupFileType, CompressionType, EncryptionAlgorithm, PathCodec,
};
pub use config::Config;
pub use error::PlacementError;
pub use identity::{
    ClusterIdentity, FileMetadataSource, FileStat, LocalFilesystem, StaticIdentity,
};
pub use token::{PartitionSpace, Token, TokenManager};
