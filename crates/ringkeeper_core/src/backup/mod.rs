//! Backup artifact addressing.
//!
//! ## Core Concepts
//! - **Descriptor**: [`BackupFileDescriptor`] is the identity of one artifact
//!   (keyspace, table, type, time, algorithms, file name).
//! - **File types**: [`BackupFileType`] is a closed set; each variant owns one
//!   local layout rule and one remote key shape.
//! - **Codec**: [`PathCodec`] classifies local files and converts descriptors
//!   to and from remote object-store keys in the legacy (V1) and current (V2)
//!   schemas. Old V1 artifacts are never rewritten, so both shapes stay
//!   parseable.

pub mod algorithm;
pub mod codec;
pub mod descriptor;
pub mod file_type;
pub(crate) mod time_util;


pub use algorithm::{CompressionType, EncryptionAlgorithm};
pub use codec::PathCodec;
pub use descriptor::BackupFileDescriptor;
pub use file_type::{BackupFileType, BackupFolder};
