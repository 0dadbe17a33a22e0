//! Shared constants used across Ringkeeper crates.

/// Default first segment of every remote backup key.
pub const DEFAULT_BACKUP_LOCATION: &str = "backup";

/// Default cluster (application) name.
pub const DEFAULT_CLUSTER_NAME: &str = "cass_cluster";

/// Default region (data center) name.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default node token used when none is configured.
pub const DEFAULT_NODE_TOKEN: &str = "0";

/// Default database data directory that backup artifacts live under.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/cassandra/data";

/// Remote key segment delimiter.
pub const REMOTE_KEY_DELIMITER: char = '/';

/// Modulus for the cluster-name hash prepended to V2 key prefixes.
pub const CLUSTER_HASH_MODULUS: i32 = 10_000;

/// File name prefix of V2 manifests (`meta_v2_<yyyyMMddHHmm>.json`).
pub const META_V2_PREFIX: &str = "meta_v2_";
/// File name suffix of V2 manifests.
pub const META_V2_SUFFIX: &str = ".json";
