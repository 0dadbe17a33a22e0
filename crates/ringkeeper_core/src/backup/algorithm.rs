//! Compression and encryption algorithm names carried by V2 keys.
//!
//! Only the names are modeled here; the byte-level transforms live with the
//! upload and restore collaborators.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Compression applied to an uploaded artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionType {
    None,
    #[default]
    Snappy,
    Lz4,
    Zstd,
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Snappy => "SNAPPY",
            Self::Lz4 => "LZ4",
            Self::Zstd => "ZSTD",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionType {
    type Err = String;

    /// Parse the exact upper-case name used in remote keys.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NONE" => Ok(Self::None),
            "SNAPPY" => Ok(Self::Snappy),
            "LZ4" => Ok(Self::Lz4),
            "ZSTD" => Ok(Self::Zstd),
            other => Err(format!("unknown compression '{}'", other)),
        }
    }
}

/// Encryption applied to an uploaded artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionAlgorithm {
    #[default]
    Plaintext,
    Pgp,
}

impl EncryptionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Pgp => "PGP",
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PLAINTEXT" => Ok(Self::Plaintext),
            "PGP" => Ok(Self::Pgp),
            other => Err(format!("unknown encryption '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for compression in [
            CompressionType::None,
            CompressionType::Snappy,
            CompressionType::Lz4,
            CompressionType::Zstd,
        ] {
            assert_eq!(compression.as_str().parse(), Ok(compression));
        }
        for encryption in [EncryptionAlgorithm::Plaintext, EncryptionAlgorithm::Pgp] {
            assert_eq!(encryption.to_string().parse(), Ok(encryption));
        }
    }

    #[test]
    fn key_names_are_case_sensitive() {
        assert!("snappy".parse::<CompressionType>().is_err());
        assert!("Pgp".parse::<EncryptionAlgorithm>().is_err());
    }
}
