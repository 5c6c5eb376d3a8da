use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::StorageError;

/// Image extensions accepted for section uploads.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "svg"];

/// Content-addressed reference to a stored image.
///
/// Rendered as `{64 hex chars}.{extension}`; this string is what a Section's
/// `image` column holds and what the media route serves.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MediaRef {
    digest: [u8; 32],
    extension: String,
}

impl MediaRef {
    /// Hash `data` and attach the (normalized) extension.
    pub fn compute(data: &[u8], extension: &str) -> Result<Self, StorageError> {
        Ok(Self {
            digest: Sha256::digest(data).into(),
            extension: normalize_extension(extension)?,
        })
    }

    /// Build from a digest produced by a streaming hasher.
    pub fn from_digest(digest: [u8; 32], extension: &str) -> Result<Self, StorageError> {
        Ok(Self {
            digest,
            extension: normalize_extension(extension)?,
        })
    }

    /// Parse a `{hex}.{ext}` file name.
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        let (hex_part, ext) = name
            .rsplit_once('.')
            .ok_or_else(|| StorageError::InvalidReference(format!("missing extension: {name}")))?;

        if hex_part.len() != 64 {
            return Err(StorageError::InvalidReference(format!(
                "expected 64 hex characters, got {}",
                hex_part.len()
            )));
        }

        let bytes = hex::decode(hex_part)
            .map_err(|e| StorageError::InvalidReference(format!("invalid hex: {e}")))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| StorageError::InvalidReference("decoded to wrong length".into()))?;

        Self::from_digest(digest, ext)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name stored in the `image` column, e.g. `ab12….png`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.digest_hex(), self.extension)
    }

    /// First byte of the digest in hex, used as the on-disk shard directory.
    pub fn shard_dir(&self) -> String {
        hex::encode(&self.digest[..1])
    }
}

pub(crate) fn normalize_extension(ext: &str) -> Result<String, StorageError> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedFormat(ext))
    }
}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaRef({})", self.file_name())
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for MediaRef {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MediaRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.file_name())
    }
}

impl<'de> Deserialize<'de> for MediaRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
