use std::fmt;

/// Errors that can occur during media storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested media object was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// A media reference string could not be parsed.
    InvalidReference(String),
    /// The file extension is not an accepted image format.
    UnsupportedFormat(String),
    /// The upload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "media not found: {name}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidReference(msg) => write!(f, "invalid media reference: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported image format: {ext}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "upload exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
