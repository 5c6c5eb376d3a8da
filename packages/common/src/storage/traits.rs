use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::media_ref::MediaRef;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed storage for uploaded section images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under the given image extension and return the reference.
    async fn put(&self, data: &[u8], extension: &str) -> Result<MediaRef, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(reader, extension).await
    }

    /// Store data from an async reader and return the reference.
    async fn put_stream(&self, reader: BoxReader, extension: &str)
    -> Result<MediaRef, StorageError>;

    /// Read an entire stored image.
    async fn get(&self, media: &MediaRef) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(media).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn get_stream(&self, media: &MediaRef) -> Result<BoxReader, StorageError>;

    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, media: &MediaRef) -> Result<bool, StorageError>;

    async fn size(&self, media: &MediaRef) -> Result<u64, StorageError>;
}
