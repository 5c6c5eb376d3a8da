use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::media_ref::{MediaRef, normalize_extension};
use super::traits::{BoxReader, MediaStore};

/// Filesystem-backed media store.
///
/// Images live at `{root}/{first 2 hex chars}/{hex}.{ext}`. Writes go to
/// `{root}/.tmp` first and are renamed into place once hashed.
pub struct FilesystemMediaStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn media_path(&self, media: &MediaRef) -> PathBuf {
        self.root.join(media.shard_dir()).join(media.file_name())
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn commit_temp(&self, temp_path: PathBuf, media: &MediaRef) -> Result<(), StorageError> {
        let final_path = self.media_path(media);
        if fs::try_exists(&final_path).await? {
            let _ = fs::remove_file(&temp_path).await;
            return Ok(());
        }

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, data: &[u8], extension: &str) -> Result<MediaRef, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let media = MediaRef::compute(data, extension)?;
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        self.commit_temp(temp_path, &media).await?;
        tracing::debug!(media = %media, size = data.len(), "Stored media");
        Ok(media)
    }

    async fn put_stream(
        &self,
        mut reader: BoxReader,
        extension: &str,
    ) -> Result<MediaRef, StorageError> {
        let extension = normalize_extension(extension)?;
        let temp_path = self.temp_path();
        let mut hasher = Sha256::new();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024];
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            hasher.update(&buf[..n]);
            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let media = MediaRef::from_digest(hasher.finalize().into(), &extension)?;
        self.commit_temp(temp_path, &media).await?;
        tracing::debug!(media = %media, size = total_bytes, "Stored media stream");
        Ok(media)
    }

    async fn get_stream(&self, media: &MediaRef) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.media_path(media)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(media.file_name()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, media: &MediaRef) -> Result<bool, StorageError> {
        match fs::remove_file(self.media_path(media)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, media: &MediaRef) -> Result<u64, StorageError> {
        match fs::metadata(self.media_path(media)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(media.file_name()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
