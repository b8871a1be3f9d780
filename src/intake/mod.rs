//! Image intake collaborator interface.
//!
//! The pipeline only ever reads image bytes by reference; storage and upload
//! live outside this crate.

pub mod error;

pub use error::IntakeError;

use std::path::PathBuf;

use crate::label::ImageReference;

/// Raw image bytes plus the MIME type inferred from the storage key.
#[derive(Debug, Clone)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// MIME type for a storage key by extension. JPEG is the fallback, matching
/// the intake side's accepted upload types.
pub fn mime_for_key(storage_key: &str) -> &'static str {
    if storage_key.to_ascii_lowercase().ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Resolves an [`ImageReference`] to raw bytes.
pub trait ImageStore: Send + Sync {
    fn resolve(
        &self,
        reference: &ImageReference,
    ) -> impl std::future::Future<Output = Result<ImageBytes, IntakeError>> + Send;
}

/// Filesystem-backed store reading `{upload_dir}/{storage_key}`.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    upload_dir: PathBuf,
}

impl FsImageStore {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }
}

impl ImageStore for FsImageStore {
    async fn resolve(&self, reference: &ImageReference) -> Result<ImageBytes, IntakeError> {
        let path = self.upload_dir.join(&reference.storage_key);
        if !path.exists() {
            return Err(IntakeError::NotFound {
                storage_key: reference.storage_key.clone(),
            });
        }
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| IntakeError::ReadFailed {
                storage_key: reference.storage_key.clone(),
                source,
            })?;
        Ok(ImageBytes {
            bytes,
            mime: mime_for_key(&reference.storage_key),
        })
    }
}

/// In-memory store for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Default, Clone)]
pub struct MockImageStore {
    entries: std::sync::Arc<std::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>>,
}

#[cfg(any(test, feature = "mock"))]
impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, storage_key: &str, bytes: Vec<u8>) {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(storage_key.to_string(), bytes);
    }
}

#[cfg(any(test, feature = "mock"))]
impl ImageStore for MockImageStore {
    async fn resolve(&self, reference: &ImageReference) -> Result<ImageBytes, IntakeError> {
        self.entries
            .read()
            .expect("lock poisoned")
            .get(&reference.storage_key)
            .cloned()
            .map(|bytes| ImageBytes {
                bytes,
                mime: mime_for_key(&reference.storage_key),
            })
            .ok_or_else(|| IntakeError::NotFound {
                storage_key: reference.storage_key.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::ImageReference;

    fn reference(key: &str) -> ImageReference {
        ImageReference {
            storage_key: key.to_string(),
            filename: key.to_string(),
        }
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_key("a1b2.png"), "image/png");
        assert_eq!(mime_for_key("a1b2.PNG"), "image/png");
        assert_eq!(mime_for_key("a1b2.jpg"), "image/jpeg");
        assert_eq!(mime_for_key("a1b2.jpeg"), "image/jpeg");
    }

    #[tokio::test]
    async fn fs_store_reads_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let key = "label.jpg";
        std::fs::write(dir.path().join(key), b"jpeg-bytes").expect("write fixture");

        let store = FsImageStore::new(dir.path().to_path_buf());
        let image = store.resolve(&reference(key)).await.expect("resolve");
        assert_eq!(image.bytes, b"jpeg-bytes");
        assert_eq!(image.mime, "image/jpeg");
    }

    #[tokio::test]
    async fn fs_store_missing_key_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path().to_path_buf());
        let err = store.resolve(&reference("absent.png")).await.unwrap_err();
        assert!(matches!(err, IntakeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn mock_store_round_trips() {
        let store = MockImageStore::new();
        store.insert("x.png", vec![1, 2, 3]);
        let image = store.resolve(&reference("x.png")).await.expect("resolve");
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.mime, "image/png");
    }
}
