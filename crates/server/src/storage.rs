//! Blob store for product images.
//!
//! Images live as flat files in a single directory, keyed by generated
//! filename. The same directory is served statically under `/uploads`, so a
//! stored filename is also the public reference the SPA renders.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

/// Maximum length of a preserved file extension.
const MAX_EXTENSION_LEN: usize = 8;

/// Length of the random filename suffix.
const SUFFIX_LEN: usize = 6;

/// Errors that can occur in the blob store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem error.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// A filename that could escape the storage root was rejected.
    #[error("invalid image filename")]
    InvalidFilename,
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`. The directory is created by
    /// [`Self::init`], not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Store an image blob, returning the generated filename.
    ///
    /// The filename is millisecond timestamp + random suffix + the original
    /// extension (if it is a plain alphanumeric one). The original name is
    /// otherwise discarded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the write fails.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let filename = generate_filename(original_name);
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        Ok(filename)
    }

    /// Remove a stored blob.
    ///
    /// Returns `true` if the file was removed, `false` if it was already
    /// absent - an absent blob is not an error for any caller.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidFilename` if the filename is not a plain
    /// file name, or `StorageError::Io` for other filesystem failures.
    pub async fn remove(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Resolve a filename inside the root, rejecting anything that could
    /// traverse out of it.
    fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StorageError::InvalidFilename);
        }
        Ok(self.root.join(filename))
    }
}

/// Build a fresh storage filename, preserving a sane extension.
fn generate_filename(original_name: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    let stamp = Utc::now().timestamp_millis();

    match sanitized_extension(original_name) {
        Some(ext) => format!("{stamp}-{suffix}.{ext}"),
        None => format!("{stamp}-{suffix}"),
    }
}

/// Extract the extension if it is short and purely alphanumeric.
fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_store(tag: &str) -> ImageStore {
        let dir = std::env::temp_dir().join(format!(
            "bazaar-storage-test-{}-{tag}",
            std::process::id()
        ));
        ImageStore::new(dir)
    }

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("mug.PNG"), Some("png".to_owned()));
        assert_eq!(sanitized_extension("archive.tar.gz"), Some("gz".to_owned()));
        assert_eq!(sanitized_extension("no-extension"), None);
        assert_eq!(sanitized_extension("weird.p!g"), None);
        assert_eq!(sanitized_extension("long.extension01"), None);
    }

    #[test]
    fn test_generate_filename_shape() {
        let name = generate_filename("mug.png");
        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));
        assert_ne!(generate_filename("mug.png"), generate_filename("mug.png"));
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let store = scratch_store("save");
        store.init().await.unwrap();

        let filename = store.save("mug.png", b"not really a png").await.unwrap();
        let on_disk = tokio::fs::read(store.root().join(&filename)).await.unwrap();
        assert_eq!(on_disk, b"not really a png");

        assert!(store.remove(&filename).await.unwrap());
        // Second removal is a no-op, not an error.
        assert!(!store.remove(&filename).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_rejects_traversal() {
        let store = scratch_store("traversal");
        store.init().await.unwrap();

        assert!(matches!(
            store.remove("../outside.png").await,
            Err(StorageError::InvalidFilename)
        ));
        assert!(matches!(
            store.remove("a/b.png").await,
            Err(StorageError::InvalidFilename)
        ));
        assert!(matches!(
            store.remove("").await,
            Err(StorageError::InvalidFilename)
        ));
    }
}
