use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Extensions accepted for problem photos
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where uploaded problem images live
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the bytes under a generated name and return that name.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Returns false when the file was already gone.
    async fn remove(&self, file_name: &str) -> Result<bool, StorageError>;

    async fn exists(&self, file_name: &str) -> bool;

    /// Directory served at `/uploads`
    fn root(&self) -> &Path;
}

/// Lower-cased extension of an uploaded file name
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Both the extension and the declared content type must be an allowed image type
pub fn is_allowed_image(file_name: &str, content_type: Option<&str>) -> bool {
    let ext_ok = extension_of(file_name)
        .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    let guessed_ok = mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false);
    let declared_ok = content_type
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|ext| essence == format!("image/{}", ext))
        })
        .unwrap_or(true);

    ext_ok && guessed_ok && declared_ok
}

/// `image-<millis>-<uuid>.<ext>`
pub fn generate_file_name(original_name: &str) -> String {
    let ext = extension_of(original_name).unwrap_or_else(|| "bin".to_string());
    format!(
        "image-{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        ext
    )
}

/// Stored names are flat; anything that could escape the directory is refused
fn check_flat_name(file_name: &str) -> Result<(), StorageError> {
    let flat = !file_name.is_empty()
        && !file_name.contains('/')
        && !file_name.contains('\\')
        && file_name != "."
        && file_name != "..";
    if flat {
        Ok(())
    } else {
        Err(StorageError::InvalidName(file_name.to_string()))
    }
}

/// Flat directory on the local filesystem
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    /// Creates the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!("Image store ready at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        check_flat_name(file_name)?;
        Ok(self.dir.join(file_name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let file_name = generate_file_name(original_name);
        let path = self.path_for(&file_name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored upload {} ({} bytes)", file_name, bytes.len());
        Ok(file_name)
    }

    async fn remove(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.path_for(file_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, file_name: &str) -> bool {
        match self.path_for(file_name) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    fn root(&self) -> &Path {
        &self.dir
    }
}
