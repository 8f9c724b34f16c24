//! Directory-backed storage for photo assets
//!
//! Assets are written under a single root directory with freshly generated
//! names. Callers only ever see paths relative to the root's parent, in the
//! form `<root dir name>/<file name>`, which is what gets persisted on the
//! owning record.

use std::{
    env,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the assets
    pub root: PathBuf,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PHOTO_STORAGE_DIR`: Root directory for photo assets (default: "uploads")
    pub fn from_env() -> Self {
        let root = env::var("PHOTO_STORAGE_DIR").unwrap_or_else(|_| "uploads".to_string());

        Self {
            root: PathBuf::from(root),
        }
    }
}

/// Photo asset store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    root_name: String,
}

impl FileStore {
    /// Create the root directory if needed and open the store on it
    pub async fn init(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).await.map_err(|source| StorageError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let root = fs::canonicalize(root)
            .await
            .map_err(|source| StorageError::Io {
                path: root.to_path_buf(),
                source,
            })?;

        let root_name = root
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| StorageError::InvalidPath(root.display().to_string()))?;

        info!("File store initialized at {}", root.display());
        Ok(Self { root, root_name })
    }

    /// Absolute path of the storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a new asset and return its relative path
    ///
    /// The generated name keeps the extension of `original_filename`.
    pub async fn save(&self, bytes: &[u8], original_filename: Option<&str>) -> StorageResult<String> {
        let filename = format!("{}{}", Uuid::new_v4(), file_extension(original_filename));
        let path = self.root.join(&filename);

        let io_err = |source: std::io::Error| StorageError::Io {
            path: path.clone(),
            source,
        };

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(format!("{}/{}", self.root_name, filename))
    }

    /// Map a relative asset path to its location on disk
    pub fn resolve(&self, relative_path: &str) -> StorageResult<PathBuf> {
        let name = relative_path
            .strip_prefix(self.root_name.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(relative_path);

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Ok(self.root.join(file)),
            _ => Err(StorageError::InvalidPath(relative_path.to_string())),
        }
    }

    /// Remove an asset
    ///
    /// Missing, blank or already deleted paths are not an error. A path that
    /// does not designate a file directly under the root is left alone.
    pub async fn delete(&self, relative_path: Option<&str>) -> StorageResult<()> {
        let Some(relative_path) = relative_path.filter(|p| !p.trim().is_empty()) else {
            return Ok(());
        };

        let path = match self.resolve(relative_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping delete of asset outside the store: {}", e);
                return Ok(());
            }
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted asset {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Asset {} already absent", path.display());
                Ok(())
            }
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Extension of a client supplied filename, leading dot included
fn file_extension(filename: Option<&str>) -> &str {
    filename
        .and_then(|name| name.rfind('.').map(|idx| &name[idx..]))
        .unwrap_or("")
}
