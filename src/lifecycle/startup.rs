//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured store backend
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: an unreachable or corrupt store aborts startup
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{StorageBackend, StorageConfig};
use crate::store::{FileStore, MemoryStore, RecipeStore, SqliteStore, StoreError};

/// Fatal errors raised before the server accepts traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The storage backend could not be opened.
    #[error("failed to open {backend} store: {source}")]
    Store {
        backend: StorageBackend,
        source: StoreError,
    },

    /// The configured backend needs a path and none was given.
    #[error("storage.path is required for the {0} backend")]
    MissingPath(StorageBackend),

    /// The listener could not bind.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Open the store described by `config`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn RecipeStore>, StartupError> {
    let backend = config.backend;
    let store_err = |source| StartupError::Store { backend, source };

    let store: Arc<dyn RecipeStore> = match backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => {
            let path = config.path.as_deref().ok_or(StartupError::MissingPath(backend))?;
            Arc::new(FileStore::open(path).map_err(store_err)?)
        }
        StorageBackend::Sqlite => match config.path.as_deref() {
            Some(":memory:") => Arc::new(SqliteStore::open_in_memory().map_err(store_err)?),
            Some(path) => Arc::new(SqliteStore::open(path).map_err(store_err)?),
            None => return Err(StartupError::MissingPath(backend)),
        },
    };

    tracing::info!(backend = %backend, "Recipe store ready");
    Ok(store)
}

/// Bind the HTTP listener.
pub async fn bind_listener(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_each_backend() {
        let dir = tempdir().unwrap();

        let memory = open_store(&StorageConfig::default()).unwrap();
        assert_eq!(memory.backend(), "memory");

        let file = open_store(&StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("recipes.json").display().to_string()),
        })
        .unwrap();
        assert_eq!(file.backend(), "file");

        let sqlite = open_store(&StorageConfig {
            backend: StorageBackend::Sqlite,
            path: Some(":memory:".into()),
        })
        .unwrap();
        assert_eq!(sqlite.backend(), "sqlite");
        assert_eq!(sqlite.count().await.unwrap(), 0);
    }

    #[test]
    fn test_missing_path() {
        let err = open_store(&StorageConfig {
            backend: StorageBackend::File,
            path: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, StartupError::MissingPath(StorageBackend::File)));
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, "not json").unwrap();

        let err = open_store(&StorageConfig {
            backend: StorageBackend::File,
            path: Some(path.display().to_string()),
        })
        .err()
        .unwrap();
        assert!(err.to_string().starts_with("failed to open file store"));
    }

    #[tokio::test]
    async fn test_bind_error() {
        let err = bind_listener("127.0.0.1:not-a-port").await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }
}
