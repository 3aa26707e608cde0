//! Temporary Zarr stores for integration tests.

use std::sync::Arc;

use tempfile::TempDir;
use zarrs_filesystem::FilesystemStore;

/// A filesystem store rooted in a temporary directory.
///
/// The directory is removed when the value is dropped, so keep it alive for
/// the duration of the test.
pub struct TempStore {
    pub dir: TempDir,
    pub store: Arc<FilesystemStore>,
}

/// Create a [`TempStore`].
///
/// # Panics
///
/// Panics if the temporary directory or the store cannot be created.
pub fn temp_store() -> TempStore {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = FilesystemStore::new(dir.path()).expect("Failed to create filesystem store");
    TempStore {
        dir,
        store: Arc::new(store),
    }
}
