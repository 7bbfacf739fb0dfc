//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Error, sales::Dataset};

/// The default limit on the size of uploaded files, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// An uploaded file after it has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    /// The name of the file as given by the browser.
    pub file_name: String,
    /// The parsed records, shared so requests can read them without
    /// holding the lock.
    pub dataset: Arc<Dataset>,
}

/// The state of the REST server.
///
/// The server is meant for a single local user, so there is one current
/// dataset shared by every request. A new upload replaces it.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The most recently uploaded dataset, if any.
    pub dataset: Arc<Mutex<Option<LoadedDataset>>>,

    /// The largest file that may be uploaded, in megabytes.
    pub max_upload_mb: usize,
}

impl AppState {
    /// Create a new [AppState] with no dataset loaded.
    pub fn new(max_upload_mb: usize) -> Self {
        Self {
            dataset: Arc::new(Mutex::new(None)),
            max_upload_mb,
        }
    }

    /// Create a new [AppState] with `dataset` already loaded.
    pub fn with_dataset(max_upload_mb: usize, file_name: &str, dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(Mutex::new(Some(LoadedDataset {
                file_name: file_name.to_owned(),
                dataset: Arc::new(dataset),
            }))),
            max_upload_mb,
        }
    }

    /// The upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Lock the current dataset.
    ///
    /// # Errors
    /// Returns [Error::DatasetLockError] if the lock is poisoned.
    pub fn lock_dataset(&self) -> Result<MutexGuard<'_, Option<LoadedDataset>>, Error> {
        self.dataset
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire dataset lock: {error}"))
            .map_err(|_| Error::DatasetLockError)
    }

    /// Get a handle to the current dataset without holding the lock.
    ///
    /// # Errors
    /// Returns [Error::NoDataset] if nothing has been uploaded yet, or
    /// [Error::DatasetLockError] if the lock is poisoned.
    pub fn current_dataset(&self) -> Result<LoadedDataset, Error> {
        self.lock_dataset()?.clone().ok_or(Error::NoDataset)
    }

    /// Replace the current dataset.
    pub fn replace_dataset(&self, file_name: &str, dataset: Dataset) -> Result<(), Error> {
        *self.lock_dataset()? = Some(LoadedDataset {
            file_name: file_name.to_owned(),
            dataset: Arc::new(dataset),
        });

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_MB)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        AppState, Error,
        sales::test_utils::{dataset, superstore_sample},
    };

    #[test]
    fn current_dataset_errors_before_upload() {
        let state = AppState::default();

        assert_eq!(state.current_dataset(), Err(Error::NoDataset));
    }

    #[test]
    fn replace_dataset_swaps_the_shared_dataset() {
        let state = AppState::with_dataset(1, "old.csv", dataset(vec![]));
        let handle = state.clone();

        handle
            .replace_dataset("superstore.csv", superstore_sample())
            .unwrap();

        let loaded = state.current_dataset().unwrap();
        assert_eq!(loaded.file_name, "superstore.csv");
        assert_eq!(loaded.dataset.len(), 6);
    }

    #[test]
    fn upload_limit_is_in_megabytes() {
        assert_eq!(AppState::new(2).max_upload_bytes(), 2 * 1024 * 1024);
    }
}
