//! Background dataset loading.
//!
//! Reading and classifying the archive is blocking CPU and file work, so it
//! runs on tokio's blocking pool. The finished [`Dataset`] is shared through
//! an `Arc` and never mutated afterwards.

use std::path::PathBuf;
use std::sync::Arc;

use glucose_core::error::{DashboardError, Result};
use glucose_data::analysis::{load_dataset, Dataset};
use tokio::task::JoinHandle;

// ── DatasetLoader ─────────────────────────────────────────────────────────────

/// One-shot loader for the dashboard's dataset.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    archive: PathBuf,
    entry: String,
}

impl DatasetLoader {
    pub fn new(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            entry: entry.into(),
        }
    }

    /// Start loading on the blocking pool and return a handle to the result.
    pub fn start(self) -> LoadHandle {
        let handle = tokio::task::spawn_blocking(move || {
            tracing::debug!(archive = %self.archive.display(), entry = %self.entry, "loading dataset");
            load_dataset(&self.archive, &self.entry).map(Arc::new)
        });
        LoadHandle { handle }
    }

    /// Load and wait for the result.
    pub async fn load(self) -> Result<Arc<Dataset>> {
        self.start().wait().await
    }
}

// ── LoadHandle ────────────────────────────────────────────────────────────────

/// A handle to an in-flight dataset load.
pub struct LoadHandle {
    handle: JoinHandle<Result<Arc<Dataset>>>,
}

impl LoadHandle {
    /// `true` once the load has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the load to finish.
    pub async fn wait(self) -> Result<Arc<Dataset>> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(DashboardError::Io(std::io::Error::other(e))),
        }
    }

    /// Stop waiting for the load and drop its result.
    ///
    /// A blocking task cannot be cancelled once it has started, so the read
    /// runs to completion in the background and its dataset is discarded.
    pub fn detach(self) {
        drop(self.handle);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
