//! Compute-once holder for the process-wide classifier.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::ClassifierError;

/// Holds a model that is loaded at most once.
///
/// Concurrent callers during the first load wait for the single in-flight
/// loader instead of starting their own. A failed load is not cached: the
/// next caller runs the loader again.
pub struct ModelCell<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> Default for ModelCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ModelCell<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// The loaded model, if a load has completed.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

impl<T: Send + Sync + 'static> ModelCell<T> {
    /// Return the loaded model, running `loader` on the blocking pool if no
    /// load has succeeded yet.
    pub async fn get_or_load<F>(&self, loader: F) -> Result<Arc<T>, ClassifierError>
    where
        F: FnOnce() -> Result<T, ClassifierError> + Send + 'static,
    {
        self.cell
            .get_or_try_init(|| async move {
                debug!("loading model");
                let model = tokio::task::spawn_blocking(loader)
                    .await
                    .map_err(|e| ClassifierError::LoaderAborted(e.to_string()))??;
                Ok::<_, ClassifierError>(Arc::new(model))
            })
            .await
            .cloned()
    }
}
