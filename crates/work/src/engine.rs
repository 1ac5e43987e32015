//! The asynchronous work engine.
//!
//! A [`WorkEngine`] owns a loader and a cell holding the backend it loads.
//! The first call that needs the backend runs the loader; every later call,
//! including ones racing the first, reuses its result. CPU-bound calls run
//! on tokio's blocking pool.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nanokit_core::{BlockHash, PublicKey, SecretKey, Threshold, Work, WorkError, WorkerPartition};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backend::WorkBackend;
use crate::software::SoftwareBackend;
use crate::threaded::ThreadedBackend;

/// Errors produced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load work backend: {0}")]
    Load(String),
    #[error("work task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("work search timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Work(#[from] WorkError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

type Loader = Box<dyn Fn() -> Result<Arc<dyn WorkBackend>> + Send + Sync>;

/// Raises the flag when dropped, so an abandoned search winds down.
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Lazily loaded, shareable handle to a work backend.
pub struct WorkEngine {
    loader: Loader,
    backend: OnceCell<Arc<dyn WorkBackend>>,
}

impl WorkEngine {
    /// Create an engine that loads its backend with `loader` on first use.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn WorkBackend>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            backend: OnceCell::new(),
        }
    }

    /// Create an engine around an already built backend.
    pub fn with_backend(backend: Arc<dyn WorkBackend>) -> Self {
        Self {
            loader: Box::new(|| -> Result<Arc<dyn WorkBackend>> {
                Err(EngineError::Load("backend was injected".to_string()))
            }),
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// An engine using the single-threaded backend.
    pub fn software() -> Self {
        Self::new(|| Ok(Arc::new(SoftwareBackend) as Arc<dyn WorkBackend>))
    }

    /// An engine using the multi-threaded backend.
    pub fn threaded(threads: usize) -> Self {
        Self::new(move || Ok(Arc::new(ThreadedBackend::new(threads)) as Arc<dyn WorkBackend>))
    }

    /// Load the backend if that has not happened yet.
    ///
    /// Safe to call any number of times, concurrently or not; the loader
    /// runs at most once successfully.
    pub async fn init(&self) -> Result<Arc<dyn WorkBackend>> {
        let backend = self
            .backend
            .get_or_try_init(|| async {
                let backend = (self.loader)()?;
                info!(backend = backend.name(), "Work backend loaded");
                Ok::<_, EngineError>(backend)
            })
            .await?;
        Ok(Arc::clone(backend))
    }

    /// Whether the backend has been loaded.
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    /// Search one worker's partition for valid work.
    ///
    /// `Ok(None)` means the partition holds no valid work. Dropping the
    /// returned future stops the search.
    pub async fn compute_work(
        &self,
        root: BlockHash,
        worker_index: u32,
        worker_count: u32,
        threshold: Threshold,
    ) -> Result<Option<Work>> {
        let partition = WorkerPartition::new(worker_index, worker_count)?;
        let backend = self.init().await?;

        let stop = Arc::new(AtomicBool::new(false));
        let _guard = StopOnDrop(Arc::clone(&stop));

        debug!(
            backend = backend.name(),
            root = %root,
            worker_index,
            worker_count,
            "Dispatching work search"
        );
        let work = tokio::task::spawn_blocking(move || {
            backend.compute_work(&root, &partition, threshold, &stop)
        })
        .await?;
        debug!(work = ?work, "Work search returned");
        Ok(work)
    }

    /// Like [`compute_work`](Self::compute_work), giving up after `timeout`.
    pub async fn compute_work_with_timeout(
        &self,
        root: BlockHash,
        worker_index: u32,
        worker_count: u32,
        threshold: Threshold,
        timeout: Duration,
    ) -> Result<Option<Work>> {
        tokio::time::timeout(
            timeout,
            self.compute_work(root, worker_index, worker_count, threshold),
        )
        .await
        .map_err(|_| EngineError::Timeout(timeout))?
    }

    /// Derive a public key on the backend.
    pub async fn derive_public_key(&self, secret_key: SecretKey) -> Result<PublicKey> {
        let backend = self.init().await?;
        let public_key =
            tokio::task::spawn_blocking(move || backend.derive_public_key(&secret_key)).await?;
        Ok(public_key)
    }
}

impl Default for WorkEngine {
    fn default() -> Self {
        Self::threaded(ThreadedBackend::available().threads())
    }
}

impl fmt::Debug for WorkEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkEngine")
            .field("backend", &self.backend.get().map(|b| b.name()))
            .finish()
    }
}
