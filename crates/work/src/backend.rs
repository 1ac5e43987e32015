//! The backend trait.

use std::sync::atomic::AtomicBool;

use nanokit_core::{BlockHash, PublicKey, SecretKey, Threshold, Work, WorkerPartition};

/// Something that can search for work and derive public keys.
///
/// Implementations must give the same answers as the reference functions
/// in `nanokit_core`; they only differ in how fast they get there.
pub trait WorkBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Search `partition` for a work meeting `threshold` against `root`.
    ///
    /// Returns `None` when the partition holds no valid work or when `stop`
    /// is raised before one is found.
    fn compute_work(
        &self,
        root: &BlockHash,
        partition: &WorkerPartition,
        threshold: Threshold,
        stop: &AtomicBool,
    ) -> Option<Work>;

    /// Derive the public key of `secret_key`.
    fn derive_public_key(&self, secret_key: &SecretKey) -> PublicKey;
}
