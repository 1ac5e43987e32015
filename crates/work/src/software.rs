//! Single-threaded backend.

use std::sync::atomic::AtomicBool;

use nanokit_core::{search, BlockHash, PublicKey, SecretKey, Threshold, Work, WorkerPartition};

use crate::backend::WorkBackend;

/// Runs everything on the calling thread with the core functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl WorkBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn compute_work(
        &self,
        root: &BlockHash,
        partition: &WorkerPartition,
        threshold: Threshold,
        stop: &AtomicBool,
    ) -> Option<Work> {
        search(root, partition.range(), threshold, stop)
    }

    fn derive_public_key(&self, secret_key: &SecretKey) -> PublicKey {
        secret_key.public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanokit_core::validate_work;

    #[test]
    fn test_software_backend_matches_core() {
        let backend = SoftwareBackend;
        let root = BlockHash([9u8; 32]);
        let threshold = Threshold(0xf000_0000_0000_0000);
        let work = backend
            .compute_work(
                &root,
                &WorkerPartition::FULL,
                threshold,
                &AtomicBool::new(false),
            )
            .unwrap();

        let expected = nanokit_core::compute_work(&root, 0, 1, threshold)
            .unwrap()
            .unwrap();
        assert_eq!(work, expected);
        assert!(validate_work(&root, &work, threshold));
    }

    #[test]
    fn test_software_backend_public_key() {
        let secret_key = SecretKey::from_bytes([1u8; 32]);
        assert_eq!(
            SoftwareBackend.derive_public_key(&secret_key),
            secret_key.public_key()
        );
    }
}
