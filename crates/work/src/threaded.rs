//! Multi-threaded backend.
//!
//! The caller's partition is cut again into one contiguous sub-range per
//! thread, using the same equal-width rule as worker partitions. Threads
//! share nothing but a stop flag, raised by the first one to find work
//! or to panic.

use std::ops::RangeInclusive;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use nanokit_core::{
    search, split_range, BlockHash, PublicKey, SecretKey, Threshold, Work, WorkerPartition,
};
use tracing::{debug, trace};

use crate::backend::WorkBackend;

/// Searches on several OS threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadedBackend {
    threads: usize,
}

impl ThreadedBackend {
    /// A backend with `threads` search threads (at least one).
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// One thread per available core.
    pub fn available() -> Self {
        Self::new(thread::available_parallelism().map_or(1, usize::from))
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Search `range` on all threads.
    ///
    /// Any valid work found is returned; which one wins a race between
    /// threads is unspecified.
    pub fn search_range(
        &self,
        root: &BlockHash,
        range: RangeInclusive<u64>,
        threshold: Threshold,
        stop: &AtomicBool,
    ) -> Option<Work> {
        self.fan_out(range, stop, |sub_range, watch| {
            watch.search(root, sub_range, threshold)
        })
    }

    /// Run `worker` on one sub-range of `range` per thread.
    ///
    /// A worker panic stops the other threads and is resumed on the
    /// calling thread.
    fn fan_out<F>(&self, range: RangeInclusive<u64>, stop: &AtomicBool, worker: F) -> Option<Work>
    where
        F: Fn(RangeInclusive<u64>, &StopEither<'_>) -> Option<Work> + Sync,
    {
        if range.is_empty() {
            return None;
        }
        let len = u128::from(*range.end()) - u128::from(*range.start()) + 1;
        let threads = (self.threads as u128).min(len) as u64;
        debug!(
            threads,
            start = *range.start(),
            end = *range.end(),
            "Starting threaded work search"
        );

        // Raised by the first thread to succeed or panic.
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .filter_map(|index| split_range(&range, index, threads))
                .map(|sub_range| {
                    let done = &done;
                    let worker = &worker;
                    scope.spawn(move || {
                        let _guard = RaiseOnPanic(done);
                        trace!(start = *sub_range.start(), "Worker thread started");
                        let watch = StopEither { a: stop, b: done };
                        let work = worker(sub_range, &watch);
                        if work.is_some() {
                            done.store(true, Ordering::Relaxed);
                        }
                        work
                    })
                })
                .collect();

            let mut found = None;
            for handle in handles {
                match handle.join() {
                    Ok(work) => found = found.or(work),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            found
        })
    }
}

/// Raises the flag if its thread unwinds.
struct RaiseOnPanic<'a>(&'a AtomicBool);

impl Drop for RaiseOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

/// Two stop flags, either of which ends a search.
struct StopEither<'a> {
    a: &'a AtomicBool,
    b: &'a AtomicBool,
}

impl StopEither<'_> {
    fn stopped(&self) -> bool {
        self.a.load(Ordering::Relaxed) || self.b.load(Ordering::Relaxed)
    }

    /// Search in chunks so both flags are checked between them.
    fn search(
        &self,
        root: &BlockHash,
        range: RangeInclusive<u64>,
        threshold: Threshold,
    ) -> Option<Work> {
        const CHUNK: u64 = 1 << 16;

        let mut start = *range.start();
        let end = *range.end();
        loop {
            if self.stopped() {
                return None;
            }
            let chunk_end = start.saturating_add(CHUNK - 1).min(end);
            if let Some(work) = search(root, start..=chunk_end, threshold, self.a) {
                return Some(work);
            }
            if chunk_end == end {
                return None;
            }
            start = chunk_end + 1;
        }
    }
}

impl Default for ThreadedBackend {
    fn default() -> Self {
        Self::available()
    }
}

impl WorkBackend for ThreadedBackend {
    fn name(&self) -> &'static str {
        "threaded"
    }

    fn compute_work(
        &self,
        root: &BlockHash,
        partition: &WorkerPartition,
        threshold: Threshold,
        stop: &AtomicBool,
    ) -> Option<Work> {
        self.search_range(root, partition.range(), threshold, stop)
    }

    fn derive_public_key(&self, secret_key: &SecretKey) -> PublicKey {
        secret_key.public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanokit_core::validate_work;

    fn root() -> BlockHash {
        BlockHash::from_hex("B9CB6B51B8EB869AF085C4C03E7DC539943D0BDDE13B21436B687C9C7EA56CB0")
            .unwrap()
    }

    #[test]
    fn test_threaded_finds_valid_work() {
        let backend = ThreadedBackend::new(4);
        let threshold = Threshold(0xff00_0000_0000_0000);
        let partition = WorkerPartition::new(2, 3).unwrap();
        let work = backend
            .compute_work(&root(), &partition, threshold, &AtomicBool::new(false))
            .unwrap();

        assert!(validate_work(&root(), &work, threshold));
        assert!(partition.range().contains(&work.nonce()));
    }

    #[test]
    fn test_more_threads_than_nonces() {
        let backend = ThreadedBackend::new(8);
        let work = backend
            .search_range(&root(), 10..=12, Threshold(0), &AtomicBool::new(false))
            .unwrap();
        assert!((10..=12).contains(&work.nonce()));
    }

    #[test]
    fn test_exhausted_range_is_none() {
        let backend = ThreadedBackend::new(3);
        let work = backend.search_range(
            &root(),
            0..=(3 << 16),
            Threshold(u64::MAX),
            &AtomicBool::new(false),
        );
        assert_eq!(work, None);
    }

    #[test]
    fn test_caller_stop_flag() {
        let backend = ThreadedBackend::new(2);
        let stop = AtomicBool::new(true);
        assert_eq!(
            backend.search_range(&root(), 0..=u64::MAX, Threshold(u64::MAX), &stop),
            None
        );
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn test_worker_panic_reaches_caller() {
        let backend = ThreadedBackend::new(4);
        backend.fan_out(0..=1023, &AtomicBool::new(false), |range, watch| {
            if *range.start() == 0 {
                panic!("worker failed");
            }
            // The other workers only return once the panic stops them.
            while !watch.stopped() {
                thread::yield_now();
            }
            None
        });
    }

    #[test]
    fn test_thread_count_floor() {
        assert_eq!(ThreadedBackend::new(0).threads(), 1);
        assert!(ThreadedBackend::available().threads() >= 1);
    }
}
