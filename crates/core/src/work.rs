//! Proof of work.
//!
//! A work value is an 8-byte nonce. Its difficulty against a 32-byte root
//! is the 8-byte Blake2b digest of the little-endian nonce followed by the
//! root, read as a little-endian `u64`. Work is valid when that value is at
//! least the threshold.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::error::ParseError;
use crate::hash::{decode_hex, BlockHash, Hasher};

/// How many nonces are tried between two looks at the stop flag.
const STOP_CHECK_INTERVAL: u64 = 1 << 14;

/// Errors produced by work search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error("worker parameters are not valid: index {index}, count {count}")]
    InvalidWorkerParams { index: u32, count: u32 },
}

/// An 8-byte work value, stored in its big-endian printed order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Work(pub [u8; 8]);

impl Work {
    pub fn from_nonce(nonce: u64) -> Self {
        Self(nonce.to_be_bytes())
    }

    pub fn nonce(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex(s).map(Self).ok_or(ParseError::Work)
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Work({})", self.to_hex())
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Work {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Work {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Work {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Minimum difficulty value a work must reach. Lower is easier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(pub u64);

impl Threshold {
    pub const DEFAULT: Self = Self(0xffff_ffc0_0000_0000);

    pub fn to_hex(&self) -> String {
        format!("{:016X}", self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_hex::<8>(s)
            .map(|bytes| Self(u64::from_be_bytes(bytes)))
            .ok_or(ParseError::Threshold)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Threshold({})", self.to_hex())
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Threshold {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Threshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn nonce_value(root: &BlockHash, nonce: u64) -> u64 {
    let mut hasher = Hasher::<8>::new();
    hasher.update(nonce.to_le_bytes()).update(root);
    u64::from_le_bytes(hasher.finalize())
}

/// The difficulty value of `work` against `root`.
pub fn work_value(root: &BlockHash, work: &Work) -> u64 {
    nonce_value(root, work.nonce())
}

/// Check `work` against `root` under `threshold`.
pub fn validate_work(root: &BlockHash, work: &Work, threshold: Threshold) -> bool {
    work_value(root, work) >= threshold.0
}

/// One worker's share of the nonce space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPartition {
    index: u32,
    count: u32,
}

impl WorkerPartition {
    /// The whole nonce space as a single partition.
    pub const FULL: Self = Self { index: 0, count: 1 };

    pub fn new(index: u32, count: u32) -> Result<Self, WorkError> {
        if count == 0 || index >= count {
            return Err(WorkError::InvalidWorkerParams { index, count });
        }
        Ok(Self { index, count })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// The nonces this worker scans.
    pub fn range(&self) -> RangeInclusive<u64> {
        // `new` guarantees `index < count <= u32::MAX`, so every piece of
        // the 2^64 nonces is at least 2^32 wide.
        let index = u128::from(self.index);
        let width = (1u128 << 64) / u128::from(self.count);
        let lo = index * width;
        let hi = if self.index == self.count - 1 {
            u128::from(u64::MAX)
        } else {
            lo + width - 1
        };
        lo as u64..=hi as u64
    }
}

impl Default for WorkerPartition {
    fn default() -> Self {
        Self::FULL
    }
}

/// Cut `range` into `count` contiguous pieces of equal width and return
/// piece `index`. The last piece also takes the remainder.
///
/// Returns `None` when the piece would be empty, which only happens when
/// `count` exceeds the length of `range`.
pub fn split_range(
    range: &RangeInclusive<u64>,
    index: u64,
    count: u64,
) -> Option<RangeInclusive<u64>> {
    if count == 0 || index >= count {
        return None;
    }
    let start = u128::from(*range.start());
    let end = u128::from(*range.end());
    if end < start {
        return None;
    }
    let width = (end - start + 1) / u128::from(count);
    if width == 0 {
        return None;
    }

    let lo = start + u128::from(index) * width;
    let hi = if index == count - 1 { end } else { lo + width - 1 };
    // Both bounds lie inside `range`, so they fit in a u64.
    Some(lo as u64..=hi as u64)
}

/// Scan `range` in order and return the first nonce meeting `threshold`.
///
/// `stop` is polled periodically; once it is set the scan gives up and
/// returns `None`.
pub fn search(
    root: &BlockHash,
    range: RangeInclusive<u64>,
    threshold: Threshold,
    stop: &AtomicBool,
) -> Option<Work> {
    for nonce in range {
        if nonce % STOP_CHECK_INTERVAL == 0 && stop.load(Ordering::Relaxed) {
            return None;
        }
        if nonce_value(root, nonce) >= threshold.0 {
            return Some(Work::from_nonce(nonce));
        }
    }
    None
}

/// Search this worker's partition for a valid work.
///
/// `Ok(None)` means the partition holds no valid work.
pub fn compute_work(
    root: &BlockHash,
    worker_index: u32,
    worker_count: u32,
    threshold: Threshold,
) -> Result<Option<Work>, WorkError> {
    let partition = WorkerPartition::new(worker_index, worker_count)?;
    Ok(compute_work_in(root, &partition, threshold))
}

/// Like [`compute_work`] with an already validated partition.
pub fn compute_work_in(
    root: &BlockHash,
    partition: &WorkerPartition,
    threshold: Threshold,
) -> Option<Work> {
    let range = partition.range();
    debug!(
        root = %root,
        start = *range.start(),
        end = *range.end(),
        threshold = %threshold,
        "Searching for work"
    );
    let found = search(root, range, threshold, &AtomicBool::new(false));
    debug!(work = ?found, "Work search finished");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "B9CB6B51B8EB869AF085C4C03E7DC539943D0BDDE13B21436B687C9C7EA56CB0";

    fn root() -> BlockHash {
        BlockHash::from_hex(ROOT).unwrap()
    }

    #[test]
    fn test_validate_known_work() {
        let work = Work::from_hex("0000000000010600").unwrap();
        assert_eq!(work_value(&root(), &work), 0xffff_fff1_b876_9417);
        assert!(validate_work(&root(), &work, Threshold::DEFAULT));
        assert!(!validate_work(
            &root(),
            &work,
            Threshold::from_hex("ffffffff00000000").unwrap()
        ));
    }

    #[test]
    fn test_known_invalid_work() {
        let root = BlockHash::from_hex(
            "3ED191EC702F384514BA35E1F9081148DF5A9AB48FE0F604B6E5B9F7177CEE32",
        )
        .unwrap();
        let work = Work::from_hex("bb6737f2daf01a2c").unwrap();
        assert_eq!(work_value(&root, &work), 0x74bb_aa44_9088_6de7);
        assert!(!validate_work(&root, &work, Threshold::DEFAULT));
    }

    #[test]
    fn test_threshold_bounds() {
        let work = Work::from_hex("0000000000010600").unwrap();
        let value = work_value(&root(), &work);
        assert!(validate_work(&root(), &work, Threshold(value)));
        assert!(!validate_work(&root(), &work, Threshold(value + 1)));
        assert!(validate_work(&root(), &work, Threshold(0)));
    }

    #[test]
    fn test_work_hex() {
        let work = Work::from_nonce(0x0106_00);
        assert_eq!(work.to_hex(), "0000000000010600");
        assert_eq!(Work::from_hex("0000000000010600").unwrap(), work);
        assert_eq!(Work::from_hex("00000000000106"), Err(ParseError::Work));
        assert_eq!(Threshold::DEFAULT.to_hex(), "FFFFFFC000000000");
        assert_eq!(Threshold::from_hex("fffffffg00000000"), Err(ParseError::Threshold));
    }

    #[test]
    fn test_partition_ranges() {
        assert_eq!(WorkerPartition::FULL.range(), 0..=u64::MAX);

        let ranges: Vec<_> = (0..4)
            .map(|i| WorkerPartition::new(i, 4).unwrap().range())
            .collect();
        assert_eq!(ranges[0], 0..=0x3fff_ffff_ffff_ffff);
        assert_eq!(ranges[1], 0x4000_0000_0000_0000..=0x7fff_ffff_ffff_ffff);
        assert_eq!(*ranges[3].end(), u64::MAX);

        // Remainder goes to the last worker.
        let last = WorkerPartition::new(2, 3).unwrap().range();
        let width = u64::MAX / 3;
        assert_eq!(*last.start(), 2 * width);
        assert_eq!(*last.end(), u64::MAX);
        let second = WorkerPartition::new(1, 3).unwrap().range();
        assert_eq!(*second.end() + 1, *last.start());
    }

    #[test]
    fn test_partition_ranges_agree_with_split_range() {
        let full = 0..=u64::MAX;
        let cases = [
            (0, 1),
            (1, 3),
            (6, 7),
            (0, u32::MAX),
            (u32::MAX - 1, u32::MAX),
        ];
        for (index, count) in cases {
            let partition = WorkerPartition::new(index, count).unwrap();
            assert_eq!(
                Some(partition.range()),
                split_range(&full, index.into(), count.into()),
                "{index}/{count}"
            );
        }

        let last = WorkerPartition::new(u32::MAX - 1, u32::MAX).unwrap().range();
        assert_eq!(*last.end(), u64::MAX);
        assert!(last.start() < last.end());
    }

    #[test]
    fn test_invalid_partitions() {
        assert_eq!(
            WorkerPartition::new(0, 0),
            Err(WorkError::InvalidWorkerParams { index: 0, count: 0 })
        );
        assert!(WorkerPartition::new(3, 3).is_err());
        assert!(compute_work(&root(), 5, 2, Threshold::DEFAULT).is_err());
    }

    #[test]
    fn test_split_range_small() {
        assert_eq!(split_range(&(10..=19), 0, 3), Some(10..=12));
        assert_eq!(split_range(&(10..=19), 2, 3), Some(16..=19));
        assert_eq!(split_range(&(10..=11), 2, 3), None);
        assert_eq!(split_range(&(10..=19), 3, 3), None);
    }

    #[test]
    fn test_compute_work_starts_at_partition_start() {
        let work = compute_work(&root(), 1, 4, Threshold(0)).unwrap().unwrap();
        assert_eq!(work.nonce(), 0x4000_0000_0000_0000);
    }

    #[test]
    fn test_compute_work_at_low_threshold() {
        let threshold = Threshold(0xff00_0000_0000_0000);
        let work = compute_work(&root(), 0, 1, threshold).unwrap().unwrap();
        assert!(validate_work(&root(), &work, threshold));
        // First hit: every smaller nonce fails.
        for nonce in 0..work.nonce() {
            assert!(!validate_work(&root(), &Work::from_nonce(nonce), threshold));
        }
    }

    #[test]
    fn test_search_exhausted_range_is_none() {
        let stop = AtomicBool::new(false);
        assert_eq!(search(&root(), 0..=255, Threshold(u64::MAX), &stop), None);
    }

    #[test]
    fn test_search_honours_stop_flag() {
        let stop = AtomicBool::new(true);
        assert_eq!(search(&root(), 0..=u64::MAX, Threshold(u64::MAX), &stop), None);
    }
}
