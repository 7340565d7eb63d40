//! Batched retrieval with partial-progress delivery.
//!
//! Large fetches are split into bounded batches so memory stays flat,
//! servers do not time out on huge responses, and callers can surface
//! progress while results stream in.

#![allow(clippy::missing_const_for_fn)]

use std::num::NonZeroUsize;

use crate::types::{MessageSummary, Uid, UidSet};

/// Default number of messages per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on batch size.
pub const MAX_BATCH_SIZE: usize = 500;

/// Ordering of batch execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchOrder {
    /// Highest UIDs first: newest messages reach the caller soonest.
    #[default]
    NewestFirst,
    /// Lowest UIDs first.
    OldestFirst,
}

/// Configuration for batched fetches.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Messages per batch.
    pub batch_size: NonZeroUsize,
    /// Execution order of the batches.
    pub order: BatchOrder,
}

const DEFAULT_BATCH_SIZE_NONZERO: NonZeroUsize = match NonZeroUsize::new(DEFAULT_BATCH_SIZE) {
    Some(v) => v,
    None => panic!("default batch size must be non-zero"),
};

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE_NONZERO,
            order: BatchOrder::default(),
        }
    }
}

impl BatchConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size, clamped to [`MAX_BATCH_SIZE`]; zero keeps
    /// the previous value.
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = NonZeroUsize::new(size.min(MAX_BATCH_SIZE)).unwrap_or(self.batch_size);
        self
    }

    /// Sets the batch order.
    #[must_use]
    pub fn order(mut self, order: BatchOrder) -> Self {
        self.order = order;
        self
    }

    /// Splits a UID list into per-batch sets.
    ///
    /// UIDs are sorted, deduplicated, grouped into batches of at most
    /// `batch_size`, and ordered per the configuration.
    #[must_use]
    pub fn split_uids(&self, uids: &[Uid]) -> Vec<UidSet> {
        if uids.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<Uid> = uids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut batches: Vec<UidSet> = sorted
            .chunks(self.batch_size.get())
            .filter_map(UidSet::from_uids)
            .collect();

        self.order.apply(&mut batches);
        batches
    }
}

impl BatchOrder {
    /// Applies this ordering to a list of ascending batches.
    pub fn apply<T>(self, batches: &mut [T]) {
        if matches!(self, Self::NewestFirst) {
            batches.reverse();
        }
    }
}

/// Progress report during a batched fetch.
#[derive(Debug)]
pub enum FetchProgress {
    /// One batch finished.
    Batch {
        /// Index of the finished batch, 0-based.
        batch_index: usize,
        /// Total number of batches.
        total_batches: usize,
        /// Summaries fetched in this batch.
        summaries: Vec<MessageSummary>,
    },
    /// All batches finished.
    Complete {
        /// Total number of summaries delivered.
        total: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uid(n: u32) -> Uid {
        Uid::new(n).unwrap()
    }

    #[test]
    fn defaults() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size.get(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.order, BatchOrder::NewestFirst);
    }

    #[test]
    fn batch_size_is_clamped() {
        assert_eq!(
            BatchConfig::new().batch_size(10_000).batch_size.get(),
            MAX_BATCH_SIZE
        );
        // Zero keeps the default rather than panicking.
        assert_eq!(
            BatchConfig::new().batch_size(0).batch_size.get(),
            DEFAULT_BATCH_SIZE
        );
    }

    #[test]
    fn split_uids_batches_and_orders() {
        let uids: Vec<Uid> = (1..=25).map(uid).collect();
        let config = BatchConfig::new()
            .batch_size(10)
            .order(BatchOrder::OldestFirst);

        let batches = config.split_uids(&uids);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].to_string(), "1:10");
        assert_eq!(batches[1].to_string(), "11:20");
        assert_eq!(batches[2].to_string(), "21:25");
    }

    #[test]
    fn newest_first_reverses() {
        let uids: Vec<Uid> = (1..=25).map(uid).collect();
        let batches = BatchConfig::new().batch_size(10).split_uids(&uids);
        assert_eq!(batches[0].to_string(), "21:25");
    }

    #[test]
    fn split_uids_dedups() {
        let batches = BatchConfig::new().split_uids(&[uid(3), uid(1), uid(3), uid(2)]);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].to_string(), "1:3");
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(BatchConfig::new().split_uids(&[]).is_empty());
    }
}
