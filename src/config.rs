//! Engine configuration.

use crate::counter::{DEFAULT_SHARD_BITS, MAX_SHARD_BITS};

/// How input files are spread over worker threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Partitioning {
    /// Contiguous, near-equal file ranges fixed at start. Best when files
    /// cost roughly the same.
    #[default]
    Static,
    /// Files are pulled from a shared rayon pool as workers free up.
    WorkStealing,
}

/// Counting configuration.
#[derive(Clone, Debug)]
pub struct CounterConfig {
    ksize: u32,
    threads: usize,
    shard_bits: u8,
    partitioning: Partitioning,
    skip_unreadable: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            ksize: 31,
            threads: 1,
            shard_bits: DEFAULT_SHARD_BITS,
            partitioning: Partitioning::Static,
            skip_unreadable: false,
        }
    }
}

impl CounterConfig {
    /// K-mer size of the signatures to read (default: 31).
    pub fn with_ksize(mut self, k: u32) -> Self {
        self.ksize = k;
        self
    }
    /// Number of worker threads for accumulation (default: 1).
    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }
    /// Number of shard bits; the counter uses `2^bits` shards (default: 10).
    pub fn with_shard_bits(mut self, b: u8) -> Self {
        self.shard_bits = b.clamp(1, MAX_SHARD_BITS);
        self
    }
    /// File partitioning strategy.
    pub fn partitioning(mut self, p: Partitioning) -> Self {
        self.partitioning = p;
        self
    }
    /// Log and skip files that fail to read or parse instead of aborting.
    pub fn skip_unreadable(mut self, yes: bool) -> Self {
        self.skip_unreadable = yes;
        self
    }

    #[inline]
    pub fn ksize(&self) -> u32 {
        self.ksize
    }
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }
    pub(crate) fn shard_bits(&self) -> u8 {
        self.shard_bits
    }
    pub(crate) fn partitioning_mode(&self) -> Partitioning {
        self.partitioning
    }
    pub(crate) fn skips_unreadable(&self) -> bool {
        self.skip_unreadable
    }
}
