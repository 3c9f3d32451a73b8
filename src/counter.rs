//! Sharded concurrent hash → count table.
//!
//! The key space is split into `2^shard_bits` shards; each shard is an
//! `AHashMap` behind its own mutex. A key always lands in the same shard
//! (top bits of a Fibonacci-mixed key), so increments to one key are
//! serialized by that shard's lock while other shards proceed in parallel.
//!
//! Reading is only possible after [`ShardedCounter::freeze`], which consumes
//! the counter: no observer can still be running once counts are visible.

use ahash::AHashMap;
use parking_lot::Mutex;

/// Upper bound for `shard_bits` (65536 shards).
pub const MAX_SHARD_BITS: u8 = 16;
/// Default `shard_bits` (1024 shards).
pub const DEFAULT_SHARD_BITS: u8 = 10;

const FIB_MUL: u64 = 0x9E37_79B9_7F4A_7C15;

/// Shard id of `hash`: top `bits` bits of the mixed key.
#[inline]
pub fn shard_id(hash: u64, bits: u8) -> usize {
    let bits = bits.clamp(1, MAX_SHARD_BITS);
    (hash.wrapping_mul(FIB_MUL) >> (64 - bits as u32)) as usize
}

/// Accumulation-phase counter. Shared by reference between worker threads.
pub struct ShardedCounter {
    shard_bits: u8,
    shards: Vec<Mutex<AHashMap<u64, u32>>>,
}

impl ShardedCounter {
    pub fn new(shard_bits: u8) -> Self {
        let shard_bits = shard_bits.clamp(1, MAX_SHARD_BITS);
        let shards = (0..1usize << shard_bits)
            .map(|_| Mutex::new(AHashMap::new()))
            .collect();
        Self { shard_bits, shards }
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Increment `hash` by one, inserting it with count 1 if absent.
    #[inline]
    pub fn observe(&self, hash: u64) {
        let mut shard = self.shards[shard_id(hash, self.shard_bits)].lock();
        *shard.entry(hash).or_insert(0) += 1;
    }

    /// Observe every hash of `hashes`.
    pub fn observe_many<I: IntoIterator<Item = u64>>(&self, hashes: I) -> u64 {
        let mut n = 0u64;
        for h in hashes {
            self.observe(h);
            n += 1;
        }
        n
    }

    /// End accumulation and hand out the read-only table.
    pub fn freeze(self) -> FrozenCounts {
        FrozenCounts {
            shards: self.shards.into_iter().map(Mutex::into_inner).collect(),
        }
    }
}

impl Default for ShardedCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SHARD_BITS)
    }
}

/// Read-only counts after accumulation.
#[derive(Default)]
pub struct FrozenCounts {
    shards: Vec<AHashMap<u64, u32>>,
}

impl FrozenCounts {
    /// Number of distinct hashes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Count of `hash`; `None` if never observed. Never inserts.
    pub fn get(&self, hash: u64) -> Option<u32> {
        if self.shards.is_empty() {
            return None;
        }
        let bits = self.shards.len().trailing_zeros() as u8;
        self.shards[shard_id(hash, bits)].get(&hash).copied()
    }

    /// `(hash, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.shards
            .iter()
            .flat_map(|s| s.iter().map(|(&h, &c)| (h, c)))
    }

    /// Sum of all counts.
    pub fn total_observations(&self) -> u64 {
        self.iter().map(|(_, c)| c as u64).sum()
    }

    /// Number of distinct hashes per observed count, ascending by count.
    pub fn count_histogram(&self) -> Vec<(u32, u64)> {
        let mut hist: AHashMap<u32, u64> = AHashMap::new();
        for (_, c) in self.iter() {
            *hist.entry(c).or_insert(0) += 1;
        }
        let mut out: Vec<(u32, u64)> = hist.into_iter().collect();
        out.sort_unstable();
        out
    }
}
