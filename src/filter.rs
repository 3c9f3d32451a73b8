//! Error hashes: singleton extraction and the frozen membership set.

use ahash::AHashSet;
use std::path::Path;

use crate::counter::FrozenCounts;
use crate::error::ExtractError;
use crate::sketch::SketchReader;

/// Every hash observed exactly once, in unspecified order.
pub fn extract_singletons(counts: &FrozenCounts) -> Vec<u64> {
    counts
        .iter()
        .filter_map(|(h, c)| (c == 1).then_some(h))
        .collect()
}

/// Immutable set of error hashes.
#[derive(Clone, Debug, Default)]
pub struct ErrorSet {
    hashes: AHashSet<u64>,
}

impl ErrorSet {
    /// Build from a list of singleton hashes.
    pub fn from_singletons(hashes: &[u64]) -> Self {
        let mut set = AHashSet::with_capacity(hashes.len());
        set.extend(hashes.iter().copied());
        Self { hashes: set }
    }

    /// Treat every hash of `path` at `ksize` as an error, without any
    /// frequency filtering.
    pub fn from_reference_file(path: &Path, ksize: u32) -> Result<Self, ExtractError> {
        let hashes: Vec<u64> = SketchReader::new(ksize).read(path)?.collect();
        Ok(Self::from_singletons(&hashes))
    }

    #[inline]
    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.contains(&hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Members of `hashes`, input order kept.
    pub fn retain_errors<I: IntoIterator<Item = u64>>(&self, hashes: I) -> Vec<u64> {
        hashes.into_iter().filter(|&h| self.contains(h)).collect()
    }
}
