//! `HashesCounter`: accumulation over sketch files, error extraction and
//! filtration.
//!
//! Lifecycle: construct (paths validated) → [`HashesCounter::start_errors_extraction`]
//! (workers observe every hash, join, freeze, extract singletons) →
//! [`HashesCounter::initialize_sigs_filtration`] → any number of concurrent
//! [`HashesCounter::filter_sig_return_kmers`] calls.

use log::{debug, info, warn};
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{CounterConfig, Partitioning};
use crate::counter::{FrozenCounts, ShardedCounter};
use crate::dump::write_counts_dump;
use crate::error::ExtractError;
use crate::filter::{ErrorSet, extract_singletons};
use crate::sketch::{SketchReader, is_readable_file, validate_paths};

/// Split `0..len` into at most `parts` contiguous, non-overlapping, non-empty
/// ranges whose sizes differ by at most one. Earlier ranges take the extra item.
pub fn partition_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1).min(len);
    if parts == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let extra = len % parts;
    let mut out = Vec::with_capacity(parts);
    let mut start = 0usize;
    for i in 0..parts {
        let end = start + base + usize::from(i < extra);
        out.push(start..end);
        start = end;
    }
    out
}

/// Read `paths` one after another, observing every hash. Returns the number
/// of observations.
fn count_files(
    reader: SketchReader,
    counter: &ShardedCounter,
    paths: &[PathBuf],
    skip_unreadable: bool,
) -> Result<u64, ExtractError> {
    let mut observed = 0u64;
    for path in paths {
        match reader.read(path) {
            Ok(hashes) => {
                let n = counter.observe_many(hashes);
                debug!("{}: {} hashes", path.display(), n);
                observed += n;
            }
            Err(e) if skip_unreadable => warn!("skipping {}: {e}", path.display()),
            Err(e) => return Err(e),
        }
    }
    Ok(observed)
}

/// Error-hash extraction engine over a fixed set of sketch files.
pub struct HashesCounter {
    config: CounterConfig,
    sig_paths: Vec<PathBuf>,
    counts: Option<FrozenCounts>,
    error_hashes: Vec<u64>,
    error_set: Option<ErrorSet>,
}

impl HashesCounter {
    /// Create an engine over `sig_paths`. Fails with
    /// [`ExtractError::InvalidInput`] naming every path that is not a
    /// readable file.
    pub fn new<I, P>(config: CounterConfig, sig_paths: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let sig_paths: Vec<PathBuf> = sig_paths.into_iter().map(Into::into).collect();
        validate_paths(&sig_paths)?;
        Ok(Self {
            config,
            sig_paths,
            counts: None,
            error_hashes: Vec::new(),
            error_set: None,
        })
    }

    #[inline]
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn sig_paths(&self) -> &[PathBuf] {
        &self.sig_paths
    }

    /// Count every hash of every input file, then extract the singletons.
    ///
    /// Must be called once; later calls keep the existing counts and return
    /// `Ok(())`. On failure nothing is kept and the engine stays unfrozen.
    pub fn start_errors_extraction(&mut self) -> Result<(), ExtractError> {
        if self.counts.is_some() {
            warn!("errors already extracted; ignoring repeated extraction request");
            return Ok(());
        }

        let started = Instant::now();
        let reader = SketchReader::new(self.config.ksize());
        let counter = ShardedCounter::new(self.config.shard_bits());
        let threads = self.config.threads().min(self.sig_paths.len()).max(1);
        let skip = self.config.skips_unreadable();
        info!(
            "counting {} sketch files at k={} on {} thread(s), {} shards",
            self.sig_paths.len(),
            reader.ksize(),
            threads,
            counter.shard_count()
        );

        let observed = if threads == 1 {
            count_files(reader, &counter, &self.sig_paths, skip)?
        } else {
            match self.config.partitioning_mode() {
                Partitioning::Static => {
                    count_static(reader, &counter, &self.sig_paths, threads, skip)?
                }
                Partitioning::WorkStealing => {
                    count_work_stealing(reader, &counter, &self.sig_paths, threads, skip)?
                }
            }
        };

        let counts = counter.freeze();
        let errors = extract_singletons(&counts);
        info!(
            "counted {} observations, {} distinct hashes, {} error hashes in {:.2?}",
            observed,
            counts.len(),
            errors.len(),
            started.elapsed()
        );
        for (count, hashes) in counts.count_histogram().iter().take(8) {
            info!("count {count}: {hashes} hashes");
        }

        self.counts = Some(counts);
        self.error_hashes = errors;
        Ok(())
    }

    /// Hashes observed exactly once. Empty before extraction.
    pub fn get_error_hashes(&self) -> &[u64] {
        &self.error_hashes
    }

    /// Frozen counts, once extraction has run.
    pub fn counts(&self) -> Option<&FrozenCounts> {
        self.counts.as_ref()
    }

    pub fn error_set(&self) -> Option<&ErrorSet> {
        self.error_set.as_ref()
    }

    /// Build the error set used by [`Self::filter_sig_return_kmers`].
    ///
    /// A readable `path` is loaded as a reference sketch whose every hash is an
    /// error. Otherwise the extracted error hashes are used; if there are none,
    /// fails with [`ExtractError::NoErrorHashes`]. The set is built once.
    pub fn initialize_sigs_filtration(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<(), ExtractError> {
        if self.error_set.is_some() {
            warn!("sketch filtration already initialized; keeping the existing error set");
            return Ok(());
        }
        let path = path.as_ref();
        let set = if is_readable_file(path) {
            info!("loading error hashes from reference {}", path.display());
            ErrorSet::from_reference_file(path, self.config.ksize())?
        } else if self.error_hashes.is_empty() {
            return Err(ExtractError::NoErrorHashes {
                reference: path.to_path_buf(),
            });
        } else {
            ErrorSet::from_singletons(&self.error_hashes)
        };
        info!("filtration ready with {} error hashes", set.len());
        self.error_set = Some(set);
        Ok(())
    }

    /// Hashes of the sketch at `path` that are in the error set, in sketch
    /// order. Empty if filtration was not initialized.
    pub fn filter_sig_return_kmers(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u64>, ExtractError> {
        let Some(set) = &self.error_set else {
            warn!("filter requested before filtration was initialized");
            return Ok(Vec::new());
        };
        let hashes = SketchReader::new(self.config.ksize()).read(path.as_ref())?;
        Ok(set.retain_errors(hashes))
    }

    /// Write `<hash>\t<count>` lines for every counted hash. Before extraction
    /// the file is created empty. Returns lines written.
    pub fn dump_kmers_to_file(&self, path: impl AsRef<Path>) -> Result<u64, ExtractError> {
        let path = path.as_ref();
        let lines = match &self.counts {
            Some(counts) => write_counts_dump(counts, path)?,
            None => {
                warn!("dump requested before extraction; writing an empty table");
                write_counts_dump(&FrozenCounts::default(), path)?
            }
        };
        info!("wrote {} counts to {}", lines, path.display());
        Ok(lines)
    }
}

fn count_static(
    reader: SketchReader,
    counter: &ShardedCounter,
    paths: &[PathBuf],
    threads: usize,
    skip: bool,
) -> Result<u64, ExtractError> {
    let results: Vec<Result<u64, ExtractError>> = std::thread::scope(|s| {
        let handles: Vec<_> = partition_ranges(paths.len(), threads)
            .into_iter()
            .map(|range| {
                let files = &paths[range];
                s.spawn(move || count_files(reader, counter, files, skip))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
            .collect()
    });
    results.into_iter().sum()
}

fn count_work_stealing(
    reader: SketchReader,
    counter: &ShardedCounter,
    paths: &[PathBuf],
    threads: usize,
    skip: bool,
) -> Result<u64, ExtractError> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    // Results stay in file order: the first failing file is reported.
    let results: Vec<Result<u64, ExtractError>> = pool.install(|| {
        paths
            .par_iter()
            .map(|p| count_files(reader, counter, std::slice::from_ref(p), skip))
            .collect()
    });
    results.into_iter().sum()
}
