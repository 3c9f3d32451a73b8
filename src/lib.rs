//! Error k-mer extraction over MinHash sketch collections.
//!
//! Hashes observed exactly once across a corpus of sketch files are treated
//! as sequencing errors. The engine
//! - counts every hash of every input sketch in a sharded concurrent table,
//! - extracts the singletons once all workers have joined,
//! - filters new sketches against the resulting error set.
//!
//! An error set can also be loaded directly from a reference sketch whose
//! every hash is taken as an error.
//!
//! See [`HashesCounter`] for the lifecycle.

pub mod config;
pub mod counter;
pub mod dump;
mod engine;
mod error;
pub mod filter;
pub mod sketch;

pub use config::{CounterConfig, Partitioning};
pub use counter::{FrozenCounts, ShardedCounter};
pub use dump::{read_counts_dump, write_counts_dump, write_hash_list};
pub use engine::{HashesCounter, partition_ranges};
pub use error::ExtractError;
pub use filter::{ErrorSet, extract_singletons};
pub use sketch::{SketchHashes, SketchReader, is_readable_file, validate_paths};
