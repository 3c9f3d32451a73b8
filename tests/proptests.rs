mod common;

use common::write_sig;
use extract_errors::*;
use proptest::prelude::*;
use std::collections::HashMap;

/// Naive single-threaded tally for baseline.
fn naive_counts(files: &[Vec<u64>]) -> HashMap<u64, u32> {
    let mut h = HashMap::new();
    for f in files {
        for &x in f {
            *h.entry(x).or_insert(0u32) += 1;
        }
    }
    h
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_counts_independent_of_threads(
        files in prop::collection::vec(prop::collection::vec(0u64..64, 0..40), 1..10),
        threads in 1usize..6,
        shard_bits in 1u8..6,
        work_stealing in any::<bool>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(i, mins)| write_sig(&dir, &format!("f{i}"), 31, mins))
            .collect();
        let partitioning = if work_stealing {
            Partitioning::WorkStealing
        } else {
            Partitioning::Static
        };
        let cfg = CounterConfig::default()
            .with_threads(threads)
            .with_shard_bits(shard_bits)
            .partitioning(partitioning);
        let mut hc = HashesCounter::new(cfg, &paths).unwrap();
        hc.start_errors_extraction().unwrap();

        let baseline = naive_counts(&files);
        let got: HashMap<u64, u32> = hc.counts().unwrap().iter().collect();
        prop_assert_eq!(&got, &baseline);

        let mut errors = hc.get_error_hashes().to_vec();
        errors.sort_unstable();
        let mut expected: Vec<u64> = baseline
            .iter()
            .filter_map(|(&h, &c)| (c == 1).then_some(h))
            .collect();
        expected.sort_unstable();
        prop_assert_eq!(errors, expected);
    }

    #[test]
    fn prop_partition_is_contiguous_and_balanced(len in 0usize..500, parts in 0usize..40) {
        let ranges = partition_ranges(len, parts);
        let mut next = 0usize;
        for r in &ranges {
            prop_assert_eq!(r.start, next);
            prop_assert!(r.end > r.start);
            next = r.end;
        }
        prop_assert_eq!(next, len);
        prop_assert!(ranges.len() <= parts.max(1));
        if let (Some(min), Some(max)) = (
            ranges.iter().map(|r| r.len()).min(),
            ranges.iter().map(|r| r.len()).max(),
        ) {
            prop_assert!(max - min <= 1);
        }
    }

    #[test]
    fn prop_filter_is_ordered_intersection(
        errors in prop::collection::vec(any::<u64>(), 0..50),
        sketch in prop::collection::vec(0u64..100, 0..80),
    ) {
        let set = ErrorSet::from_singletons(&errors);
        let before = set.len();
        let kept = set.retain_errors(sketch.iter().copied());
        let expected: Vec<u64> = sketch.iter().copied().filter(|h| errors.contains(h)).collect();
        prop_assert_eq!(kept, expected);
        prop_assert_eq!(set.len(), before);
    }
}
