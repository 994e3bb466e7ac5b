//! # Integration Test Flows
//!
//! Exercises the public `scalable-bloom` surface the way an embedding
//! application would, and drives the calibration harness end to end.
//!
//! ## Flows Tested:
//!
//! 1. **Configuration → filter**: `FilterConfigBuilder` feeding `AnyFilter`
//! 2. **Generic callers**: one dedup routine over fixed and scalable filters
//! 3. **Sharded build + merge**: partitions built separately, unioned after
//! 4. **Calibration**: harness report rendered as JSON

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bloom_calibrate::{calibrate, CalibrationSettings};
    use scalable_bloom::{
        AnyFilter, FilterConfigBuilder, FilterError, FilterKind, FixedFilter, MembershipFilter,
        Metrics, Murmur3Hash, ScalableFilter,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Pass through keys that the filter has not seen, in order
    ///
    /// Checks `includes` before inserting: a scalable chain only consults its
    /// active member on insert, so `insert` alone may re-admit an old key.
    fn dedup<F: MembershipFilter>(filter: &mut F, stream: &[u64]) -> Vec<u64> {
        let mut passed = Vec::new();
        for key in stream {
            if !filter.includes(key) {
                filter.insert(key);
                passed.push(*key);
            }
        }
        passed
    }

    fn stream_with_repeats(unique: u64) -> Vec<u64> {
        // Every key appears twice, the second time much later
        (0..unique).chain(0..unique).collect()
    }

    // =============================================================================
    // CONFIGURATION → FILTER
    // =============================================================================

    #[test]
    fn test_configured_fixed_filter_scenario() {
        let config = FilterConfigBuilder::new()
            .capacity(50)
            .failure_rate(0.001)
            .kind(FilterKind::Fixed)
            .build()
            .expect("valid configuration");

        let mut filter = AnyFilter::from_config(&config).unwrap();
        let fixed = filter.as_fixed().expect("fixed kind requested");
        assert_eq!(fixed.num_bits(), 719);
        assert_eq!(fixed.hash_count(), 10);

        for key in 0..50u64 {
            filter.insert(&key);
        }

        assert_eq!(filter.count(), 50);
        assert!(filter.includes(&25u64));
        let false_positives = (50..100u64).filter(|k| filter.includes(k)).count();
        assert!(false_positives <= 2, "false positives {}", false_positives);
    }

    #[test]
    fn test_configured_scalable_filter_grows() {
        let config = FilterConfigBuilder::new()
            .capacity(10)
            .failure_rate(0.0001)
            .kind(FilterKind::Scalable)
            .build()
            .unwrap();
        let mut filter = AnyFilter::from_config(&config).unwrap();

        for key in 0..11u64 {
            filter.insert(&key);
        }

        let chain = filter.as_scalable().expect("scalable kind requested");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.active().capacity(), 20);
    }

    // =============================================================================
    // GENERIC CALLERS
    // =============================================================================

    #[test]
    fn test_dedup_never_passes_a_repeat() {
        let stream = stream_with_repeats(5_000);

        let mut fixed = FixedFilter::new(5_000, 0.01);
        let mut scalable = ScalableFilter::new(256, 0.01);

        for output in [dedup(&mut fixed, &stream), dedup(&mut scalable, &stream)] {
            let unique: HashSet<u64> = output.iter().copied().collect();
            assert_eq!(unique.len(), output.len(), "a repeated key was passed through");
            // False positives may drop a few genuinely new keys
            assert!(output.len() >= 4_900, "only {} keys passed", output.len());
        }
    }

    // =============================================================================
    // SHARDED BUILD + MERGE
    // =============================================================================

    #[test]
    fn test_sharded_fixed_filters_merge_into_union() {
        let shards: Vec<FixedFilter> = (0..4u64)
            .map(|shard| {
                let mut filter = FixedFilter::new(4_000, 0.01);
                for key in (shard * 1_000)..((shard + 1) * 1_000) {
                    filter.insert(&key);
                }
                filter
            })
            .collect();

        let mut combined = FixedFilter::new(4_000, 0.01);
        for shard in &shards {
            combined.merge(shard).expect("shards share parameters");
        }

        assert!((0..4_000u64).all(|k| combined.includes(&k)));
        let false_positives = (4_000..14_000u64).filter(|k| combined.includes(k)).count();
        assert!(false_positives < 200, "false positives {}", false_positives);
    }

    #[test]
    fn test_differently_sized_shards_are_rejected() {
        let mut combined = FixedFilter::new(4_000, 0.01);
        let odd = FixedFilter::new(3_000, 0.01);

        let err = combined.merge(&odd).unwrap_err();
        assert!(matches!(err, FilterError::IncompatibleFilter { .. }));
        assert!(err.to_string().contains("num_bits"));
    }

    #[test]
    fn test_scalable_chains_merge_without_false_negatives() {
        let mut east = ScalableFilter::new(64, 0.01);
        let mut west = ScalableFilter::new(64, 0.01);
        for key in 0..1_000u64 {
            east.insert(&key);
            west.insert(&(key + 1_000_000));
        }
        let members = east.len() + west.len();

        east.merge(&west).unwrap();

        assert_eq!(east.len(), members);
        assert!((0..1_000u64).all(|k| east.includes(&k) && east.includes(&(k + 1_000_000))));
    }

    #[test]
    fn test_mixed_kinds_are_type_mismatch() {
        let mut fixed = AnyFilter::from(FixedFilter::new(100, 0.01));
        let scalable = AnyFilter::from(ScalableFilter::new(100, 0.01));

        assert_eq!(
            fixed.merge(&scalable),
            Err(FilterError::TypeMismatch {
                expected: FilterKind::Fixed,
                found: FilterKind::Scalable,
            })
        );
    }

    // =============================================================================
    // CALIBRATION
    // =============================================================================

    #[test]
    fn test_calibration_report_as_json() {
        let settings = CalibrationSettings {
            config: FilterConfigBuilder::new()
                .capacity(5_000)
                .failure_rate(0.01)
                .kind(FilterKind::Fixed)
                .build()
                .unwrap(),
            sample_size: 5_000,
            trials: 3,
        };
        let metrics = Metrics::new();

        let report = calibrate(&settings, Murmur3Hash::new(), &metrics).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["kind"], "fixed");
        assert_eq!(json["sample_size"], 5_000);
        assert_eq!(json["trials"].as_array().map(Vec::len), Some(3));
        assert!(report.within(1.5), "ratio {}", report.ratio_to_target);
        assert_eq!(metrics.snapshot().lookups_performed, 15_000);
    }
}
