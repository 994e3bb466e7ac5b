//! # Shared Filter Access
//!
//! Filters carry no internal locking. These flows wrap them in a
//! read-write lock: concurrent `includes`, serialised `insert`/`merge`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use parking_lot::RwLock;
    use rand::Rng;
    use scalable_bloom::{FixedFilter, Metrics, ScalableFilter};

    #[test]
    fn test_concurrent_readers_single_writer() {
        let filter = Arc::new(RwLock::new(ScalableFilter::new(128, 0.01)));

        let writer = {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for key in 0..5_000u64 {
                    filter.write().insert(&key);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    let mut hits = 0usize;
                    for _ in 0..2_000 {
                        let key: u64 = rng.gen_range(0..5_000);
                        if filter.read().includes(&key) {
                            hits += 1;
                        }
                    }
                    hits
                })
            })
            .collect();

        writer.join().expect("writer panicked");
        for reader in readers {
            reader.join().expect("reader panicked");
        }

        let filter = filter.read();
        assert!((0..5_000u64).all(|k| filter.includes(&k)));
        assert!(filter.len() > 1);
    }

    #[test]
    fn test_parallel_shard_build_then_merge() {
        let shards: Vec<_> = (0..4u64)
            .map(|shard| {
                thread::spawn(move || {
                    let mut filter = FixedFilter::new(8_000, 0.01);
                    for key in (shard * 2_000)..((shard + 1) * 2_000) {
                        filter.insert(&key);
                    }
                    filter
                })
            })
            .collect();

        let metrics = Metrics::new();
        let combined = Arc::new(RwLock::new(FixedFilter::new(8_000, 0.01)));
        for handle in shards {
            let shard = handle.join().expect("shard builder panicked");
            let result = combined.write().merge(&shard);
            metrics.record_merge(result.is_ok());
        }

        // A shard built for a different capacity cannot join the union
        let stray = FixedFilter::new(1_000, 0.01);
        let result = combined.write().merge(&stray);
        metrics.record_merge(result.is_ok());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.filters_merged, 4);
        assert_eq!(snapshot.merges_rejected, 1);

        let combined = combined.read();
        assert!((0..8_000u64).all(|k| combined.includes(&k)));
    }
}
