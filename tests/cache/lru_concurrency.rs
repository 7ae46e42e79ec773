use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use lrukit::cache::concurrent::ConcurrentLRUCache;
use lrukit::cache::lru::LRUCache;
use parking_lot::Mutex;

use crate::common::logger::init_test_logger;

// ==============================================
// LRU CONCURRENCY TESTS (integration)
// ==============================================

// Externally locked core cache
mod thread_safety {
    use super::*;

    type ThreadSafeLRU<K, V> = Arc<Mutex<LRUCache<K, V>>>;

    #[test]
    fn test_concurrent_insert_operations() {
        init_test_logger();
        let cache: ThreadSafeLRU<u64, u64> = Arc::new(Mutex::new(LRUCache::new(256).unwrap()));
        let threads = 8;
        let inserts_per_thread = 120;
        let inserted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let cache = cache.clone();
                let inserted = inserted.clone();
                thread::spawn(move || {
                    for i in 0..inserts_per_thread {
                        let key = t as u64 * 1_000 + i as u64;
                        cache.lock().put(key, key * 2);
                        inserted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(inserted.load(Ordering::SeqCst), threads * inserts_per_thread);
        let guard = cache.lock();
        assert_eq!(guard.len(), guard.capacity());
    }

    #[test]
    fn test_concurrent_get_operations() {
        init_test_logger();
        let cache: ThreadSafeLRU<u64, u64> = Arc::new(Mutex::new(LRUCache::new(128).unwrap()));
        {
            let mut guard = cache.lock();
            for i in 0..128 {
                guard.put(i, i * 10);
            }
        }

        let threads = 12;
        let reads_per_thread = 300;
        let hits = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = cache.clone();
                let hits = hits.clone();
                thread::spawn(move || {
                    for i in 0..reads_per_thread {
                        let key = (i % 128) as u64;
                        if cache.lock().get(&key) == Some(&(key * 10)) {
                            hits.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(hits.load(Ordering::Relaxed), threads * reads_per_thread);
        assert_eq!(cache.lock().len(), 128);
    }
}

// Internally synchronized wrapper
mod stress_testing {
    use super::*;

    #[test]
    fn test_mixed_operations_keep_bounds() {
        init_test_logger();
        let cache: Arc<ConcurrentLRUCache<u64, u64>> =
            Arc::new(ConcurrentLRUCache::new(64).unwrap());
        let threads = 10;
        let ops_per_thread = 500;

        let handles: Vec<_> = (0..threads)
            .map(|tid| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..ops_per_thread {
                        let key = ((tid * 37 + i) % 200) as u64;
                        match (tid + i) % 5 {
                            0 | 1 => {
                                cache.put(key, key);
                            }
                            2 => {
                                if let Some(value) = cache.get(&key) {
                                    assert_eq!(*value, key);
                                }
                            }
                            3 => {
                                let _ = cache.contains(&key);
                            }
                            _ => {
                                let _ = cache.remove(&key);
                            }
                        }
                        assert!(cache.len() <= 64);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert!(cache.len() <= cache.capacity());
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, stats.gets);
    }

    #[test]
    fn test_clear_during_writes() {
        init_test_logger();
        let cache: Arc<ConcurrentLRUCache<u64, u64>> =
            Arc::new(ConcurrentLRUCache::new(16).unwrap());

        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    cache.put(i, i);
                }
            })
        };
        let clearer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    cache.clear();
                }
            })
        };

        writer.join().unwrap();
        clearer.join().unwrap();

        assert!(cache.len() <= 16);
        cache.clear();
        assert!(cache.is_empty());
    }
}
