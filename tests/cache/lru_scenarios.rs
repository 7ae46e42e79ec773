use lrukit::cache::cache_traits::{CoreCache, LRUCacheTrait};
use lrukit::cache::lru::LRUCache;
use lrukit::common::exception::CacheError;

use crate::common::logger::init_test_logger;
use crate::{assert_err, assert_ok};

// ==============================================
// LRU EVICTION SCENARIOS (integration)
// ==============================================

mod eviction_scenarios {
    use super::*;

    #[test]
    fn test_get_protects_entry_from_eviction() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(3));
        cache.put('a', 1);
        cache.put('b', 2);
        cache.put('c', 3);
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.get(&'a'), Some(&1));
        cache.put('d', 4);

        assert_eq!(cache.get(&'b'), None);
        assert_eq!(cache.get(&'a'), Some(&1));
        assert_eq!(cache.get(&'c'), Some(&3));
        assert_eq!(cache.get(&'d'), Some(&4));
    }

    #[test]
    fn test_update_is_not_growth() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(2));
        cache.put('x', 1);
        cache.put('y', 2);
        cache.put('x', 10);

        assert_eq!(cache.get(&'x'), Some(&10));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_single_slot_cache() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(1));
        cache.put('a', 1);
        cache.put('b', 2);

        assert_eq!(cache.get(&'a'), None);
        assert_eq!(cache.get(&'b'), Some(&2));
    }

    #[test]
    fn test_untouched_cache() {
        init_test_logger();
        let mut cache: LRUCache<&str, i32> = assert_ok!(LRUCache::new(5));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&"anything"), None);
        cache.clear();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_zero_capacity_produces_no_cache() {
        init_test_logger();
        let result: Result<LRUCache<&str, i32>, CacheError> = LRUCache::new(0);
        assert_err!(result);
        assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
    }

    #[test]
    fn test_contains_probe_is_invisible() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(2));
        cache.put("a", 1);
        cache.put("b", 2);

        for _ in 0..5 {
            assert!(!cache.contains(&"k"));
            assert!(cache.contains(&"a"));
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek_lru(), Some((&"a", &1)));

        cache.put("c", 3);
        assert!(!cache.contains(&"a"));
    }

    #[test]
    fn test_back_to_back_inserts_evict_in_insertion_order() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(4));
        for key in 0..4 {
            cache.put(key, key);
        }
        for (next, expected_victim) in (4..8).zip(0..4) {
            let evicted = cache.put_evicting(next, next);
            assert_eq!(evicted, Some((expected_victim, expected_victim)));
        }
    }
}

mod invariants {
    use super::*;

    // Generic over the trait seam so any LRU implementation can be checked
    fn drive<C: LRUCacheTrait<u32, u32>>(cache: &mut C, ops: &[(u8, u32)]) {
        let capacity = cache.capacity();
        for &(op, key) in ops {
            match op % 4 {
                0 | 1 => {
                    cache.put(key, key * 10);
                    assert_eq!(cache.get(&key), Some(&(key * 10)));
                }
                2 => {
                    let _ = cache.get(&key);
                }
                _ => {
                    let _ = cache.contains(&key);
                }
            }
            assert!(cache.len() <= capacity);
            assert_eq!(cache.capacity(), capacity);
        }
    }

    #[test]
    fn test_size_bounded_and_capacity_fixed() {
        init_test_logger();
        let ops: Vec<(u8, u32)> = (0..500u32).map(|i| ((i % 7) as u8, (i * 31) % 23)).collect();

        for capacity in [1, 2, 5, 10, 50] {
            let mut cache = assert_ok!(LRUCache::new(capacity));
            drive(&mut cache, &ops);
        }
    }

    #[test]
    fn test_clear_empties_every_key() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(8));
        for key in 0..8u32 {
            cache.put(key, key);
        }
        cache.clear();

        assert_eq!(cache.len(), 0);
        for key in 0..8u32 {
            assert_eq!(cache.get(&key), None);
        }
    }

    #[test]
    fn test_evicts_exactly_the_least_recent() {
        init_test_logger();
        let mut cache = assert_ok!(LRUCache::new(3));
        cache.put(1, ());
        cache.put(2, ());
        cache.put(3, ());
        cache.get(&1);
        cache.put(2, ());
        cache.contains(&3);

        // Recency now (least first): 3, 1, 2
        assert_eq!(cache.put_evicting(4, ()), Some((3, ())));
        assert_eq!(cache.put_evicting(5, ()), Some((1, ())));
        assert_eq!(cache.put_evicting(6, ()), Some((2, ())));
    }
}
