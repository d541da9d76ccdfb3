//! Unit and property tests for `HashEngine`.
//!
//! The multi-thread tests follow `chashmap::tests`'s `thread::spawn` +
//! `join` idiom directly; the randomized-oracle and scenario tests follow
//! the end-to-end scenarios laid out in the engine's testable-properties
//! section.

use crate::{Error, HashEngine, Stats};
use std::collections::HashMap as StdHashMap;
use std::sync::Arc;
use std::thread;

fn test_log() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

fn engine(initial_count: usize) -> HashEngine {
    HashEngine::init(initial_count, test_log()).unwrap()
}

#[test]
fn init_rejects_zero_buckets() {
    match HashEngine::init(0, test_log()) {
        Err(Error::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn put_rejects_empty_key_or_value() {
    let e = engine(16);
    assert!(matches!(e.put(b"", b"v"), Err(Error::InvalidArgument(_))));
    assert!(matches!(e.put(b"k", b""), Err(Error::InvalidArgument(_))));
}

#[test]
fn get_missing_key_not_found() {
    let e = engine(16);
    assert!(matches!(e.get(b"nope"), Err(Error::NotFound)));
}

#[test]
fn delete_missing_key_not_found() {
    let e = engine(16);
    assert!(matches!(e.delete(b"nope"), Err(Error::NotFound)));
}

// Scenario 1 (§8): tombstone reuse.
#[test]
fn tombstone_reuse() {
    let e = engine(16);
    e.put(b"a", b"1").unwrap();
    e.put(b"b", b"2").unwrap();
    e.delete(b"a").unwrap();
    e.put(b"c", b"3").unwrap();

    assert!(matches!(e.get(b"a"), Err(Error::NotFound)));
    assert_eq!(e.get(b"b").unwrap(), b"2");
    assert_eq!(e.get(b"c").unwrap(), b"3");
    assert_eq!(e.stats().item_count, 2);
}

// Scenario 2 (§8): replacing a value updates memory accounting without
// touching item_count.
#[test]
fn replace_value_accounting() {
    let e = engine(16);
    e.put(b"k", b"v1").unwrap();
    e.put(b"k", b"v22").unwrap();

    let Stats { item_count, total_memory, .. } = e.stats();
    assert_eq!(item_count, 1);
    assert_eq!(total_memory, 1 + 3);
    assert_eq!(e.get(b"k").unwrap(), b"v22");
}

// Law (§8): put(k,v1); put(k,v2); get(k) = v2, item_count +1 across the pair.
#[test]
fn put_put_get_law() {
    let e = engine(16);
    let before = e.stats().item_count;
    e.put(b"k", b"v1").unwrap();
    e.put(b"k", b"v2").unwrap();
    assert_eq!(e.get(b"k").unwrap(), b"v2");
    assert_eq!(e.stats().item_count, before + 1);
}

// Law (§8): put(k,v); delete(k); get(k) = NotFound, item_count returns to
// its pre-put value.
#[test]
fn put_delete_roundtrip_law() {
    let e = engine(16);
    let before = e.stats().item_count;
    e.put(b"k", b"v").unwrap();
    e.delete(b"k").unwrap();
    assert!(matches!(e.get(b"k"), Err(Error::NotFound)));
    assert_eq!(e.stats().item_count, before);
}

// Scenario 3 (§8): grow under load.
#[test]
fn grow_under_load_keeps_all_keys_visible() {
    let e = engine(8);
    for i in 0..24 {
        let key = format!("key{i:02}");
        e.put(key.as_bytes(), b"v").unwrap();
    }

    let stats = e.stats();
    assert_eq!(stats.item_count, 24);
    assert!(stats.bucket_count >= 16, "expected growth, got {}", stats.bucket_count);

    for i in 0..24 {
        let key = format!("key{i:02}");
        assert_eq!(e.get(key.as_bytes()).unwrap(), b"v");
    }
}

// Scenario 4 (§8): shrink under deletion, values remain reachable throughout.
#[test]
fn shrink_under_deletion_keeps_remaining_keys_visible() {
    let e = engine(8);
    for i in 0..24 {
        let key = format!("key{i:02}");
        e.put(key.as_bytes(), b"v").unwrap();
    }
    let grown = e.stats().bucket_count;

    for i in 0..22 {
        let key = format!("key{i:02}");
        e.delete(key.as_bytes()).unwrap();
    }

    // Keep touching the engine so cooperative migration/shrink triggers run.
    for _ in 0..64 {
        let _ = e.get(b"key22");
    }

    assert_eq!(e.get(b"key22").unwrap(), b"v");
    assert_eq!(e.get(b"key23").unwrap(), b"v");
    assert_eq!(e.stats().item_count, 2);
    assert!(
        e.stats().bucket_count <= grown,
        "expected bucket_count to shrink back down from the grown size"
    );
}

// Boundary: repeated insert/delete cycles must not leak accounted memory.
#[test]
fn repeated_cycles_return_to_memory_baseline() {
    let e = engine(16);
    let baseline = e.stats().total_memory;

    for round in 0..50 {
        let key = format!("cycle{round}");
        e.put(key.as_bytes(), b"value").unwrap();
        e.delete(key.as_bytes()).unwrap();
    }

    assert_eq!(e.stats().total_memory, baseline);
    assert_eq!(e.stats().item_count, 0);
}

// Law: a random mix of put/get/delete matches a serial oracle map.
#[test]
fn matches_oracle_under_random_mix() {
    use rand::Rng;

    let e = engine(16);
    let mut oracle: StdHashMap<u32, u32> = StdHashMap::new();
    let mut rng = rand::thread_rng();

    for _ in 0..20_000 {
        let key = rng.gen_range(0..500u32);
        let key_bytes = key.to_le_bytes();

        match rng.gen_range(0..3) {
            0 => {
                let value: u32 = rng.gen();
                e.put(&key_bytes, &value.to_le_bytes()).unwrap();
                oracle.insert(key, value);
            }
            1 => {
                let got = e.get(&key_bytes).ok().map(|v| u32::from_le_bytes(v.try_into().unwrap()));
                assert_eq!(got, oracle.get(&key).copied());
            }
            _ => {
                let removed = e.delete(&key_bytes).is_ok();
                let expected = oracle.remove(&key).is_some();
                assert_eq!(removed, expected);
            }
        }
    }

    assert_eq!(e.stats().item_count as usize, oracle.len());
}

// Scenario 5 (§8): concurrent mixed workload matches a serialized oracle's
// cardinality (full oracle matching of exact values would require replaying
// the log in linearization order; here we check the invariant that is
// observable from outside: the final key set's size).
#[test]
fn concurrent_mixed_workload_matches_cardinality() {
    const THREADS: usize = 8;
    const OPS_PER_THREAD: usize = 4_000;
    const KEYS: u32 = 2_000;

    let e = Arc::new(engine(64));
    let mut joins = Vec::new();

    for _ in 0..THREADS {
        let e = e.clone();
        joins.push(thread::spawn(move || {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            for _ in 0..OPS_PER_THREAD {
                let key = rng.gen_range(0..KEYS).to_le_bytes();
                match rng.gen_range(0..10) {
                    0..=4 => {
                        let _ = e.get(&key);
                    }
                    5..=7 => {
                        let _ = e.put(&key, b"v");
                    }
                    _ => {
                        let _ = e.delete(&key);
                    }
                }
            }
        }));
    }

    for j in joins {
        j.join().unwrap();
    }

    let mut live = 0u32;
    for k in 0..KEYS {
        if e.get(&k.to_le_bytes()).is_ok() {
            live += 1;
        }
    }
    assert_eq!(live, e.stats().item_count);
}

#[test]
fn spam_insert_then_read_across_threads() {
    let e = Arc::new(engine(32));
    let mut joins = Vec::new();

    for t in 0..10u32 {
        let e = e.clone();
        joins.push(thread::spawn(move || {
            for i in t * 1000..(t + 1) * 1000 {
                e.put(&i.to_le_bytes(), &i.to_le_bytes()).unwrap();
            }
        }));
    }
    for j in joins.drain(..) {
        j.join().unwrap();
    }

    let mut joins = Vec::new();
    for t in 0..5u32 {
        let e = e.clone();
        joins.push(thread::spawn(move || {
            for i in t * 2000..(t + 1) * 2000 {
                assert_eq!(e.get(&i.to_le_bytes()).unwrap(), i.to_le_bytes());
            }
        }));
    }
    for j in joins {
        j.join().unwrap();
    }
}

#[test]
fn structured_logging_smoke_test() {
    use slog::Drain;

    let decorator = slog_term::PlainDecorator::new(std::io::sink());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let log = slog::Logger::root(drain, slog::o!("component" => "hash-engine-test"));

    // Forcing a resize exercises the debug!() call sites in resize.rs; this
    // test only checks that logging through a real async drain doesn't
    // panic or deadlock, not the log content.
    let e = HashEngine::init(4, log).unwrap();
    for i in 0..50u32 {
        e.put(&i.to_le_bytes(), b"v").unwrap();
    }
    assert!(e.stats().bucket_count > 4);
}
