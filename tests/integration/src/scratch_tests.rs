//! Scratch Tests - Shared Transcoding Buffer Under Contention
//!
//! These tests exercise the process-wide scratch buffer:
//! - At most one holder at a time, acquisition never waits
//! - Callers that lose the race still transcode correctly
//! - Oversized requests move off the shared buffer

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use common::*;
use oleauto::{iid, Bstr, EngineConfig, InvocationEngine, MemberId, ReleaseTracker, Variant};
use wstr::ScratchBufferPool;

/// Test: Simultaneous acquisition yields exactly one holder
#[test]
fn test_exclusive_ownership_across_threads() {
    init_logging();

    const NUM_THREADS: usize = 16;
    let pool = Arc::new(ScratchBufferPool::new());
    let start = Arc::new(Barrier::new(NUM_THREADS));
    let done = Arc::new(Barrier::new(NUM_THREADS));
    let holders = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let pool = pool.clone();
            let start = start.clone();
            let done = done.clone();
            let holders = holders.clone();
            thread::spawn(move || {
                start.wait();
                let held = pool.try_acquire();
                if held.is_some() {
                    holders.fetch_add(1, Ordering::SeqCst);
                }
                // keep holding until every thread has tried
                done.wait();
                drop(held);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    println!("\n=== Exclusive Ownership Test ===");
    println!("Threads: {}", NUM_THREADS);
    println!("Holders: {}", holders.load(Ordering::SeqCst));

    assert_eq!(holders.load(Ordering::SeqCst), 1);
    assert!(!pool.is_held());
}

/// Test: Concurrent conversions are all correct whichever buffer they got
#[test]
fn test_fallback_conversions_are_correct() {
    init_logging();

    const NUM_THREADS: usize = 8;
    const ROUNDS: usize = 200;
    let pool = Arc::new(ScratchBufferPool::new());
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let pool = pool.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let expected = format!("thread {} round {} \u{00e9}\u{1F680}", t, round);
                    let wide = Bstr::from_str_in(&expected, &pool);
                    assert_eq!(wide.to_string_in(&pool), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = pool.stats();
    println!("\n=== Fallback Conversion Test ===");
    println!("Shared hits: {}", stats.shared_hits);
    println!("Private fallbacks: {}", stats.private_fallbacks);

    assert_eq!(stats.shared_hits + stats.private_fallbacks, NUM_THREADS * ROUNDS * 2);
    assert!(!pool.is_held());
}

/// Test: Name resolution works while another caller holds the buffer
#[test]
fn test_engine_falls_back_when_buffer_held() {
    init_logging();

    let log = ReleaseLog::new();
    let object = MockObject::new("object", &log);
    object.on("Range", 9, |params| match params.arg(0) {
        Some(Variant::Bstr(address)) => {
            let mut units: Vec<u16> = address.units().collect();
            units.reverse();
            Outcome::Value(Variant::Bstr(Bstr::from_wide(&units)))
        }
        _ => Outcome::Value(Variant::Empty),
    });

    let pool = ScratchBufferPool::new();
    let engine = InvocationEngine::with_pool(EngineConfig::default(), &pool);
    let mut tracker = ReleaseTracker::new();
    let remote = tracker.adopt(object.clone(), iid::IDISPATCH);

    let mut held = pool.try_acquire().unwrap();
    held.push_str("unrelated work in progress");

    let ids = engine.get_ids_of_names(&remote, "Range", &[]).unwrap();
    assert_eq!(ids, vec![MemberId(9)]);
    let value = engine
        .invoke_method(&mut tracker, &remote, "Range", &["A1:B2".into()])
        .unwrap();

    assert_eq!(value.as_str().unwrap(), "2B:1A");
    assert_eq!(held.to_string_lossy(), "unrelated work in progress");
    assert!(pool.stats().private_fallbacks >= 3);
    drop(held);
    assert!(!pool.is_held());
}

/// Test: Text longer than the limit never takes the shared buffer
#[test]
fn test_oversized_text_spills() {
    init_logging();

    let pool = ScratchBufferPool::with_limit(64);
    let long = "x".repeat(1000);

    let wide = Bstr::from_str_in(&long, &pool);
    assert_eq!(wide.len(), 1000);
    assert_eq!(wide.to_string_in(&pool), long);

    let stats = pool.stats();
    assert_eq!(stats.spills, 2);
    assert_eq!(stats.shared_hits, 0);
    assert!(!pool.is_held());

    let mut buf = pool.try_acquire().unwrap();
    assert!(buf.capacity() <= 64);
    buf.push_str("short");
    assert!(buf.is_shared());
}

/// Test: Accented and CJK text under the limit is converted in the shared buffer
#[test]
fn test_non_ascii_text_stays_shared() {
    init_logging();

    let pool = ScratchBufferPool::with_limit(64);
    // 60 code units, 140 bytes as UTF-8
    let text = format!("{}{}", "é".repeat(40), "東京".repeat(10));

    let wide = Bstr::from_str_in(&text, &pool);
    assert_eq!(wide.len(), 60);
    assert_eq!(wide.to_string_in(&pool), text);

    let stats = pool.stats();
    println!("\n=== Non-ASCII Conversion Test ===");
    println!("Shared hits: {}", stats.shared_hits);
    println!("Spills: {}", stats.spills);

    assert_eq!(stats.shared_hits, 2);
    assert_eq!(stats.spills, 0);
    assert_eq!(stats.private_fallbacks, 0);
}
