//! Integration test for the first-populate race: concurrent initial target
//! lookups must populate exactly once and all observe identical bytes.

use std::ffi::{CStr, CString};
use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};

use envtap_abi::{env_abi, stats};
use envtap_core::INJECTED_FRAGMENT;

const THREADS: usize = 8;

#[test]
fn racing_first_lookups_populate_exactly_once() {
    let barrier = Barrier::new(THREADS);
    let distinct_pointers = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            handles.push(scope.spawn(|| {
                let name = CString::new("JAVA_TOOL_OPTIONS").expect("name without NUL");
                barrier.wait();
                // SAFETY: `name` is NUL-terminated.
                let p = unsafe { env_abi::getenv(name.as_ptr()) };
                assert!(!p.is_null());
                // SAFETY: the cache pointer addresses NUL-terminated storage.
                let bytes = unsafe { CStr::from_ptr(p) }.to_bytes().to_vec();
                (p as usize, bytes)
            }));
        }

        let mut pointers = Vec::new();
        for handle in handles {
            let (ptr, bytes) = handle.join().expect("lookup thread");
            assert_eq!(&bytes[..], INJECTED_FRAGMENT);
            pointers.push(ptr);
        }
        pointers.sort_unstable();
        pointers.dedup();
        distinct_pointers.store(pointers.len(), Ordering::Relaxed);
    });

    // Every thread saw the same cache storage, and the populate ran once.
    assert_eq!(distinct_pointers.load(Ordering::Relaxed), 1);
    let snap = stats::snapshot();
    assert_eq!(snap.populations, 1);
    assert_eq!(snap.target_hits as usize, THREADS);
}
