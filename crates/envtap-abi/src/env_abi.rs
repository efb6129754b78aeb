//! ABI layer for environment lookup.
//!
//! Exposes the interposed `getenv` plus the namespaced `__envtap_getenv`
//! alias. The raw `__environ` walk and the statically allocated rewrite
//! cache live here; all matching and synthesis logic is delegated to
//! `envtap-core`.

use std::cell::UnsafeCell;
use std::ffi::c_char;
use std::ptr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use envtap_core::config::rewrite_mode;
use envtap_core::env;
use envtap_core::rewrite::{self, CACHE_CAPACITY};

use crate::stats;
use crate::util::c_str_bytes;

unsafe extern "C" {
    #[link_name = "__environ"]
    static mut HOST_ENVIRON: *mut *mut c_char;
}

/// Hard cap on the environment walk so a corrupt, unterminated vector
/// cannot send the scan off the end of the table.
const MAX_ENV_ENTRIES: usize = 4096;

// Rewrite-cache state machine: exactly-once population even when the first
// target lookups race. The winner of the EMPTY->POPULATING exchange fills
// the buffer and publishes POPULATED (or FAILED on capacity exhaustion)
// with Release ordering; losers spin until a terminal state is visible.
const CACHE_EMPTY: u8 = 0;
const CACHE_POPULATING: u8 = 1;
const CACHE_POPULATED: u8 = 2;
const CACHE_FAILED: u8 = 3;

static CACHE_STATE: AtomicU8 = AtomicU8::new(CACHE_EMPTY);
static CACHE_LEN: AtomicUsize = AtomicUsize::new(0);

struct CacheStorage(UnsafeCell<[u8; CACHE_CAPACITY]>);

// SAFETY: the buffer is written by exactly one thread (the winner of the
// EMPTY->POPULATING exchange) and only read after a terminal state has been
// observed with Acquire ordering.
unsafe impl Sync for CacheStorage {}

static CACHE: CacheStorage = CacheStorage(UnsafeCell::new([0; CACHE_CAPACITY]));

/// Walk the host environment vector and return a pointer to the value
/// portion of the first entry matching `key`.
///
/// # Safety
///
/// Must only run in a process whose loader populated `__environ` with
/// NUL-terminated `NAME=VALUE` entries.
unsafe fn raw_lookup(key: &[u8]) -> *mut c_char {
    // SAFETY: `__environ` is owned by the host libc/loader; we only read
    // pointers and entry bytes.
    unsafe {
        let mut cursor = HOST_ENVIRON;
        if cursor.is_null() {
            return ptr::null_mut();
        }
        for _ in 0..MAX_ENV_ENTRIES {
            let entry_ptr = *cursor;
            if entry_ptr.is_null() {
                break;
            }
            if env::entry_matches(c_str_bytes(entry_ptr), key) {
                return entry_ptr.add(key.len() + 1);
            }
            cursor = cursor.add(1);
        }
        ptr::null_mut()
    }
}

/// Drive the cache to a terminal state and return it.
///
/// `existing` is the raw value of the target variable (null when absent);
/// it feeds synthesis in prepend mode. Resolving the rewrite mode may
/// re-enter our exported `getenv` for a non-target name, which never
/// touches the cache, so the POPULATING window cannot deadlock on itself.
///
/// # Safety
///
/// `existing` must be null or point to a valid NUL-terminated string.
unsafe fn ensure_cache(existing: *const c_char) -> u8 {
    loop {
        match CACHE_STATE.load(Ordering::Acquire) {
            state @ (CACHE_POPULATED | CACHE_FAILED) => return state,
            CACHE_EMPTY => {
                if CACHE_STATE
                    .compare_exchange(
                        CACHE_EMPTY,
                        CACHE_POPULATING,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_err()
                {
                    continue;
                }

                let raw = if existing.is_null() {
                    None
                } else {
                    // SAFETY: caller guarantees a NUL-terminated value.
                    Some(unsafe { c_str_bytes(existing) })
                };
                // SAFETY: we won the populate transition; no other thread
                // touches the buffer until a terminal state is published.
                let buf = unsafe { &mut *CACHE.0.get() };
                return match rewrite::synthesize(rewrite_mode(), raw, buf) {
                    Ok(n) => {
                        CACHE_LEN.store(n, Ordering::Release);
                        stats::record_population();
                        CACHE_STATE.store(CACHE_POPULATED, Ordering::Release);
                        CACHE_POPULATED
                    }
                    Err(_) => {
                        stats::record_capacity_fallback();
                        CACHE_STATE.store(CACHE_FAILED, Ordering::Release);
                        CACHE_FAILED
                    }
                };
            }
            _ => std::hint::spin_loop(),
        }
    }
}

/// `getenv` — retrieve an environment variable value, with the rewrite rule
/// applied to the target variable.
///
/// Matches the host contract: returns a pointer into the environment (or
/// into the process-lifetime rewrite cache for the target variable), and
/// null when the variable is not set. Callers must not free the result. For
/// the target variable every call after the first returns the identical
/// cached bytes, regardless of later changes to the real environment.
///
/// # Safety
///
/// `name` must be null or point to a valid NUL-terminated string.
#[cfg_attr(not(debug_assertions), unsafe(no_mangle))]
pub unsafe extern "C" fn getenv(name: *const c_char) -> *mut c_char {
    if name.is_null() {
        return ptr::null_mut();
    }
    // SAFETY: non-null `name` is NUL-terminated per the caller contract.
    let name_bytes = unsafe { c_str_bytes(name) };

    // A zero-length key ("" or "=X") never matches any entry.
    let Some(key) = env::lookup_key(name_bytes) else {
        return ptr::null_mut();
    };
    stats::record_lookup();

    // SAFETY: the loader populated `__environ` before any call of interest.
    let raw = unsafe { raw_lookup(key) };

    if !rewrite::is_target(name_bytes) {
        return raw;
    }
    stats::record_target_hit();

    // SAFETY: `raw` is null or a NUL-terminated value inside an entry.
    match unsafe { ensure_cache(raw) } {
        CACHE_POPULATED => CACHE.0.get().cast::<c_char>(),
        // Capacity fallback: the unrewritten real value.
        _ => raw,
    }
}

/// Namespaced alias of [`getenv`], exported in every build profile.
///
/// This is the registered-override surface: fixtures and diagnostics reach
/// the interceptor through it without depending on symbol preemption.
///
/// # Safety
///
/// Same contract as [`getenv`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __envtap_getenv(name: *const c_char) -> *mut c_char {
    // SAFETY: identical contract, forwarded as-is.
    unsafe { getenv(name) }
}

/// Published cache contents, or `None` before population / after a
/// capacity failure.
#[cfg(debug_assertions)]
#[must_use]
pub fn cache_snapshot_for_tests() -> Option<&'static [u8]> {
    if CACHE_STATE.load(Ordering::Acquire) != CACHE_POPULATED {
        return None;
    }
    let len = CACHE_LEN.load(Ordering::Acquire);
    // SAFETY: POPULATED was published after the buffer write; the buffer is
    // immutable for the remainder of the process lifetime.
    let buf = unsafe { &*CACHE.0.get() };
    Some(&buf[..len])
}
