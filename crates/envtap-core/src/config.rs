//! Runtime rewrite-mode configuration.
//!
//! The rewrite mode is set via the `ENVTAP_REWRITE_MODE` environment variable:
//! - `replace` (default): the synthesized value is the injected fragment
//!   alone. Any pre-existing value of the target variable is discarded,
//!   matching the behavior of the original injector.
//! - `prepend`: the injected fragment is placed ahead of the pre-existing
//!   value, keeping the options the process was launched with.

use std::sync::atomic::{AtomicU8, Ordering};

/// How the target variable's observed value is synthesized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteMode {
    /// Return the injected fragment alone, discarding any real value.
    #[default]
    Replace,
    /// Return the injected fragment followed by the real value.
    Prepend,
}

impl RewriteMode {
    /// Parse from string (case-insensitive). Unknown values fall back to
    /// [`RewriteMode::Replace`].
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "prepend" | "merge" | "keep" => Self::Prepend,
            _ => Self::Replace,
        }
    }
}

// Atomic cache: 0=unresolved, 1=Replace, 2=Prepend, 255=resolving.
// Uses a non-blocking state machine instead of OnceLock to prevent deadlock
// under LD_PRELOAD when our exported getenv is called reentrant during
// std::env::var() inside OnceLock::get_or_init().
static CACHED_MODE: AtomicU8 = AtomicU8::new(0);

const MODE_UNRESOLVED: u8 = 0;
const MODE_REPLACE: u8 = 1;
const MODE_PREPEND: u8 = 2;
const MODE_RESOLVING: u8 = 255;

fn mode_to_u8(mode: RewriteMode) -> u8 {
    match mode {
        RewriteMode::Replace => MODE_REPLACE,
        RewriteMode::Prepend => MODE_PREPEND,
    }
}

fn u8_to_mode(v: u8) -> RewriteMode {
    match v {
        MODE_PREPEND => RewriteMode::Prepend,
        _ => RewriteMode::Replace,
    }
}

/// Get the configured rewrite mode (reads the env var on first call, caches
/// thereafter).
///
/// Uses a non-blocking atomic state machine instead of OnceLock. When a
/// reentrant call arrives during env var resolution (our exported getenv
/// called by std::env::var), the RESOLVING state is detected and Replace is
/// returned as the safe default.
#[must_use]
pub fn rewrite_mode() -> RewriteMode {
    let cached = CACHED_MODE.load(Ordering::Relaxed);

    // Fast path: already resolved.
    if cached != MODE_UNRESOLVED && cached != MODE_RESOLVING {
        return u8_to_mode(cached);
    }

    // Reentrant call during resolution: return the safe default.
    if cached == MODE_RESOLVING {
        return RewriteMode::Replace;
    }

    // Try to claim the resolution slot.
    if CACHED_MODE
        .compare_exchange(
            MODE_UNRESOLVED,
            MODE_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        // Another thread/reentrant call. Return Replace until resolved.
        let v = CACHED_MODE.load(Ordering::Relaxed);
        return if v != MODE_UNRESOLVED && v != MODE_RESOLVING {
            u8_to_mode(v)
        } else {
            RewriteMode::Replace
        };
    }

    // We own the resolution. Reading the env var may re-enter our exported
    // getenv; those calls see RESOLVING and take the default above.
    let mode = std::env::var("ENVTAP_REWRITE_MODE")
        .map(|v| RewriteMode::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
    mode
}
