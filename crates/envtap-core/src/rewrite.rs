//! The rewrite rule: which variable is intercepted and what its observed
//! value becomes.
//!
//! The cache and interceptor here are the pure form of the pipeline:
//! ownership-based, testable against any synthetic environment vector. The
//! process-wide static cache behind the interposed symbol lives in the ABI
//! layer and delegates its synthesis to [`synthesize`].

use crate::config::RewriteMode;
use crate::cstr::{self, CapacityError};
use crate::env;

/// Name of the variable subject to rewriting.
pub const TARGET_VAR: &[u8] = b"JAVA_TOOL_OPTIONS";

/// Flag spliced into the target variable's observed value. References the
/// agent artifact the delivery mechanism places at a fixed path before the
/// target process starts.
pub const INJECTED_FRAGMENT: &[u8] =
    b" -javaagent:/otel-auto-instrumentation-injector/javaagent.jar";

/// Capacity of the process-lifetime rewrite cache.
///
/// Must exceed the combined length of the fragment and any plausible
/// pre-existing value of the target variable; synthesis reports
/// [`CapacityError`] instead of overflowing when it does not.
pub const CACHE_CAPACITY: usize = 1024;

/// Whether `name` is exactly the target variable (full match, never a
/// prefix).
#[must_use]
pub fn is_target(name: &[u8]) -> bool {
    cstr::equal(name, TARGET_VAR)
}

/// Write the synthesized replacement value into `out`, returning its
/// content length.
///
/// `Replace` discards `existing`; `Prepend` places the fragment ahead of
/// it, separated by a space so the options stay distinct tokens. On a
/// capacity failure `out` holds no committed value and the caller is
/// expected to fall back to the unrewritten real value.
pub fn synthesize(
    mode: RewriteMode,
    existing: Option<&[u8]>,
    out: &mut [u8],
) -> Result<usize, CapacityError> {
    let mut n = cstr::copy(out, INJECTED_FRAGMENT)?;
    if let (RewriteMode::Prepend, Some(existing)) = (mode, existing)
        && cstr::len(existing) > 0
    {
        let spliced = match cstr::append(out, b" ") {
            Ok(_) => cstr::append(out, existing),
            Err(err) => Err(err),
        };
        match spliced {
            Ok(total) => n = total,
            Err(err) => {
                // Roll back the partial fragment so a failed synthesis
                // leaves nothing behind.
                out[0] = 0;
                return Err(err);
            }
        }
    }
    Ok(n)
}

/// Process-lifetime rewrite cache: a fixed buffer plus a content length.
///
/// Empty until first populated; once non-empty it is fixed for the rest of
/// its lifetime. There is no invalidation and no re-derivation.
#[derive(Debug)]
pub struct RewriteCache {
    buf: [u8; CACHE_CAPACITY],
    len: usize,
}

impl RewriteCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; CACHE_CAPACITY],
            len: 0,
        }
    }

    /// Whether the cache has not been populated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Populate once; later calls are no-ops returning the published length.
    pub fn populate(
        &mut self,
        mode: RewriteMode,
        existing: Option<&[u8]>,
    ) -> Result<usize, CapacityError> {
        if self.len != 0 {
            return Ok(self.len);
        }
        self.len = synthesize(mode, existing, &mut self.buf)?;
        Ok(self.len)
    }

    /// The synthesized value. Empty until populated.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Default for RewriteCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure lookup engine: answers "what is the value of environment variable X"
/// with either the real value or the synthesized one.
///
/// This type is independent of how the library becomes active in a process;
/// it exposes the plain lookup-or-absent contract over a caller-supplied
/// entry vector, which is what the unit tests and the conformance harness
/// drive.
#[derive(Debug)]
pub struct Interceptor {
    mode: RewriteMode,
    cache: RewriteCache,
    degraded: bool,
}

impl Interceptor {
    #[must_use]
    pub fn new(mode: RewriteMode) -> Self {
        Self {
            mode,
            cache: RewriteCache::new(),
            degraded: false,
        }
    }

    /// Answer a lookup for `name` against `entries`.
    ///
    /// The raw lookup always runs. For the target variable the cached
    /// synthesized value is returned whether or not the raw lookup
    /// succeeded; the first such call populates the cache and every later
    /// one is a pure read. A synthesis capacity failure degrades the target
    /// permanently to the unrewritten raw value; the public surface stays
    /// error-free either way.
    pub fn lookup<'s, 'e: 's>(&'s mut self, entries: &[&'e [u8]], name: &[u8]) -> Option<&'s [u8]> {
        let raw = env::raw_lookup(entries.iter().copied(), name);
        if !is_target(name) || self.degraded {
            return raw;
        }
        if self.cache.is_empty() && self.cache.populate(self.mode, raw).is_err() {
            self.degraded = true;
            return raw;
        }
        Some(self.cache.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // is_target / synthesize
    // ---------------------------------------------------------------

    #[test]
    fn target_requires_full_match() {
        assert!(is_target(b"JAVA_TOOL_OPTIONS"));
        assert!(!is_target(b"JAVA_TOOL_OPTIONS_EXTRA"));
        assert!(!is_target(b"JAVA_TOOL_OPTION"));
        assert!(!is_target(b"JAVA_TOOL_OPTIONS=x"));
        assert!(!is_target(b""));
    }

    #[test]
    fn synthesize_replace_discards_existing() {
        let mut out = [0u8; CACHE_CAPACITY];
        let n = synthesize(RewriteMode::Replace, Some(b"-Xmx512m"), &mut out).unwrap();
        assert_eq!(&out[..n], INJECTED_FRAGMENT);
    }

    #[test]
    fn synthesize_prepend_keeps_existing() {
        let mut out = [0u8; CACHE_CAPACITY];
        let n = synthesize(RewriteMode::Prepend, Some(b"-Xmx512m"), &mut out).unwrap();
        let mut expected = INJECTED_FRAGMENT.to_vec();
        expected.extend_from_slice(b" -Xmx512m");
        assert_eq!(&out[..n], &expected[..]);
    }

    #[test]
    fn synthesize_prepend_empty_existing_adds_no_separator() {
        let mut out = [0u8; CACHE_CAPACITY];
        let n = synthesize(RewriteMode::Prepend, Some(b""), &mut out).unwrap();
        assert_eq!(&out[..n], INJECTED_FRAGMENT);
    }

    #[test]
    fn synthesize_prepend_without_existing_is_fragment() {
        let mut out = [0u8; CACHE_CAPACITY];
        let n = synthesize(RewriteMode::Prepend, None, &mut out).unwrap();
        assert_eq!(&out[..n], INJECTED_FRAGMENT);
    }

    #[test]
    fn synthesize_capacity_failure_commits_nothing() {
        let huge = vec![b'x'; CACHE_CAPACITY];
        let mut out = [0u8; CACHE_CAPACITY];
        let err = synthesize(RewriteMode::Prepend, Some(&huge), &mut out).unwrap_err();
        assert!(err.requested >= CACHE_CAPACITY);
        assert_eq!(out[0], 0);
    }

    // ---------------------------------------------------------------
    // RewriteCache
    // ---------------------------------------------------------------

    #[test]
    fn cache_populates_once() {
        let mut cache = RewriteCache::new();
        assert!(cache.is_empty());
        cache.populate(RewriteMode::Replace, None).unwrap();
        let first = cache.value().to_vec();
        // A second populate with different inputs must not re-derive.
        cache
            .populate(RewriteMode::Prepend, Some(b"-Dother=1"))
            .unwrap();
        assert_eq!(cache.value(), &first[..]);
    }

    // ---------------------------------------------------------------
    // Interceptor end-to-end lookup scenarios
    // ---------------------------------------------------------------

    #[test]
    fn target_absent_yields_fragment_exactly() {
        let env: Vec<&[u8]> = vec![b"PATH=/usr/bin"];
        let mut it = Interceptor::new(RewriteMode::Replace);
        assert_eq!(
            it.lookup(&env, b"JAVA_TOOL_OPTIONS"),
            Some(INJECTED_FRAGMENT)
        );
    }

    #[test]
    fn target_present_replace_discards_real_value() {
        // The literal behavior of the original injector: the pre-existing
        // value is dropped, not prepended to.
        let env: Vec<&[u8]> = vec![b"JAVA_TOOL_OPTIONS=-Xmx512m"];
        let mut it = Interceptor::new(RewriteMode::Replace);
        assert_eq!(
            it.lookup(&env, b"JAVA_TOOL_OPTIONS"),
            Some(INJECTED_FRAGMENT)
        );
    }

    #[test]
    fn target_present_prepend_keeps_real_value() {
        let env: Vec<&[u8]> = vec![b"JAVA_TOOL_OPTIONS=-Xmx512m"];
        let mut it = Interceptor::new(RewriteMode::Prepend);
        let mut expected = INJECTED_FRAGMENT.to_vec();
        expected.extend_from_slice(b" -Xmx512m");
        assert_eq!(
            it.lookup(&env, b"JAVA_TOOL_OPTIONS"),
            Some(&expected[..])
        );
    }

    #[test]
    fn repeated_target_lookups_return_identical_cached_value() {
        let env: Vec<&[u8]> = vec![b"JAVA_TOOL_OPTIONS=-Xmx512m"];
        let mut it = Interceptor::new(RewriteMode::Prepend);
        let first = it
            .lookup(&env, b"JAVA_TOOL_OPTIONS")
            .map(<[u8]>::to_vec);

        // The environment is not re-read after the first populate.
        let changed: Vec<&[u8]> = vec![b"JAVA_TOOL_OPTIONS=-Xss256k"];
        let second = it
            .lookup(&changed, b"JAVA_TOOL_OPTIONS")
            .map(<[u8]>::to_vec);
        assert_eq!(first, second);
    }

    #[test]
    fn non_target_lookups_pass_through() {
        let env: Vec<&[u8]> = vec![b"PATH=/usr/bin:/bin", b"JAVA_TOOL_OPTIONS=-Xmx512m"];
        let mut it = Interceptor::new(RewriteMode::Replace);

        assert_eq!(it.lookup(&env, b"PATH"), Some(&b"/usr/bin:/bin"[..]));
        // Populate the target between the two PATH observations.
        it.lookup(&env, b"JAVA_TOOL_OPTIONS");
        assert_eq!(it.lookup(&env, b"PATH"), Some(&b"/usr/bin:/bin"[..]));
        assert_eq!(it.lookup(&env, b"MISSING"), None);
    }

    #[test]
    fn prefix_and_delimiter_edges() {
        let env: Vec<&[u8]> = vec![b"FOO=1", b"FOOBAR=2"];
        let mut it = Interceptor::new(RewriteMode::Replace);
        assert_eq!(it.lookup(&env, b"FOO"), Some(&b"1"[..]));
        assert_eq!(it.lookup(&env, b"FOOBAR"), Some(&b"2"[..]));
        assert_eq!(it.lookup(&env, b""), None);
        assert_eq!(it.lookup(&env, b"=X"), None);
    }

    #[test]
    fn capacity_failure_degrades_to_raw_value() {
        let mut entry = b"JAVA_TOOL_OPTIONS=".to_vec();
        entry.extend(std::iter::repeat_n(b'x', CACHE_CAPACITY));
        let env: Vec<&[u8]> = vec![&entry];
        let mut it = Interceptor::new(RewriteMode::Prepend);

        let got = it
            .lookup(&env, b"JAVA_TOOL_OPTIONS")
            .map(<[u8]>::to_vec);
        assert_eq!(got.as_deref(), Some(&entry[b"JAVA_TOOL_OPTIONS=".len()..]));

        // The degradation is sticky: later calls take the raw path too.
        let got = it
            .lookup(&env, b"JAVA_TOOL_OPTIONS")
            .map(<[u8]>::to_vec);
        assert_eq!(got.as_deref(), Some(&entry[b"JAVA_TOOL_OPTIONS=".len()..]));
    }
}
