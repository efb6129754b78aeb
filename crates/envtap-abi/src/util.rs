//! Shared internal utilities for the ABI boundary.

use std::ffi::c_char;

/// Scan a C string with an optional hard bound.
///
/// Returns `(len, terminated)` where:
/// - `len` is the byte length before the first NUL or before the bound.
/// - `terminated` indicates whether a NUL byte was observed.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and bound when
/// given).
pub unsafe fn scan_c_string(ptr: *const c_char, bound: Option<usize>) -> (usize, bool) {
    match bound {
        Some(limit) => {
            for i in 0..limit {
                // SAFETY: caller provides validity for the bounded read.
                if unsafe { *ptr.add(i) } == 0 {
                    return (i, true);
                }
            }
            (limit, false)
        }
        None => {
            let mut i = 0usize;
            // SAFETY: caller guarantees a NUL-terminated string in unbounded mode.
            while unsafe { *ptr.add(i) } != 0 {
                i += 1;
            }
            (i, true)
        }
    }
}

/// View a NUL-terminated C string as a byte slice (terminator excluded).
///
/// # Safety
///
/// `ptr` must be non-null and point to a valid NUL-terminated string that
/// outlives the returned slice.
pub unsafe fn c_str_bytes<'a>(ptr: *const c_char) -> &'a [u8] {
    // SAFETY: caller guarantees a valid NUL-terminated string.
    let (len, _terminated) = unsafe { scan_c_string(ptr, None) };
    // SAFETY: the scan proved `len` bytes are readable at `ptr`.
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }
}
