//! Environment entry matching and raw lookup.
//!
//! The core module provides the safe matching logic over `NAME=VALUE`
//! entries. Actual environment access (walking the `__environ` pointer
//! table) lives in the ABI layer since it requires unsafe pointer
//! operations.

use crate::cstr;

/// Byte separating an entry's name from its value. The first occurrence is
/// authoritative; later ones belong to the value.
pub const DELIMITER: u8 = b'=';

/// Effective lookup key of `name`: the bytes before the first delimiter.
///
/// Returns `None` when that key is empty; a zero-length key (`""` or
/// `"=X"`) never matches any entry.
#[must_use]
pub fn lookup_key(name: &[u8]) -> Option<&[u8]> {
    let key_len = cstr::find_or_end(name, DELIMITER);
    if key_len == 0 {
        None
    } else {
        Some(&name[..key_len])
    }
}

/// Whether `entry` is `KEY=...` for exactly this key.
///
/// The first `key.len()` bytes must match and the byte after them must be
/// the delimiter, so a stored `FOOBAR=` never satisfies a `FOO` lookup.
#[must_use]
pub fn entry_matches(entry: &[u8], key: &[u8]) -> bool {
    cstr::equal_bounded(entry, key, key.len()) && entry.get(key.len()).copied() == Some(DELIMITER)
}

/// Scans `entries` in vector order and returns the value portion of the
/// first entry matching `name`.
///
/// First match wins; the supplied order is authoritative and never
/// re-sorted. `None` covers a rejected key, an absent vector, and a plain
/// miss alike: absence is an outcome here, not an error.
pub fn raw_lookup<'e, I>(entries: I, name: &[u8]) -> Option<&'e [u8]>
where
    I: IntoIterator<Item = &'e [u8]>,
{
    let key = lookup_key(name)?;
    for entry in entries {
        if entry_matches(entry, key) {
            let start = key.len() + 1;
            let end = start + cstr::len(&entry[start..]);
            return Some(&entry[start..end]);
        }
    }
    None
}
