//! # envtap-abi
//!
//! ABI boundary for envtap. Produces `libenvtap.so`, a shared object loaded
//! ahead of the target's runtime via `LD_PRELOAD` so that its exported
//! `getenv` preempts the host symbol. Every answer passes through the
//! rewrite rule in `envtap-core`; for exactly one configured variable the
//! caller observes a synthesized value instead of the real one.
//!
//! # Architecture
//!
//! ```text
//! caller -> getenv (this crate) -> raw __environ scan -> core matching/rewrite -> return
//! ```
//!
//! The symbol is only exported in release builds; in debug and test builds
//! the entry points are plain Rust functions, so test binaries do not shadow
//! the host libc they themselves depend on.

pub mod env_abi;
pub mod stats;
pub mod util;
