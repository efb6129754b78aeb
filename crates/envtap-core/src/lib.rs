//! # envtap-core
//!
//! Safe Rust implementations of the envtap interception logic.
//!
//! This crate holds everything that can be expressed without touching raw
//! process memory: byte-string primitives over NUL-terminated sequences,
//! `NAME=VALUE` entry matching, the rewrite rule for the intercepted
//! variable, and the process-wide rewrite-mode configuration. No `unsafe`
//! code is permitted at the crate level; the raw `__environ` walk and the
//! statically allocated cache live in `envtap-abi`.

#![deny(unsafe_code)]

pub mod config;
pub mod cstr;
pub mod env;
pub mod rewrite;

pub use config::RewriteMode;
pub use cstr::CapacityError;
pub use rewrite::{CACHE_CAPACITY, INJECTED_FRAGMENT, Interceptor, TARGET_VAR};
