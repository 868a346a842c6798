//! Deterministic hashing helpers. The standard library `HashMap` is randomly seeded per process,
//! which is fine for lookups but not for anything that feeds into the simulation's random
//! streams. Seeds for named RNG streams are derived with `hash_str`, which is stable across runs
//! and platforms.
//!
//! `HashMap` and `HashSet` here use the `rustc-hash` hasher. Use `HashMap::default()` to create
//! one.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// A convenience method to compute a stable 64-bit hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
