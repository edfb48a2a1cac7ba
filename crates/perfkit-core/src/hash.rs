//! Hashing and map aliases used across the runtime.
//!
//! The `std-hash` feature swaps the fast hashers for the standard library ones,
//! which is handy when comparing behaviour against a reference build.

use std::hash::{Hash, Hasher};

#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    pub use ahash::AHasher as DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::default()
    }
}

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}

/// Group key derived from a source location.
pub type Key = u64;

/// Stable key for a call site. Used for positional memoization of groups.
pub fn location_key(file: &str, line: u32, column: u32) -> Key {
    let mut hasher = default::new();
    file.hash(&mut hasher);
    line.hash(&mut hasher);
    column.hash(&mut hasher);
    hasher.finish()
}

/// Hashes an arbitrary value into a group or effect key.
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> Key {
    let mut hasher = default::new();
    key.hash(&mut hasher);
    hasher.finish()
}
