#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Map keyed by item identity: measured sizes, slot lookup and per-pass dedup all use it.
#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// Bound required of item keys.
///
/// With `std` this is `Hash + Eq`; without it keys must be `Ord` so a `BTreeMap` can be used.
#[cfg(feature = "std")]
pub trait KeyCacheKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> KeyCacheKey for K {}

#[cfg(not(feature = "std"))]
pub trait KeyCacheKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> KeyCacheKey for K {}
