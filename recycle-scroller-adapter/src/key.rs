use recycle_scroller::KeyCacheKey;

/// Bound on item keys accepted by the adapter helpers; follows the core crate's `std` switch.
pub trait ScrollerKey: KeyCacheKey {}
impl<K: KeyCacheKey> ScrollerKey for K {}
