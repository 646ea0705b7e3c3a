/// Invalid configuration. Returned by `ScrollerConfig::validate` and surfaced by
/// `RecycleScroller::new` / `set_options`; nothing is retried.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{field}` must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("`fixed_item_size` must be greater than zero (got {0})")]
    NonPositiveFixedSize(f64),
    #[error("`min_columns` must be at least 1")]
    ZeroMinColumns,
    #[error("`min_columns` ({min}) exceeds `max_columns` ({max})")]
    ColumnRange { min: usize, max: usize },
    #[error("`pool_capacity` must be at least 1 when set")]
    ZeroPoolCapacity,
}

/// A measurement that would corrupt the prefix sums.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum SizeError {
    #[error("measured size must be finite (got {0})")]
    NotFinite(f64),
    #[error("measured size must not be negative (got {0})")]
    Negative(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("view pool is at its hard capacity of {capacity} slots with none idle")]
    CapacityExceeded { capacity: usize },
}

/// Two items in the same pass share a key. The item at `index` (the later one) wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("items at indexes {first_index} and {index} share a key; keeping index {index}")]
pub struct IdentityConflict {
    pub first_index: usize,
    pub index: usize,
}
