use alloc::sync::Arc;

use crate::{ConfigError, Direction, ItemKey, ItemType, ScrollerEvent};

/// Grid-mode layout parameters.
///
/// Items are laid out row-major: each row on the scroll axis holds `columns` cells, where
/// `columns` is `columns_override` if set, otherwise
/// `floor((container_cross + cross_gap) / (cell_cross_size + cross_gap))` clamped to
/// `[min_columns, max_columns]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Cell size on the scroll axis.
    pub cell_main_size: f64,
    /// Requested cell size on the cross axis (cells are stretched to fill the row).
    pub cell_cross_size: f64,
    /// Gap between rows.
    pub main_gap: f64,
    /// Gap between columns.
    pub cross_gap: f64,
    pub min_columns: usize,
    pub max_columns: usize,
    pub columns_override: Option<usize>,
}

impl GridConfig {
    pub fn new(cell_main_size: f64, cell_cross_size: f64) -> Self {
        Self {
            cell_main_size,
            cell_cross_size,
            main_gap: 0.0,
            cross_gap: 0.0,
            min_columns: 1,
            max_columns: usize::MAX,
            columns_override: None,
        }
    }

    pub fn with_gaps(mut self, main_gap: f64, cross_gap: f64) -> Self {
        self.main_gap = main_gap;
        self.cross_gap = cross_gap;
        self
    }

    pub fn with_column_range(mut self, min_columns: usize, max_columns: usize) -> Self {
        self.min_columns = min_columns;
        self.max_columns = max_columns;
        self
    }

    pub fn with_columns_override(mut self, columns: Option<usize>) -> Self {
        self.columns_override = columns;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("grid.cell_main_size", self.cell_main_size)?;
        non_negative("grid.cell_cross_size", self.cell_cross_size)?;
        non_negative("grid.main_gap", self.main_gap)?;
        non_negative("grid.cross_gap", self.cross_gap)?;
        if self.min_columns == 0 {
            return Err(ConfigError::ZeroMinColumns);
        }
        if self.min_columns > self.max_columns {
            return Err(ConfigError::ColumnRange {
                min: self.min_columns,
                max: self.max_columns,
            });
        }
        Ok(())
    }
}

/// Plain-data layout configuration.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerConfig {
    pub direction: Direction,
    /// Extra pixels rendered beyond each viewport edge.
    pub buffer: f64,
    /// Lower bound for every item size; also the size of unmeasured items without a hint.
    pub min_item_size: f64,
    /// `Some` selects fixed mode, `None` selects measured mode. Ignored in grid mode.
    pub fixed_item_size: Option<f64>,
    /// Space after every item in list modes.
    pub gap: f64,
    /// `Some` selects grid mode.
    pub grid: Option<GridConfig>,
    /// Optional hard ceiling on the number of pooled slots.
    pub pool_capacity: Option<usize>,
    /// Quiet period after the last scroll/resize event before returning to idle.
    pub idle_delay_ms: u64,
    /// Measurements closer than this to the stored size are ignored.
    pub size_epsilon: f64,
    /// Number of leading items rendered while no rendering surface is available.
    pub prerender: usize,
    /// Shift the scroll offset when an item above it is measured with a new size.
    pub adjust_scroll_on_resize: bool,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Vertical,
            buffer: 200.0,
            min_item_size: 1.0,
            fixed_item_size: None,
            gap: 0.0,
            grid: None,
            pool_capacity: None,
            idle_delay_ms: 150,
            size_epsilon: 0.5,
            prerender: 0,
            adjust_scroll_on_resize: true,
        }
    }
}

impl ScrollerConfig {
    pub fn fixed(item_size: f64) -> Self {
        Self {
            fixed_item_size: Some(item_size),
            ..Self::default()
        }
    }

    pub fn measured(min_item_size: f64) -> Self {
        Self {
            min_item_size,
            ..Self::default()
        }
    }

    pub fn grid(grid: GridConfig) -> Self {
        Self {
            grid: Some(grid),
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_min_item_size(mut self, min_item_size: f64) -> Self {
        self.min_item_size = min_item_size;
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: Option<usize>) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub fn with_idle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.idle_delay_ms = delay_ms;
        self
    }

    pub fn with_size_epsilon(mut self, epsilon: f64) -> Self {
        self.size_epsilon = epsilon;
        self
    }

    pub fn with_prerender(mut self, prerender: usize) -> Self {
        self.prerender = prerender;
        self
    }

    pub fn with_adjust_scroll_on_resize(mut self, adjust: bool) -> Self {
        self.adjust_scroll_on_resize = adjust;
        self
    }

    /// Rejects values that would corrupt offset arithmetic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("buffer", self.buffer)?;
        non_negative("min_item_size", self.min_item_size)?;
        non_negative("gap", self.gap)?;
        non_negative("size_epsilon", self.size_epsilon)?;
        if let Some(size) = self.fixed_item_size {
            finite("fixed_item_size", size)?;
            if size <= 0.0 {
                return Err(ConfigError::NonPositiveFixedSize(size));
            }
        }
        if let Some(grid) = &self.grid {
            grid.validate()?;
        }
        if self.pool_capacity == Some(0) {
            return Err(ConfigError::ZeroPoolCapacity);
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

/// Maps an item (and its index) to its identity.
pub type KeyFn<T, K> = Arc<dyn Fn(&T, usize) -> K + Send + Sync>;

/// Optional per-item size hint used before an item is measured.
pub type SizeHintFn<T> = Arc<dyn Fn(&T) -> Option<f64> + Send + Sync>;

/// Optional per-item template discriminator.
pub type ItemTypeFn<T> = Arc<dyn Fn(&T) -> Option<ItemType> + Send + Sync>;

pub type OnEventCallback = Arc<dyn Fn(ScrollerEvent) + Send + Sync>;

/// Configuration for [`crate::RecycleScroller`].
///
/// Cheap to clone: closures are stored in `Arc`s.
pub struct ScrollerOptions<T, K = ItemKey> {
    pub config: ScrollerConfig,
    pub get_item_key: KeyFn<T, K>,
    pub get_size_hint: Option<SizeHintFn<T>>,
    pub get_item_type: Option<ItemTypeFn<T>>,
    pub on_event: Option<OnEventCallback>,
}

impl<T, K> Clone for ScrollerOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            get_item_key: Arc::clone(&self.get_item_key),
            get_size_hint: self.get_size_hint.clone(),
            get_item_type: self.get_item_type.clone(),
            on_event: self.on_event.clone(),
        }
    }
}

impl<T> ScrollerOptions<T, ItemKey> {
    /// Creates options for a list keyed by position.
    ///
    /// Positional keys do not follow items across reorders; use [`Self::new_with_key`] when
    /// the data has a stable identity.
    pub fn new(config: ScrollerConfig) -> Self {
        Self::new_with_key(config, |_, i| i as u64)
    }
}

impl<T, K> ScrollerOptions<T, K> {
    /// Creates options with a custom identity, e.g. `|item, _| item.id`.
    pub fn new_with_key(
        config: ScrollerConfig,
        get_item_key: impl Fn(&T, usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            get_item_key: Arc::new(get_item_key),
            get_size_hint: None,
            get_item_type: None,
            on_event: None,
        }
    }

    pub fn with_size_hint(mut self, f: impl Fn(&T) -> Option<f64> + Send + Sync + 'static) -> Self {
        self.get_size_hint = Some(Arc::new(f));
        self
    }

    pub fn with_item_type(
        mut self,
        f: impl Fn(&T) -> Option<ItemType> + Send + Sync + 'static,
    ) -> Self {
        self.get_item_type = Some(Arc::new(f));
        self
    }

    pub fn with_on_event(mut self, f: impl Fn(ScrollerEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }
}

impl<T, K> core::fmt::Debug for ScrollerOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("config", &self.config)
            .field("get_size_hint", &self.get_size_hint.is_some())
            .field("get_item_type", &self.get_item_type.is_some())
            .field("on_event", &self.on_event.is_some())
            .finish_non_exhaustive()
    }
}
