use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::key::{KeyCacheKey, KeyMap};
use crate::{GridConfig, Position, ScrollerConfig, SizeError};

/// How item sizes are determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeMode {
    /// Every item has the configured fixed size.
    Fixed,
    /// Per-item sizes come from hints and runtime measurements.
    Measured,
    /// Items are cells in rows of a computed column count.
    Grid,
}

/// Resolved grid geometry for the current container size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    pub columns: usize,
    /// Cell size on the scroll axis.
    pub cell_main_size: f64,
    /// Cell size on the cross axis, stretched to fill the container.
    pub cell_cross_size: f64,
    /// `cell_main_size + main_gap`.
    pub row_stride: f64,
    /// `cell_cross_size + cross_gap`.
    pub column_stride: f64,
}

/// Column count for a grid: `floor((available + gap) / (cell + gap))` clamped to
/// `[min_columns, max_columns]`, or the override when one is given.
///
/// An unmeasured container or a zero cell size yields `min_columns`.
pub fn compute_columns(
    available: f64,
    cell_size: f64,
    gap: f64,
    min_columns: usize,
    max_columns: usize,
    columns_override: Option<usize>,
) -> usize {
    if let Some(columns) = columns_override {
        return columns.max(1);
    }
    let min_columns = min_columns.max(1);
    let max_columns = max_columns.max(min_columns);
    if !(available > 0.0) || !(cell_size > 0.0) {
        return min_columns;
    }
    // Non-negative, so the cast truncates towards zero (floor).
    let raw = ((available + gap) / (cell_size + gap)) as usize;
    raw.clamp(min_columns, max_columns)
}

impl GridLayout {
    fn resolve(grid: &GridConfig, container_cross: f64, min_size: f64) -> Self {
        let columns = compute_columns(
            container_cross,
            grid.cell_cross_size,
            grid.cross_gap,
            grid.min_columns,
            grid.max_columns,
            grid.columns_override,
        );
        let cell_cross_size = if container_cross > 0.0 {
            let gaps = (columns - 1) as f64 * grid.cross_gap;
            let stretched = ((container_cross - gaps) / columns as f64).max(0.0);
            stretched as u64 as f64
        } else {
            grid.cell_cross_size
        };
        Self {
            columns,
            cell_main_size: grid.cell_main_size,
            cell_cross_size,
            row_stride: guard_stride(grid.cell_main_size + grid.main_gap, min_size),
            column_stride: cell_cross_size + grid.cross_gap,
        }
    }
}

/// Coerces a degenerate stride to the configured minimum so divisions stay defined.
fn guard_stride(stride: f64, min_size: f64) -> f64 {
    if stride > 0.0 {
        stride
    } else if min_size > 0.0 {
        min_size
    } else {
        1.0
    }
}

/// Converts between item index and scroll offset.
///
/// Fixed and grid modes are closed-form. Measured mode keeps a Fenwick tree over strides, so a
/// single measurement updates `O(log n)` nodes and `index_at_offset` is a `O(log n)` descent.
#[derive(Clone, Debug)]
pub struct SizeModel<K> {
    mode: SizeMode,
    count: usize,
    min_size: f64,
    fixed_size: f64,
    gap: f64,
    epsilon: f64,

    grid_config: Option<GridConfig>,
    grid: GridLayout,
    container_cross: f64,

    sizes: Vec<f64>, // measured mode only, excludes gap
    measured: Vec<bool>,
    sums: Fenwick,
    key_sizes: KeyMap<K, f64>,
}

impl<K: KeyCacheKey> SizeModel<K> {
    /// Creates an empty model. `config` is expected to be validated.
    pub fn new(config: &ScrollerConfig) -> Self {
        let mode = if config.grid.is_some() {
            SizeMode::Grid
        } else if config.fixed_item_size.is_some() {
            SizeMode::Fixed
        } else {
            SizeMode::Measured
        };
        let min_size = config.min_item_size;
        let fixed_size = config
            .fixed_item_size
            .map_or(min_size, |size| size.max(min_size));
        let grid_config = config.grid;
        let grid = grid_config
            .as_ref()
            .map(|g| GridLayout::resolve(g, 0.0, min_size))
            .unwrap_or(GridLayout {
                columns: 1,
                cell_main_size: fixed_size,
                cell_cross_size: 0.0,
                row_stride: guard_stride(fixed_size, min_size),
                column_stride: 0.0,
            });
        Self {
            mode,
            count: 0,
            min_size,
            fixed_size,
            gap: config.gap,
            epsilon: config.size_epsilon,
            grid_config,
            grid,
            container_cross: 0.0,
            sizes: Vec::new(),
            measured: Vec::new(),
            sums: Fenwick::new(),
            key_sizes: KeyMap::new(),
        }
    }

    pub fn mode(&self) -> SizeMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn grid_layout(&self) -> Option<GridLayout> {
        (self.mode == SizeMode::Grid).then_some(self.grid)
    }

    /// Columns per row; `1` outside grid mode.
    pub fn columns(&self) -> usize {
        match self.mode {
            SizeMode::Grid => self.grid.columns,
            _ => 1,
        }
    }

    /// Re-keys the model for a new item list.
    ///
    /// Each entry is `(key, size_hint)` in list order. Measured sizes follow their keys, and
    /// cache entries for keys no longer present are dropped. Prefix sums are rebuilt once.
    pub fn rebuild(&mut self, entries: impl ExactSizeIterator<Item = (K, Option<f64>)>) {
        self.count = entries.len();
        if self.mode != SizeMode::Measured {
            return;
        }

        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(self.count);
        self.measured.reserve_exact(self.count);

        let mut retained = KeyMap::new();
        for (key, hint) in entries {
            if let Some(&size) = self.key_sizes.get(&key) {
                self.sizes.push(size);
                self.measured.push(true);
                retained.insert(key, size);
            } else {
                self.sizes.push(self.estimate(hint));
                self.measured.push(false);
            }
        }
        sdebug!(
            count = self.count,
            pruned = self.key_sizes.len().saturating_sub(retained.len()),
            "SizeModel::rebuild"
        );
        self.key_sizes = retained;
        self.rebuild_sums();
    }

    fn estimate(&self, hint: Option<f64>) -> f64 {
        match hint {
            Some(size) if size.is_finite() && size >= self.min_size => size,
            _ => self.min_size,
        }
    }

    fn rebuild_sums(&mut self) {
        let gap = self.gap;
        self.sums = Fenwick::from_values(self.sizes.iter().map(|&s| s + gap));
    }

    /// Size of the item at `index` on the scroll axis (excluding the gap).
    pub fn size_of(&self, index: usize) -> f64 {
        match self.mode {
            SizeMode::Fixed => self.fixed_size,
            SizeMode::Measured => self.sizes.get(index).copied().unwrap_or(self.min_size),
            SizeMode::Grid => self.grid.cell_main_size,
        }
    }

    /// Cumulative offset of the item at `index`: the sum of all preceding strides.
    ///
    /// `index == len()` yields the total size.
    pub fn offset_of(&self, index: usize) -> f64 {
        let index = index.min(self.count);
        match self.mode {
            SizeMode::Fixed => index as f64 * self.fixed_stride(),
            SizeMode::Measured => self.sums.prefix_sum(index),
            SizeMode::Grid => {
                let row = index / self.grid.columns;
                row as f64 * self.grid.row_stride
            }
        }
    }

    /// Index of the item whose stride contains `offset`, clamped to the list.
    ///
    /// In grid mode this is the first cell of the row containing `offset`.
    /// Returns `None` for an empty list.
    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let last = self.count - 1;
        if !(offset > 0.0) {
            return Some(0);
        }
        let (mut index, step) = match self.mode {
            SizeMode::Fixed => (((offset / self.fixed_stride()) as usize).min(last), 1),
            SizeMode::Measured => (self.sums.lower_bound(offset).min(last), 1),
            SizeMode::Grid => {
                let columns = self.grid.columns;
                let row = ((offset / self.grid.row_stride) as usize).min(last / columns);
                (row * columns, columns)
            }
        };
        // The descent and `offset_of` round differently; settle on
        // `offset_of(index) <= offset < offset_of(index + step)`.
        while index >= step && self.offset_of(index) > offset {
            index -= step;
        }
        while index + step <= last && self.offset_of(index + step) <= offset {
            index += step;
        }
        Some(index)
    }

    /// On-screen position of the item at `index`.
    pub fn position_of(&self, index: usize) -> Position {
        match self.mode {
            SizeMode::Grid => Position {
                main: self.offset_of(index),
                cross: (index % self.grid.columns) as f64 * self.grid.column_stride,
            },
            _ => Position {
                main: self.offset_of(index),
                cross: 0.0,
            },
        }
    }

    /// First and last index sharing a row with `index` (the item itself outside grid mode).
    pub fn row_bounds(&self, index: usize) -> (usize, usize) {
        if self.mode != SizeMode::Grid || self.count == 0 {
            return (index, index);
        }
        let columns = self.grid.columns;
        let start = index - index % columns;
        let end = (start + columns - 1).min(self.count - 1);
        (start, end)
    }

    /// Total content size on the scroll axis.
    pub fn total_size(&self) -> f64 {
        let total = match self.mode {
            SizeMode::Fixed => self.count as f64 * self.fixed_stride(),
            SizeMode::Measured => self.sums.total(),
            SizeMode::Grid => self.count.div_ceil(self.grid.columns) as f64 * self.grid.row_stride,
        };
        total.max(0.0)
    }

    fn fixed_stride(&self) -> f64 {
        guard_stride(self.fixed_size + self.gap, self.min_size)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Stores a measured size for the item at `index` with identity `key`.
    ///
    /// Sizes below the minimum are clamped up; changes within `size_epsilon` of the stored size
    /// are ignored. Only the Fenwick nodes covering `index` are touched. Returns the applied
    /// size delta. Outside measured mode this is a no-op returning `0.0`.
    pub fn record_measurement(&mut self, index: usize, key: K, size: f64) -> Result<f64, SizeError> {
        if !size.is_finite() {
            return Err(SizeError::NotFinite(size));
        }
        if size < 0.0 {
            return Err(SizeError::Negative(size));
        }
        if self.mode != SizeMode::Measured || index >= self.count {
            return Ok(0.0);
        }
        let size = size.max(self.min_size);
        let cur = self.sizes[index];
        self.measured[index] = true;
        if !self.size_changed(cur, size) {
            self.key_sizes.insert(key, cur);
            return Ok(0.0);
        }
        self.sizes[index] = size;
        self.key_sizes.insert(key, size);
        let delta = size - cur;
        self.sums.add(index, delta);
        strace!(index, size, delta, "SizeModel::record_measurement");
        Ok(delta)
    }

    /// Whether `new` differs from `old` by more than the configured epsilon.
    pub fn size_changed(&self, old: f64, new: f64) -> bool {
        let diff = old - new;
        diff > self.epsilon || -diff > self.epsilon
    }

    /// Updates the container's cross-axis size; recomputes grid columns.
    ///
    /// Returns `true` when the grid layout changed.
    pub fn set_container_cross_size(&mut self, container_cross: f64) -> bool {
        self.container_cross = container_cross.max(0.0);
        let Some(grid) = self.grid_config else {
            return false;
        };
        let next = GridLayout::resolve(&grid, self.container_cross, self.min_size);
        let changed = next != self.grid;
        self.grid = next;
        changed
    }

    /// Replaces the grid parameters and switches to grid mode.
    pub fn set_grid_parameters(&mut self, container_cross: f64, grid: GridConfig) {
        self.mode = SizeMode::Grid;
        self.grid_config = Some(grid);
        self.sizes.clear();
        self.measured.clear();
        self.sums = Fenwick::new();
        self.set_container_cross_size(container_cross);
        sdebug!(columns = self.grid.columns, "SizeModel::set_grid_parameters");
    }

    pub fn measurement_cache_len(&self) -> usize {
        self.key_sizes.len()
    }

    pub fn for_each_cached_size(&self, mut f: impl FnMut(&K, f64)) {
        for (k, v) in self.key_sizes.iter() {
            f(k, *v);
        }
    }

    /// Replaces the measured-size cache. Call [`Self::rebuild`] afterwards to apply it.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, f64)>) {
        self.key_sizes.clear();
        for (k, v) in entries {
            if v.is_finite() && v >= 0.0 {
                self.key_sizes.insert(k, v.max(self.min_size));
            }
        }
    }

    pub fn clear_measurement_cache(&mut self) {
        self.key_sizes.clear();
    }
}
