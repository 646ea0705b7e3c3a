use alloc::vec::Vec;
use core::cmp;

use crate::key::KeyCacheKey;
use crate::window::{compute_visible_window, compute_window};
use crate::{
    Align, ConfigError, FrameState, ItemKey, Reconciler, Reconciliation, Rect,
    RenderedView, ScrollDirection, ScrollPhase, ScrollState, ScrollerEvent, ScrollerOptions,
    SizeError, SizeModel, SlotId, ViewPool, ViewportState, Window,
};

/// Identifies a scheduled recomputation. A newer event replaces the pending token, so a
/// callback holding an older one is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameToken(u64);

/// A headless windowing and view-recycling engine.
///
/// The host drives it with explicit events:
/// - `on_scroll` / `on_resize` / `set_items` / `record_measurement` update state and schedule a
///   frame (see [`Self::frame_request`]).
/// - `on_frame` (or `tick`) runs at most one window + reconciliation pass per frame and returns
///   the slot mutations to apply.
///
/// It holds no UI objects; render targets own their views and address them by [`SlotId`].
pub struct RecycleScroller<T, K = ItemKey> {
    options: ScrollerOptions<T, K>,
    items: Vec<T>,

    sizes: SizeModel<K>,
    pool: ViewPool<K>,
    reconciler: Reconciler<K>,

    viewport: Rect,
    scroll_offset: f64,
    scroll_direction: Option<ScrollDirection>,
    phase: ScrollPhase,
    last_event_ms: Option<u64>,
    surface_available: bool,

    pending_frame: Option<FrameToken>,
    next_token: u64,
    window: Option<Window>,
    last_pass: Reconciliation<K>,
}

impl<T, K: KeyCacheKey> RecycleScroller<T, K> {
    /// Creates a scroller over `items`.
    ///
    /// The configuration is validated here; this is the only place initialization can fail.
    /// A first frame is scheduled, but nothing renders until the viewport has a nonzero size.
    pub fn new(options: ScrollerOptions<T, K>, items: Vec<T>) -> Result<Self, ConfigError> {
        options.config.validate()?;
        sdebug!(
            count = items.len(),
            buffer = options.config.buffer,
            "RecycleScroller::new"
        );
        let mut s = Self {
            sizes: SizeModel::new(&options.config),
            pool: ViewPool::new(options.config.pool_capacity),
            reconciler: Reconciler::new(),
            options,
            items,
            viewport: Rect::default(),
            scroll_offset: 0.0,
            scroll_direction: None,
            phase: ScrollPhase::Idle,
            last_event_ms: None,
            surface_available: true,
            pending_frame: None,
            next_token: 0,
            window: None,
            last_pass: Reconciliation::default(),
        };
        s.rebuild_sizes();
        s.request_frame();
        Ok(s)
    }

    pub fn options(&self) -> &ScrollerOptions<T, K> {
        &self.options
    }

    /// Replaces the options. Measured sizes survive as long as measured mode stays selected.
    pub fn set_options(&mut self, options: ScrollerOptions<T, K>) -> Result<(), ConfigError> {
        options.config.validate()?;
        let mut sizes = SizeModel::new(&options.config);
        let mut cached = Vec::with_capacity(self.sizes.measurement_cache_len());
        self.sizes.for_each_cached_size(|k, v| cached.push((k.clone(), v)));
        sizes.import_measurement_cache(cached);
        sizes.set_container_cross_size(self.viewport.cross);
        self.sizes = sizes;
        self.pool.set_capacity(options.config.pool_capacity);
        self.options = options;
        sdebug!(config = ?self.options.config, "RecycleScroller::set_options");
        self.rebuild_sizes();
        self.request_frame();
        Ok(())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the whole item list.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.notify_items_changed();
    }

    /// Mutates the item list in place (append/remove/reorder), then re-keys.
    pub fn update_items(&mut self, f: impl FnOnce(&mut Vec<T>)) {
        f(&mut self.items);
        self.notify_items_changed();
    }

    /// Re-keys after the item list changed: measured sizes follow their keys, sizes of removed
    /// items are pruned, and the offset is clamped to the new content size.
    pub fn notify_items_changed(&mut self) {
        self.rebuild_sizes();
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
        self.request_frame();
    }

    fn rebuild_sizes(&mut self) {
        let get_key = &self.options.get_item_key;
        let get_hint = self.options.get_size_hint.as_ref();
        let entries = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (get_key(item, i), get_hint.and_then(|f| f(item))));
        self.sizes.rebuild(entries);
    }

    pub fn key_for(&self, index: usize) -> Option<K> {
        let item = self.items.get(index)?;
        Some((self.options.get_item_key)(item, index))
    }

    pub fn size_model(&self) -> &SizeModel<K> {
        &self.sizes
    }

    pub fn pool(&self) -> &ViewPool<K> {
        &self.pool
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_scrolling(&self) -> bool {
        self.phase == ScrollPhase::Scrolling
    }

    pub fn total_size(&self) -> f64 {
        self.sizes.total_size()
    }

    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_size() - self.viewport.main).max(0.0)
    }

    pub fn clamp_scroll_offset(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_scroll_offset())
    }

    /// Reports whether a live rendering surface exists.
    ///
    /// Without one, measurements are ignored and only the first `prerender` items are rendered.
    pub fn set_surface_available(&mut self, available: bool) {
        if self.surface_available == available {
            return;
        }
        self.surface_available = available;
        sdebug!(available, "RecycleScroller::set_surface_available");
        self.request_frame();
    }

    pub fn surface_available(&self) -> bool {
        self.surface_available
    }

    /// Applies a scroll offset reported by the UI and schedules a frame.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64) {
        if !offset.is_finite() {
            swarn!(offset, "ignoring non-finite scroll offset");
            return;
        }
        strace!(offset, now_ms, "on_scroll");
        self.set_offset(offset.max(0.0));
        self.mark_event(now_ms);
        self.request_frame();
    }

    /// Applies a new viewport size and schedules a frame.
    ///
    /// In grid mode `rect.cross` is the container's cross size and drives the column count.
    pub fn on_resize(&mut self, rect: Rect, now_ms: u64) {
        let rect = Rect {
            main: sanitize_extent(rect.main),
            cross: sanitize_extent(rect.cross),
        };
        if rect == self.viewport {
            return;
        }
        strace!(main = rect.main, cross = rect.cross, now_ms, "on_resize");
        self.viewport = rect;
        self.sizes.set_container_cross_size(rect.cross);
        self.emit(ScrollerEvent::Resize { viewport: rect });
        self.mark_event(now_ms);
        self.request_frame();
    }

    fn set_offset(&mut self, offset: f64) {
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.partial_cmp(&prev) {
            Some(cmp::Ordering::Greater) => Some(ScrollDirection::Forward),
            Some(cmp::Ordering::Less) => Some(ScrollDirection::Backward),
            _ => self.scroll_direction,
        };
    }

    fn mark_event(&mut self, now_ms: u64) {
        self.last_event_ms = Some(now_ms);
        if self.phase == ScrollPhase::Idle {
            self.phase = ScrollPhase::Scrolling;
            self.emit(ScrollerEvent::ScrollStart);
        }
    }

    /// Returns to `Idle` once `idle_delay_ms` passed since the last scroll/resize event.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if self.phase != ScrollPhase::Scrolling {
            return;
        }
        let Some(last) = self.last_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.config.idle_delay_ms {
            self.phase = ScrollPhase::Idle;
            self.scroll_direction = None;
            self.last_event_ms = None;
            self.emit(ScrollerEvent::ScrollEnd);
        }
    }

    /// Target offset for bringing `index` into view with `align`, clamped to
    /// `[0, total_size - viewport]`.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> f64 {
        let count = self.items.len();
        if count == 0 {
            return 0.0;
        }
        let index = index.min(count - 1);
        let start = self.sizes.offset_of(index);
        let size = self.sizes.size_of(index);
        let end = start + size;
        let view = self.viewport.main;

        let target = match align {
            Align::Start => start,
            Align::End => end - view,
            Align::Center => start + size / 2.0 - view / 2.0,
            Align::Auto => {
                let cur = self.scroll_offset;
                if start >= cur && end <= cur + view {
                    cur
                } else if start < cur {
                    start
                } else {
                    end - view
                }
            }
        };
        self.clamp_scroll_offset(target)
    }

    /// Scrolls so `index` is aligned as requested; the re-window happens on the next frame.
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> f64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.scroll_to_offset(offset)
    }

    /// Sets the offset directly (clamped). Returns the applied offset.
    pub fn scroll_to_offset(&mut self, offset: f64) -> f64 {
        let offset = self.clamp_scroll_offset(offset);
        self.set_offset(offset);
        self.request_frame();
        offset
    }

    fn request_frame(&mut self) {
        self.next_token = self.next_token.wrapping_add(1);
        self.pending_frame = Some(FrameToken(self.next_token));
    }

    /// The currently pending frame, if any. Hosts schedule a frame callback for each new token
    /// and may cancel callbacks holding older ones.
    pub fn frame_request(&self) -> Option<FrameToken> {
        self.pending_frame
    }

    /// Frame callback. Runs a pass only if `token` is still the pending one.
    pub fn on_frame(&mut self, token: FrameToken, now_ms: u64) -> Option<&Reconciliation<K>> {
        let current = self.pending_frame == Some(token);
        if current {
            self.pending_frame = None;
            self.run_pass();
        }
        self.update_scrolling(now_ms);
        current.then_some(&self.last_pass)
    }

    /// Frame-loop convenience: runs the pending pass, if any, and the idle timer.
    pub fn tick(&mut self, now_ms: u64) -> Option<&Reconciliation<K>> {
        match self.pending_frame {
            Some(token) => self.on_frame(token, now_ms),
            None => {
                self.update_scrolling(now_ms);
                None
            }
        }
    }

    /// Runs a pass immediately, discarding any pending frame.
    pub fn flush(&mut self) -> &Reconciliation<K> {
        self.pending_frame = None;
        self.run_pass();
        &self.last_pass
    }

    /// Window the next pass will use.
    pub fn compute_window(&self) -> Option<Window> {
        if !self.surface_available {
            let n = cmp::min(self.options.config.prerender, self.items.len());
            return (n > 0).then(|| Window::new(0, n - 1));
        }
        compute_window(
            self.scroll_offset,
            self.viewport.main,
            self.options.config.buffer,
            &self.sizes,
        )
    }

    /// Items intersecting the viewport itself, without the buffer.
    pub fn visible_window(&self) -> Option<Window> {
        if !self.surface_available {
            return self.compute_window();
        }
        compute_visible_window(self.scroll_offset, self.viewport.main, &self.sizes)
    }

    /// Window applied by the last pass.
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Mutations produced by the last pass.
    pub fn last_pass(&self) -> &Reconciliation<K> {
        &self.last_pass
    }

    fn run_pass(&mut self) {
        let window = self.compute_window();
        let items = &self.items;
        let get_key = &self.options.get_item_key;
        let get_type = self.options.get_item_type.as_ref();
        self.last_pass = self
            .reconciler
            .reconcile(&mut self.pool, window, &self.sizes, |i| {
                let item = &items[i];
                (get_key(item, i), get_type.and_then(|f| f(item)))
            });
        strace!(
            start = ?window.map(|w| w.start_index),
            end = ?window.map(|w| w.end_index),
            mutations = self.last_pass.mutations.len(),
            "run_pass"
        );

        if window != self.window {
            self.window = window;
            if let (Some(w), Some(v)) = (window, self.visible_window()) {
                self.emit(ScrollerEvent::Update {
                    start_index: w.start_index,
                    end_index: w.end_index,
                    visible_start_index: v.start_index,
                    visible_end_index: v.end_index,
                });
            }
        }
    }

    /// Stores a measurement for the item at `index`.
    ///
    /// Returns the applied size delta (`0.0` if unchanged within epsilon, outside measured mode,
    /// or without a rendering surface). When the item starts above the scroll offset and
    /// `adjust_scroll_on_resize` is set, the offset shifts by the delta to keep content still.
    pub fn record_measurement(&mut self, index: usize, size: f64) -> Result<f64, SizeError> {
        let Some(key) = self.key_for(index) else {
            return Ok(0.0);
        };
        if !self.surface_available {
            return Ok(0.0);
        }
        let start = self.sizes.offset_of(index);
        let delta = self.sizes.record_measurement(index, key, size)?;
        if delta != 0.0 {
            if self.options.config.adjust_scroll_on_resize && start < self.scroll_offset {
                self.scroll_offset = (self.scroll_offset + delta).max(0.0);
            }
            self.request_frame();
        }
        Ok(delta)
    }

    /// Stores a measurement reported for the view held by `slot`.
    pub fn measure_slot(&mut self, slot: SlotId, size: f64) -> Result<f64, SizeError> {
        let Some(index) = self.pool.slot(slot).and_then(|s| s.index()) else {
            return Ok(0.0);
        };
        self.record_measurement(index, size)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.sizes.is_measured(index)
    }

    pub fn measurement_cache_len(&self) -> usize {
        self.sizes.measurement_cache_len()
    }

    /// Exports the measured sizes (key → size), e.g. for persistence.
    pub fn export_measurement_cache(&self) -> Vec<(K, f64)> {
        let mut out = Vec::with_capacity(self.sizes.measurement_cache_len());
        self.sizes.for_each_cached_size(|k, v| out.push((k.clone(), v)));
        out
    }

    /// Replaces the measured sizes and re-keys the list.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, f64)>) {
        self.sizes.import_measurement_cache(entries);
        self.rebuild_sizes();
        self.request_frame();
    }

    pub fn reset_measurements(&mut self) {
        self.sizes.clear_measurement_cache();
        self.rebuild_sizes();
        self.request_frame();
    }

    /// Visits every bound view of the current window in index order.
    pub fn for_each_view<'a>(&'a self, mut f: impl FnMut(RenderedView<'a, T, K>)) {
        let Some(window) = self.window else {
            return;
        };
        for index in window.indexes() {
            let Some(item) = self.items.get(index) else {
                break;
            };
            let key = (self.options.get_item_key)(item, index);
            let Some(slot) = self.pool.find_by_key(&key).and_then(|id| self.pool.slot(id)) else {
                continue;
            };
            if slot.index() != Some(index) {
                continue;
            }
            let (Some(key), Some(position)) = (slot.key(), slot.position()) else {
                continue;
            };
            f(RenderedView {
                slot: slot.id(),
                index,
                key,
                item,
                position,
                size: slot.size(),
            });
        }
    }

    /// Collects the bound views into `out` (clears `out` first).
    pub fn collect_views<'a>(&'a self, out: &mut Vec<RenderedView<'a, T, K>>) {
        out.clear();
        self.for_each_view(|v| out.push(v));
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            rect: self.viewport,
        }
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            offset: self.scroll_offset,
            phase: self.phase,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.viewport_state(),
            scroll: self.scroll_state(),
        }
    }

    /// Restores a snapshot. A `Scrolling` phase is resumed as if a scroll event happened at
    /// `now_ms`.
    pub fn restore_frame_state(&mut self, frame: FrameState, now_ms: u64) {
        self.viewport = Rect {
            main: sanitize_extent(frame.viewport.rect.main),
            cross: sanitize_extent(frame.viewport.rect.cross),
        };
        self.sizes.set_container_cross_size(self.viewport.cross);
        let offset = self.clamp_scroll_offset(frame.scroll.offset);
        self.set_offset(offset);
        if frame.scroll.phase == ScrollPhase::Scrolling {
            self.mark_event(now_ms);
        }
        self.request_frame();
    }

    /// Drops every slot. The next pass starts from an empty pool.
    pub fn teardown(&mut self) {
        sdebug!(slots = self.pool.len(), "RecycleScroller::teardown");
        self.pool.clear();
        self.window = None;
        self.last_pass = Reconciliation::default();
        self.pending_frame = None;
        self.phase = ScrollPhase::Idle;
        self.last_event_ms = None;
        self.scroll_direction = None;
    }

    fn emit(&self, event: ScrollerEvent) {
        if let Some(cb) = &self.options.on_event {
            cb(event);
        }
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for RecycleScroller<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecycleScroller")
            .field("count", &self.items.len())
            .field("viewport", &self.viewport)
            .field("scroll_offset", &self.scroll_offset)
            .field("phase", &self.phase)
            .field("window", &self.window)
            .field("slots", &self.pool.len())
            .finish_non_exhaustive()
    }
}
