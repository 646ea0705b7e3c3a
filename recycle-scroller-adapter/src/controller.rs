use alloc::vec::Vec;

use recycle_scroller::{
    Align, ConfigError, ItemKey, Reconciliation, RecycleScroller, Rect, ScrollerOptions,
};

use crate::{
    Easing, ScrollAnchor, ScrollMetrics, ScrollerKey, Tween, apply_anchor,
    capture_first_visible_anchor,
};

/// A framework-neutral controller that wraps a [`RecycleScroller`] and provides common adapter
/// workflows (anchoring, tween-driven scrolling, metrics).
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_resize` / `on_scroll` when UI events occur
/// - `tick(now_ms)` each frame (tweens, the pending window pass, idle detection)
///
/// For UI scroll containers (e.g. DOM), use the offset returned from `tick()` to set the real
/// scroll position while a tween runs.
#[derive(Debug)]
pub struct Controller<T, K = ItemKey> {
    s: RecycleScroller<T, K>,
    tween: Option<Tween>,
    metrics: ScrollMetrics,
}

impl<T, K: ScrollerKey> Controller<T, K> {
    pub fn new(options: ScrollerOptions<T, K>, items: Vec<T>) -> Result<Self, ConfigError> {
        Ok(Self::from_scroller(RecycleScroller::new(options, items)?))
    }

    pub fn from_scroller(s: RecycleScroller<T, K>) -> Self {
        Self {
            s,
            tween: None,
            metrics: ScrollMetrics::new(),
        }
    }

    pub fn scroller(&self) -> &RecycleScroller<T, K> {
        &self.s
    }

    pub fn scroller_mut(&mut self) -> &mut RecycleScroller<T, K> {
        &mut self.s
    }

    pub fn into_scroller(self) -> RecycleScroller<T, K> {
        self.s
    }

    pub fn metrics(&self) -> &ScrollMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }

    pub fn on_resize(&mut self, viewport: Rect, now_ms: u64) {
        self.metrics.record_resize();
        self.s.on_resize(viewport, now_ms);
    }

    /// Call this when the UI reports a scroll offset change (e.g. user wheel/drag).
    ///
    /// This cancels any active tween.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64) {
        self.cancel_animation();
        self.apply_offset(offset, now_ms);
    }

    fn apply_offset(&mut self, offset: f64, now_ms: u64) {
        let offset = self.s.clamp_scroll_offset(offset);
        self.metrics.record_scroll(offset, now_ms);
        self.s.on_scroll(offset, now_ms);
    }

    /// Advances the controller by one frame.
    ///
    /// - If a tween is active, moves the scroll offset along it.
    /// - Runs the pending window pass, if any, and idle detection.
    ///
    /// Returns the tweened offset, or `None` when no tween was active.
    pub fn tick(&mut self, now_ms: u64) -> Option<f64> {
        let mut tweened = None;
        if let Some(tween) = self.tween {
            self.apply_offset(tween.sample(now_ms), now_ms);
            if tween.is_done(now_ms) {
                self.tween = None;
            }
            tweened = Some(self.s.scroll_offset());
        }

        if let Some(pass) = self.s.tick(now_ms) {
            self.metrics.record_pass(pass.mutations.len());
        }
        if !self.s.is_scrolling() {
            self.metrics.record_idle();
        }
        tweened
    }

    /// Mutations produced by the most recent pass.
    pub fn last_pass(&self) -> &Reconciliation<K> {
        self.s.last_pass()
    }

    /// Scrolls to an index immediately (no animation).
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align, now_ms: u64) -> f64 {
        self.cancel_animation();
        let offset = self.s.scroll_to_index_offset(index, align);
        self.apply_offset(offset, now_ms);
        self.s.scroll_offset()
    }

    /// Scrolls to an offset immediately (no animation).
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_offset(&mut self, offset: f64, now_ms: u64) -> f64 {
        self.cancel_animation();
        self.apply_offset(offset, now_ms);
        self.s.scroll_offset()
    }

    /// Starts a tween to an index.
    ///
    /// Returns the clamped target offset.
    pub fn start_tween_to_index(
        &mut self,
        index: usize,
        align: Align,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> f64 {
        let to = self.s.scroll_to_index_offset(index, align);
        self.start_tween_to_offset(to, now_ms, duration_ms, easing)
    }

    /// Starts a tween to an offset. An active tween is retargeted from its current position.
    ///
    /// Returns the clamped target offset.
    pub fn start_tween_to_offset(
        &mut self,
        offset: f64,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> f64 {
        let to = self.s.clamp_scroll_offset(offset);
        match &mut self.tween {
            Some(tween) => tween.retarget(now_ms, to, duration_ms),
            None => {
                let from = self.s.scroll_offset();
                self.tween = Some(Tween::new(from, to, now_ms, duration_ms, easing));
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "recycle_scroller_adapter",
            to,
            duration_ms,
            "Controller::start_tween_to_offset"
        );
        to
    }

    pub fn capture_first_visible_anchor(&self) -> Option<ScrollAnchor<K>> {
        capture_first_visible_anchor(&self.s)
    }

    /// Captures an anchor for the item at a given offset in the viewport.
    ///
    /// For example, `offset_in_viewport = 0.0` anchors the item at the top of the viewport.
    pub fn capture_anchor_at_offset_in_viewport(
        &self,
        offset_in_viewport: f64,
    ) -> Option<ScrollAnchor<K>> {
        let abs = self.s.scroll_offset() + offset_in_viewport.max(0.0);
        let index = self.s.size_model().index_at_offset(abs)?;
        let start = self.s.size_model().offset_of(index);
        Some(ScrollAnchor {
            key: self.s.key_for(index)?,
            offset_in_viewport: self.s.scroll_offset() - start,
        })
    }

    /// Applies a previously captured anchor by adjusting the scroll offset.
    ///
    /// This cancels any active tween.
    pub fn apply_anchor(
        &mut self,
        anchor: &ScrollAnchor<K>,
        key_to_index: impl FnMut(&K) -> Option<usize>,
    ) -> bool {
        self.cancel_animation();
        apply_anchor(&mut self.s, anchor, key_to_index)
    }
}
