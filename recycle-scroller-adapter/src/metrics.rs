use recycle_scroller::ScrollDirection;

/// Counters an adapter can surface in a debug overlay.
///
/// Velocity is in pixels per millisecond. `average_mutations` is an exponential moving average
/// (weights 0.9 / 0.1) of the mutations emitted per pass, a proxy for per-frame render cost.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub scroll_events: u64,
    pub resize_events: u64,
    pub frame_passes: u64,
    pub average_mutations: f64,
    pub max_mutations: usize,
    pub velocity: f64,
    pub direction: Option<ScrollDirection>,
    last_offset: Option<f64>,
    last_scroll_ms: Option<u64>,
}

impl ScrollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scroll(&mut self, offset: f64, now_ms: u64) {
        self.scroll_events += 1;
        if let Some(prev) = self.last_offset {
            let delta = offset - prev;
            let dt = self.last_scroll_ms.map_or(0, |last| now_ms.saturating_sub(last));
            if dt > 0 {
                let distance = if delta < 0.0 { -delta } else { delta };
                self.velocity = distance / dt as f64;
            }
            if delta > 0.0 {
                self.direction = Some(ScrollDirection::Forward);
            } else if delta < 0.0 {
                self.direction = Some(ScrollDirection::Backward);
            }
        }
        self.last_offset = Some(offset);
        self.last_scroll_ms = Some(now_ms);
    }

    pub fn record_resize(&mut self) {
        self.resize_events += 1;
    }

    pub fn record_pass(&mut self, mutations: usize) {
        self.frame_passes += 1;
        self.average_mutations = self.average_mutations * 0.9 + mutations as f64 * 0.1;
        self.max_mutations = self.max_mutations.max(mutations);
    }

    /// Scrolling stopped: velocity and direction no longer apply.
    pub fn record_idle(&mut self) {
        self.velocity = 0.0;
        self.direction = None;
        self.last_scroll_ms = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
