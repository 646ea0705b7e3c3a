/// A timed move of the scroll offset from `from` to `to`.
///
/// The controller samples it once per frame and feeds the result through its clamped scroll
/// path, so a tween never has to know the content size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    /// A zero duration is stretched to one millisecond.
    pub fn new(from: f64, to: f64, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms >= self.end_ms()
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.end_ms().saturating_sub(now_ms)
    }

    /// Linear time progress in `[0, 1]`, before easing.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f64 / self.duration_ms as f64).min(1.0)
    }

    /// Offset at `now_ms`. A finished tween lands exactly on `to`.
    pub fn sample(&self, now_ms: u64) -> f64 {
        if self.is_done(now_ms) {
            return self.to;
        }
        let eased = self.easing.sample(self.progress(now_ms));
        self.from + (self.to - self.from) * eased
    }

    /// Redirects the tween to `new_to`, starting from wherever it is at `now_ms`.
    ///
    /// Retargeting onto the current destination keeps the running schedule.
    pub fn retarget(&mut self, now_ms: u64, new_to: f64, duration_ms: u64) {
        if new_to == self.to && !self.is_done(now_ms) {
            return;
        }
        let from = self.sample(now_ms);
        *self = Self::new(from, new_to, now_ms, duration_ms, self.easing);
    }
}

/// Easing curve applied to a tween's time progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseInOutCubic,
    /// Fast start, gentle landing; close to a browser's smooth `scrollTo`.
    EaseOutCubic,
}

impl Easing {
    /// Maps `t` in `[0, 1]` to eased progress in `[0, 1]`. Out-of-range `t` is clamped.
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t * t * t,
            Self::EaseInOutCubic => {
                let rest = 1.0 - t;
                1.0 - 4.0 * rest * rest * rest
            }
            Self::EaseOutCubic => {
                let rest = 1.0 - t;
                1.0 - rest * rest * rest
            }
        }
    }
}
