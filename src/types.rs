/// Scroll axis of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// `Idle → Scrolling` on the first scroll/resize event, back to `Idle` after a quiet period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPhase {
    #[default]
    Idle,
    Scrolling,
}

/// Viewport extent: `main` is the scroll axis, `cross` the perpendicular one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: f64,
    pub cross: f64,
}

impl Rect {
    pub fn new(main: f64, cross: f64) -> Self {
        Self { main, cross }
    }
}

/// On-screen offset of a slot. `cross` is always `0.0` outside grid mode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub main: f64,
    pub cross: f64,
}

impl Position {
    /// Maps the position onto `(x, y)` for the given scroll direction.
    pub fn to_xy(self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Vertical => (self.cross, self.main),
            Direction::Horizontal => (self.main, self.cross),
        }
    }
}

/// An inclusive, non-empty index range. Empty windows are represented as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize, // inclusive
}

impl Window {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(start_index <= end_index, "Window: start > end");
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }

    pub fn indexes(&self) -> core::ops::RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
}

/// Stable identifier of a pooled view. Assigned once and never reused for another slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(pub u32);

impl SlotId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Optional discriminator for heterogeneous item templates.
pub type ItemType = u64;

/// Positional key used when no key function is configured.
pub type ItemKey = u64;

/// A single change a render target must apply to reach the new window.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation<K> {
    /// `slot` now shows the item at `index`; any previous binding is gone.
    Assign {
        slot: SlotId,
        index: usize,
        key: K,
        item_type: Option<ItemType>,
        position: Position,
        size: f64,
    },
    /// `slot` keeps its item but moved (or its item moved to another index).
    Reposition {
        slot: SlotId,
        index: usize,
        position: Position,
        size: f64,
    },
    /// `slot` went idle and should be hidden (but not destroyed).
    Release { slot: SlotId, key: K },
}

impl<K> Mutation<K> {
    pub fn slot(&self) -> SlotId {
        match self {
            Self::Assign { slot, .. } | Self::Reposition { slot, .. } | Self::Release { slot, .. } => {
                *slot
            }
        }
    }
}

/// A bound view as seen by the render target.
#[derive(Clone, Copy, Debug)]
pub struct RenderedView<'a, T, K> {
    pub slot: SlotId,
    pub index: usize,
    pub key: &'a K,
    pub item: &'a T,
    pub position: Position,
    /// Size on the scroll axis (excludes the gap).
    pub size: f64,
}

/// Notifications emitted to `ScrollerOptions::on_event`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollerEvent {
    ScrollStart,
    ScrollEnd,
    Resize {
        viewport: Rect,
    },
    /// The rendered window changed. Indexes are inclusive; `visible_*` exclude the buffer.
    Update {
        start_index: usize,
        end_index: usize,
        visible_start_index: usize,
        visible_end_index: usize,
    },
}
