//! A headless windowing and view-recycling engine for virtual scrolling.
//!
//! For adapter-level utilities (anchoring, tweens, a frame-loop controller), see the
//! `recycle-scroller-adapter` crate.
//!
//! Only the items intersecting the viewport (plus a buffer) are bound to views, and the views
//! themselves live in a bounded pool of reusable slots. Each frame the engine computes the index
//! window for the current scroll offset and reconciles it against the pool, producing a minimal
//! list of [`Mutation`]s (assign, reposition, release) for the render target to apply.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport size and scroll offset events
//! - a frame callback (see [`RecycleScroller::frame_request`])
//! - measured item sizes, when items are not fixed-size
//!
//! Three sizing modes are supported: fixed, measured (prefix sums in a Fenwick tree) and grid.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fenwick;
mod key;
mod options;
mod pool;
mod reconcile;
mod scroller;
mod size;
mod state;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, IdentityConflict, PoolError, SizeError};
pub use options::{
    GridConfig, ItemTypeFn, KeyFn, OnEventCallback, ScrollerConfig, ScrollerOptions, SizeHintFn,
};
pub use pool::{Slot, ViewPool};
pub use reconcile::{Reconciler, Reconciliation};
pub use scroller::{FrameToken, RecycleScroller};
pub use size::{GridLayout, SizeMode, SizeModel, compute_columns};
pub use state::{FrameState, ScrollState, ViewportState};
pub use types::{
    Align, Direction, ItemKey, ItemType, Mutation, Position, Rect, RenderedView, ScrollDirection,
    ScrollPhase, ScrollerEvent, SlotId, Window,
};
pub use window::{compute_visible_window, compute_window};

#[doc(hidden)]
pub use key::KeyCacheKey;
