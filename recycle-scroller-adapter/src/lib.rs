//! Adapter utilities for the `recycle-scroller` crate.
//!
//! The `recycle-scroller` crate is UI-agnostic and owns the windowing and slot-recycling state.
//! This crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//! - Tween-based smooth scrolling helpers (optional; adapter-driven)
//! - Scroll metrics (event counts, velocity, mutations per pass)
//!
//! No UI toolkit bindings live here.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod anchor;
mod controller;
mod key;
mod metrics;
mod tween;


pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::Controller;
pub use key::ScrollerKey;
pub use metrics::ScrollMetrics;
pub use tween::{Easing, Tween};
