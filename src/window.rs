use crate::key::KeyCacheKey;
use crate::{SizeModel, Window};

/// Computes the inclusive index window that covers
/// `[scroll_offset - buffer, scroll_offset + viewport_size + buffer)`.
///
/// Returns `None` for an empty list or an unmeasured (zero-size) viewport: the engine holds an
/// empty window until the container reports a size rather than rendering everything.
///
/// In grid mode the window is widened to whole rows.
pub fn compute_window<K: KeyCacheKey>(
    scroll_offset: f64,
    viewport_size: f64,
    buffer: f64,
    sizes: &SizeModel<K>,
) -> Option<Window> {
    if sizes.is_empty() || !(viewport_size > 0.0) {
        return None;
    }
    let low = (scroll_offset - buffer).max(0.0);
    let high = scroll_offset.max(0.0) + viewport_size + buffer;
    span(low, high, sizes)
}

/// Window of items intersecting `[low, high)`.
pub(crate) fn span<K: KeyCacheKey>(low: f64, high: f64, sizes: &SizeModel<K>) -> Option<Window> {
    let start = sizes.index_at_offset(low)?;
    let mut end = sizes.index_at_offset(high)?;
    // An item starting exactly at `high` is outside the half-open span.
    if end > start && sizes.offset_of(end) >= high {
        end -= 1;
    }
    let (start, _) = sizes.row_bounds(start);
    let (_, end) = sizes.row_bounds(end.max(start));
    Some(Window::new(start, end))
}

/// Window of items intersecting the viewport itself (no buffer).
pub fn compute_visible_window<K: KeyCacheKey>(
    scroll_offset: f64,
    viewport_size: f64,
    sizes: &SizeModel<K>,
) -> Option<Window> {
    compute_window(scroll_offset, viewport_size, 0.0, sizes)
}
