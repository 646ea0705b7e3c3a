use core::fmt;

use recycle_scroller::RecycleScroller;

use crate::ScrollerKey;

/// Keeps the viewport pinned to an item identity across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - any reorder/replace where the viewport should stay on the same item
#[derive(Clone, PartialEq)]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// Distance from the anchor item's start to the scroll offset; negative when the item starts
    /// below the offset.
    pub offset_in_viewport: f64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the first visible item.
///
/// Returns `None` while nothing is visible (empty list, unmeasured viewport).
pub fn capture_first_visible_anchor<T, K: ScrollerKey>(
    s: &RecycleScroller<T, K>,
) -> Option<ScrollAnchor<K>> {
    let visible = s.visible_window()?;
    let index = visible.start_index;
    let start = s.size_model().offset_of(index);
    let key = s.key_for(index)?;
    Some(ScrollAnchor {
        key,
        offset_in_viewport: (s.scroll_offset() - start).max(0.0),
    })
}

/// Applies a previously captured anchor by moving the scroll offset.
///
/// `key_to_index` maps keys to indexes of the *current* item list.
///
/// Returns `true` when the anchor was applied.
pub fn apply_anchor<T, K: ScrollerKey>(
    s: &mut RecycleScroller<T, K>,
    anchor: &ScrollAnchor<K>,
    mut key_to_index: impl FnMut(&K) -> Option<usize>,
) -> bool {
    let Some(index) = key_to_index(&anchor.key) else {
        return false;
    };
    if index >= s.len() {
        return false;
    }
    let target = s.size_model().offset_of(index) + anchor.offset_in_viewport;
    s.scroll_to_offset(target);
    true
}
