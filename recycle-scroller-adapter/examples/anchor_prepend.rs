use recycle_scroller::{Rect, ScrollerConfig, ScrollerOptions};
use recycle_scroller_adapter::Controller;

fn main() {
    // Example: keep the viewport on the same message when older ones are prepended.
    //
    // 1) capture an anchor (key + offset_in_viewport) before the data changes
    // 2) apply the data change
    // 3) apply the anchor so the same item stays in the same place
    let options =
        ScrollerOptions::new_with_key(ScrollerConfig::measured(24.0), |msg: &u64, _| *msg);
    let mut c = Controller::new(options, (1000..1100).collect()).expect("valid config");
    c.on_resize(Rect::new(240.0, 80.0), 0);
    c.on_scroll(1210.0, 1);
    c.tick(16);

    let anchor = c
        .capture_first_visible_anchor()
        .expect("visible window must not be empty");
    println!(
        "before prepend: off={} anchor={anchor:?}",
        c.scroller().scroll_offset()
    );

    c.scroller_mut().update_items(|msgs| {
        let mut older: Vec<u64> = (900..1000).collect();
        older.append(msgs);
        *msgs = older;
    });

    // Key -> index for the current dataset (owned by the adapter).
    let ok = c.apply_anchor(&anchor, |k| Some((*k - 900) as usize));
    c.tick(32);
    println!(
        "after prepend: ok={ok} off={} window={:?}",
        c.scroller().scroll_offset(),
        c.scroller().window()
    );
}
