// Example: minimal usage with a fixed item size.
use recycle_scroller::{Align, Mutation, Rect, RecycleScroller, ScrollerConfig, ScrollerOptions};

fn main() {
    let config = ScrollerConfig::fixed(50.0).with_buffer(100.0);
    let items: Vec<u32> = (0..1_000_000).collect();
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), items).expect("valid config");
    s.on_resize(Rect::new(500.0, 320.0), 0);
    s.on_scroll(123_456.0, 0);

    let mutations = s.flush().mutations.len();
    println!("total_size={}", s.total_size());
    println!("window={:?} mutations={mutations}", s.window());

    let mut views = Vec::new();
    s.collect_views(&mut views);
    println!("first_view={:?}", views.first());

    let off = s.scroll_to_index(999_999, Align::End);
    for m in &s.flush().mutations {
        if let Mutation::Assign { slot, index, .. } = m {
            println!("slot {} <- item {index}", slot.0);
        }
    }
    println!("after scroll_to_index: offset={off} slots={}", s.pool().len());
}
