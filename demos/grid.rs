// Example: grid mode with the column count following the container width.
use recycle_scroller::{GridConfig, Rect, RecycleScroller, ScrollerConfig, ScrollerOptions};

fn main() {
    let grid = GridConfig::new(200.0, 200.0)
        .with_gaps(10.0, 10.0)
        .with_column_range(1, 6);
    let config = ScrollerConfig::grid(grid).with_buffer(0.0);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..500u32).collect())
        .expect("valid config");

    for width in [1000.0, 640.0, 1600.0] {
        s.on_resize(Rect::new(600.0, width), 0);
        s.flush();
        let layout = s.size_model().grid_layout();
        println!(
            "width={width} layout={layout:?} total={} window={:?}",
            s.total_size(),
            s.window()
        );
    }

    s.for_each_view(|view| {
        if view.index < 4 {
            let (x, y) = view.position.to_xy(s.options().config.direction);
            println!("item {} in slot {} at ({x}, {y})", view.item, view.slot.0);
        }
    });
}
