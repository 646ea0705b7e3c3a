use recycle_scroller::{Align, Rect, ScrollerConfig, ScrollerOptions};
use recycle_scroller_adapter::{Controller, Easing};

fn main() {
    // Example: controller driving a smooth scroll without holding any UI objects.
    //
    // An adapter would:
    // - start a tween (e.g. in response to a "scroll to index" command)
    // - call tick(now_ms) in a frame loop
    // - apply the returned offset to the real scroll container (if any)
    // - apply the last pass's mutations to its views
    let options = ScrollerOptions::new(ScrollerConfig::fixed(20.0));
    let mut c = Controller::new(options, (0..10_000u32).collect()).expect("valid config");
    c.on_resize(Rect::new(400.0, 300.0), 0);

    let target = c.start_tween_to_index(2_000, Align::Center, 0, 240, Easing::SmoothStep);
    println!("target_offset={target}");

    let mut now_ms = 0u64;
    while let Some(off) = c.tick(now_ms) {
        if now_ms % 80 == 0 {
            println!(
                "t={now_ms} off={off} window={:?} mutations={}",
                c.scroller().window(),
                c.last_pass().mutations.len()
            );
        }
        now_ms += 16;
    }

    println!(
        "done: off={} slots={} metrics={:?}",
        c.scroller().scroll_offset(),
        c.scroller().pool().len(),
        c.metrics()
    );
}
