// Example: variable-height rows measured after layout, with the sizes persisted by key.
use recycle_scroller::{Mutation, Rect, RecycleScroller, ScrollerConfig, ScrollerOptions};

#[derive(Debug)]
struct Row {
    id: u64,
    lines: u32,
}

fn main() {
    let rows: Vec<Row> = (0..10_000)
        .map(|id| Row {
            id,
            lines: 1 + (id % 4) as u32,
        })
        .collect();

    let config = ScrollerConfig::measured(18.0).with_buffer(60.0).with_gap(2.0);
    let options = ScrollerOptions::new_with_key(config, |row: &Row, _| row.id)
        .with_size_hint(|_| Some(24.0))
        .with_on_event(|event| println!("event: {event:?}"));
    let mut s = RecycleScroller::new(options, rows).expect("valid config");
    s.on_resize(Rect::new(300.0, 480.0), 0);

    let mut now_ms = 0;
    for offset in [0.0, 400.0, 900.0, 880.0] {
        s.on_scroll(offset, now_ms);
        let Some(token) = s.frame_request() else {
            continue;
        };
        now_ms += 16;
        let Some(pass) = s.on_frame(token, now_ms) else {
            continue;
        };

        // Stand-in for the layout engine: a row is 18px per line.
        let mut measured = Vec::new();
        for m in &pass.mutations {
            if let Mutation::Assign { slot, index, .. } = m {
                measured.push((*slot, *index));
            }
        }
        for (slot, index) in measured {
            let lines = s.item(index).map_or(1, |row| row.lines);
            if let Err(err) = s.measure_slot(slot, 18.0 * lines as f64) {
                eprintln!("measurement rejected: {err}");
            }
        }
        println!(
            "offset={} window={:?} total={}",
            s.scroll_offset(),
            s.window(),
            s.total_size()
        );
    }

    s.tick(now_ms + 200);
    let cache = s.export_measurement_cache();
    println!("phase={:?} cached_sizes={}", s.phase(), cache.len());
}
