use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }
}

fn expected_offset(sizes: &[f64], gap: f64, index: usize) -> f64 {
    sizes[..index].iter().map(|s| s + gap).sum()
}

fn measured_model(sizes: &[f64], gap: f64) -> SizeModel<u64> {
    let config = ScrollerConfig::measured(1.0).with_gap(gap);
    let mut m = SizeModel::new(&config);
    m.rebuild(sizes.iter().enumerate().map(|(i, &s)| (i as u64, Some(s))));
    m
}

fn fixed_scroller(count: usize, size: f64, viewport: f64, buffer: f64) -> RecycleScroller<usize> {
    let config = ScrollerConfig::fixed(size).with_buffer(buffer);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..count).collect()).unwrap();
    s.on_resize(Rect::new(viewport, 300.0), 0);
    s
}

fn keyed_scroller(keys: Vec<u64>, config: ScrollerConfig) -> RecycleScroller<u64, u64> {
    let options = ScrollerOptions::new_with_key(config, |item: &u64, _| *item);
    RecycleScroller::new(options, keys).unwrap()
}

fn slot_of<T>(s: &RecycleScroller<T>, key: u64) -> Option<SlotId> {
    s.pool().find_by_key(&key)
}

fn check_bindings(s: &RecycleScroller<usize>) {
    let Some(w) = s.window() else {
        assert_eq!(s.pool().bound_len(), 0);
        return;
    };
    assert_eq!(s.pool().bound_len(), w.len());
    for i in w.indexes() {
        let key = s.key_for(i).unwrap();
        let id = s.pool().find_by_key(&key).unwrap();
        let slot = s.pool().slot(id).unwrap();
        assert_eq!(slot.index(), Some(i));
        assert_eq!(slot.position().unwrap().main, s.size_model().offset_of(i));
    }
}

#[test]
fn fixed_window_covers_buffer_around_viewport() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(0, 11)));

    s.on_scroll(1000.0, 16);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(18, 31)));
    assert_eq!(s.visible_window(), Some(Window::new(20, 29)));
}

#[test]
fn measured_item_shifts_following_offsets() {
    let config = ScrollerConfig::measured(50.0);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..100usize).collect()).unwrap();
    assert_eq!(s.size_model().offset_of(6), 300.0);

    assert_eq!(s.record_measurement(5, 80.0), Ok(30.0));
    assert_eq!(s.size_model().offset_of(5), 250.0);
    assert_eq!(s.size_model().offset_of(6), 330.0);
    assert_eq!(s.total_size(), 5030.0);
    assert!(s.is_measured(5));
    assert!(!s.is_measured(6));
}

#[test]
fn grid_columns_from_container_width() {
    assert_eq!(compute_columns(1000.0, 200.0, 10.0, 1, usize::MAX, None), 4);
    assert_eq!(compute_columns(1000.0, 200.0, 10.0, 1, 3, None), 3);
    assert_eq!(compute_columns(100.0, 200.0, 10.0, 2, 8, None), 2);
    assert_eq!(compute_columns(1000.0, 200.0, 10.0, 1, 8, Some(7)), 7);
    assert_eq!(compute_columns(1000.0, 200.0, 10.0, 1, 8, Some(0)), 1);
    // Unmeasured container.
    assert_eq!(compute_columns(0.0, 200.0, 10.0, 2, 8, None), 2);
}

#[test]
fn grid_layout_stretches_cells_and_rounds_rows() {
    let grid = GridConfig::new(200.0, 200.0).with_gaps(10.0, 10.0);
    let config = ScrollerConfig::grid(grid).with_buffer(0.0);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..10usize).collect()).unwrap();
    s.on_resize(Rect::new(300.0, 1000.0), 0);

    let layout = s.size_model().grid_layout().unwrap();
    assert_eq!(layout.columns, 4);
    // floor((1000 - 3 * 10) / 4)
    assert_eq!(layout.cell_cross_size, 242.0);
    assert_eq!(layout.column_stride, 252.0);
    assert_eq!(layout.row_stride, 210.0);

    // 10 items -> 3 rows.
    assert_eq!(s.total_size(), 630.0);
    assert_eq!(
        s.size_model().position_of(6),
        Position {
            main: 210.0,
            cross: 504.0
        }
    );

    s.flush();
    // Rows 0 and 1 intersect [0, 300).
    assert_eq!(s.window(), Some(Window::new(0, 7)));

    s.on_scroll(300.0, 16);
    s.flush();
    // Row 1 starts at 210, row 2 at 420 and holds the last two cells.
    assert_eq!(s.window(), Some(Window::new(4, 9)));
}

#[test]
fn grid_columns_follow_container_resize() {
    let grid = GridConfig::new(100.0, 100.0).with_column_range(1, 6);
    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::grid(grid)),
        (0..100usize).collect(),
    )
    .unwrap();
    s.on_resize(Rect::new(500.0, 400.0), 0);
    assert_eq!(s.size_model().columns(), 4);
    assert_eq!(s.total_size(), 2500.0);

    s.on_resize(Rect::new(500.0, 2000.0), 1);
    assert_eq!(s.size_model().columns(), 6);
    assert_eq!(s.total_size(), 1700.0);
}

#[test]
fn round_trip_offset_and_index_in_list_modes() {
    let fixed = {
        let mut m: SizeModel<u64> = SizeModel::new(&ScrollerConfig::fixed(50.0).with_gap(3.0));
        m.rebuild((0..200usize).map(|i| (i as u64, None)));
        m
    };
    let mut rng = Lcg::new(7);
    let sizes: Vec<f64> = (0..200)
        .map(|_| rng.gen_range_u64(1, 90) as f64)
        .collect();
    let measured = measured_model(&sizes, 2.0);

    for i in 0..200 {
        assert_eq!(fixed.index_at_offset(fixed.offset_of(i)), Some(i));
        assert_eq!(measured.index_at_offset(measured.offset_of(i)), Some(i));
        assert_eq!(measured.offset_of(i), expected_offset(&sizes, 2.0, i));
    }
}

#[test]
fn round_trip_offset_and_index_in_grid_mode() {
    let grid = GridConfig::new(40.0, 100.0).with_gaps(5.0, 0.0);
    let mut m: SizeModel<u64> = SizeModel::new(&ScrollerConfig::grid(grid));
    m.rebuild((0..103usize).map(|i| (i as u64, None)));
    m.set_container_cross_size(300.0);
    assert_eq!(m.columns(), 3);

    for i in 0..103 {
        let row_start = i - i % 3;
        assert_eq!(m.index_at_offset(m.offset_of(i)), Some(row_start));
        assert_eq!(m.offset_of(i), (i / 3) as f64 * 45.0);
    }
    assert_eq!(m.row_bounds(101), (99, 101));
    assert_eq!(m.row_bounds(102), (102, 102));
}

#[test]
fn round_trip_holds_for_fractional_sizes() {
    let mut rng = Lcg::new(2024);
    for round in 0..20 {
        let gap = if round % 2 == 0 { 0.0 } else { 0.7 };
        let sizes: Vec<f64> = (0..500)
            .map(|_| rng.gen_range_u64(3, 300) as f64 / 3.0)
            .collect();
        let m = measured_model(&sizes, gap);
        for i in 0..sizes.len() {
            assert_eq!(m.index_at_offset(m.offset_of(i)), Some(i), "gap {gap}, item {i}");
        }
    }

    // Same property after incremental updates instead of a rebuild.
    let mut m = measured_model(&[50.0; 500], 0.0);
    for i in 0..500usize {
        let size = 50.0 + i as f64 / 7.0 + 0.6;
        assert!(m.record_measurement(i, i as u64, size).is_ok());
    }
    for i in 0..500 {
        assert_eq!(m.index_at_offset(m.offset_of(i)), Some(i), "measured item {i}");
        assert!(m.offset_of(i + 1) > m.offset_of(i));
    }

    let mut fixed: SizeModel<u64> = SizeModel::new(&ScrollerConfig::fixed(0.1));
    fixed.rebuild((0..1000usize).map(|i| (i as u64, None)));
    for i in 0..1000 {
        assert_eq!(fixed.index_at_offset(fixed.offset_of(i)), Some(i), "fixed item {i}");
    }
}

#[test]
fn window_edge_is_exact_for_fractional_sizes() {
    let mut rng = Lcg::new(31);
    let sizes: Vec<f64> = (0..300)
        .map(|_| rng.gen_range_u64(30, 400) as f64 / 3.0 + 0.7)
        .collect();
    let m = measured_model(&sizes, 0.7);

    for k in 1..sizes.len() {
        let edge = m.offset_of(k);
        // An item starting exactly at the far edge is outside the window.
        let w = compute_window(0.0, edge, 0.0, &m).unwrap();
        assert_eq!(w.end_index, k - 1, "edge at item {k}");
        // Anything past its start brings it in.
        let w = compute_window(0.0, edge + 0.001, 0.0, &m).unwrap();
        assert_eq!(w.end_index, k, "just past item {k}");
    }

    for _ in 0..500 {
        let offset = rng.gen_range_u64(0, m.total_size() as u64) as f64 + 0.67;
        let viewport = rng.gen_range_u64(1, 600) as f64 / 3.0;
        let w = compute_visible_window(offset, viewport, &m).unwrap();
        for i in 0..sizes.len() {
            let start = m.offset_of(i);
            if start < offset + viewport && start + m.size_of(i) > offset {
                assert!(w.contains(i), "item {i} missing from {w:?} at {offset}+{viewport}");
            }
        }
    }
}

#[test]
fn empty_list_and_unmeasured_viewport_render_nothing() {
    let mut s = fixed_scroller(0, 50.0, 500.0, 100.0);
    assert_eq!(s.total_size(), 0.0);
    assert_eq!(s.size_model().offset_of(3), 0.0);
    assert_eq!(s.size_model().index_at_offset(10.0), None);
    s.flush();
    assert_eq!(s.window(), None);

    let mut s = fixed_scroller(100, 50.0, 0.0, 100.0);
    assert!(s.flush().is_empty());
    assert_eq!(s.window(), None);
    assert!(s.pool().is_empty());
}

#[test]
fn gap_is_part_of_every_stride() {
    let m = measured_model(&[10.0, 20.0, 30.0], 4.0);
    assert_eq!(m.offset_of(1), 14.0);
    assert_eq!(m.offset_of(2), 38.0);
    assert_eq!(m.total_size(), 72.0);
    // Offsets inside a gap map to the item before it.
    assert_eq!(m.index_at_offset(12.0), Some(0));
    assert_eq!(m.index_at_offset(14.0), Some(1));
    assert_eq!(m.index_at_offset(1000.0), Some(2));
}

#[test]
fn window_is_monotonic_in_scroll_offset() {
    let mut rng = Lcg::new(42);
    let sizes: Vec<f64> = (0..400)
        .map(|_| rng.gen_range_u64(5, 80) as f64)
        .collect();
    let m = measured_model(&sizes, 1.0);

    let mut prev: Option<Window> = None;
    let mut offset = 0.0;
    while offset < m.total_size() + 100.0 {
        let w = compute_window(offset, 300.0, 60.0, &m).unwrap();
        if let Some(p) = prev {
            assert!(w.start_index >= p.start_index, "start went back at {offset}");
            assert!(w.end_index >= p.end_index, "end went back at {offset}");
        }
        prev = Some(w);
        offset += rng.gen_range_u64(1, 40) as f64;
    }
}

#[test]
fn window_covers_every_intersecting_item() {
    let mut rng = Lcg::new(99);
    for _ in 0..20 {
        let count = rng.gen_range_usize(1, 120);
        let gap = rng.gen_range_u64(0, 4) as f64;
        let sizes: Vec<f64> = (0..count)
            .map(|_| rng.gen_range_u64(1, 60) as f64)
            .collect();
        let m = measured_model(&sizes, gap);
        let total = m.total_size() as u64;

        for _ in 0..50 {
            let offset = rng.gen_range_u64(0, total + 1) as f64;
            let viewport = rng.gen_range_u64(1, 400) as f64;
            let w = compute_visible_window(offset, viewport, &m).unwrap();
            for i in 0..count {
                let start = expected_offset(&sizes, gap, i);
                let end = start + sizes[i];
                if start < offset + viewport && end > offset {
                    assert!(
                        w.contains(i),
                        "item {i} [{start}, {end}) missing from {w:?} at {offset}+{viewport}"
                    );
                }
            }
        }
    }
}

#[test]
fn slots_stay_with_their_keys_while_scrolling() {
    let mut s = fixed_scroller(1000, 20.0, 200.0, 40.0);
    s.flush();
    let mut offset = 0.0;
    for step in 1..200u64 {
        let before: Vec<(u64, SlotId)> = s
            .window()
            .unwrap()
            .indexes()
            .map(|i| (i as u64, slot_of(&s, i as u64).unwrap()))
            .collect();
        offset += 7.0;
        s.on_scroll(offset, step);
        s.flush();
        let after = s.window().unwrap();
        for (key, slot) in before {
            if after.contains(key as usize) {
                assert_eq!(slot_of(&s, key), Some(slot));
            }
        }
    }
}

#[test]
fn pool_size_does_not_depend_on_item_count() {
    let mut sizes = Vec::new();
    for count in [1_000, 10_000, 1_000_000] {
        let mut s = fixed_scroller(count, 50.0, 500.0, 100.0);
        let mut offset = 0.0;
        let mut now = 0;
        while offset < 20_000.0 {
            s.on_scroll(offset, now);
            s.flush();
            offset += 37.0;
            now += 16;
        }
        assert!(s.pool().len() <= 15);
        sizes.push(s.pool().len());
    }
    assert_eq!(sizes[0], sizes[1]);
    assert_eq!(sizes[1], sizes[2]);
}

#[test]
fn second_pass_without_changes_emits_nothing() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    assert_eq!(s.flush().mutations.len(), 12);
    assert!(s.flush().is_empty());

    let config = ScrollerConfig::measured(10.0);
    let mut pool: ViewPool<u64> = ViewPool::new(None);
    let mut sizes = SizeModel::new(&config);
    sizes.rebuild((0..50usize).map(|i| (i as u64, None)));
    let mut r = Reconciler::new();
    let w = Some(Window::new(3, 9));
    let first = r.reconcile(&mut pool, w, &sizes, |i| (i as u64, None));
    assert_eq!(first.mutations.len(), 7);
    let second = r.reconcile(&mut pool, w, &sizes, |i| (i as u64, None));
    assert!(second.is_empty());
}

#[test]
fn new_keys_are_assigned_in_index_order() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.flush();
    s.on_scroll(300.0, 16);
    let pass = s.flush();

    // [0, 11] -> [4, 17]: four released slots are rebound, two are allocated.
    let indexes: Vec<usize> = pass
        .mutations
        .iter()
        .map(|m| match m {
            Mutation::Assign { index, .. } => *index,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(indexes, (12..18).collect::<Vec<_>>());
    assert_eq!(s.pool().len(), 14);
    assert_eq!(s.pool().idle_len(), 0);
}

#[test]
fn shrinking_viewport_releases_slots_without_destroying_them() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.flush();
    let kept: Vec<SlotId> = (0..7).map(|k| slot_of(&s, k).unwrap()).collect();

    s.on_resize(Rect::new(250.0, 300.0), 16);
    let pass = s.flush().clone();
    assert_eq!(s.window(), Some(Window::new(0, 6)));
    assert_eq!(pass.mutations.len(), 5);
    assert!(
        pass.mutations
            .iter()
            .all(|m| matches!(m, Mutation::Release { .. }))
    );
    let released: Vec<u64> = pass
        .mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::Release { key, .. } => Some(*key),
            _ => None,
        })
        .collect();
    assert_eq!(released, [7, 8, 9, 10, 11]);
    for (k, slot) in kept.into_iter().enumerate() {
        assert_eq!(slot_of(&s, k as u64), Some(slot));
    }
    assert_eq!(s.pool().len(), 12);
    assert_eq!(s.pool().idle_len(), 5);
}

#[test]
fn insert_at_front_reuses_released_slot_and_repositions_the_rest() {
    let config = ScrollerConfig::fixed(50.0).with_buffer(0.0);
    let mut s = keyed_scroller((0..20).collect(), config);
    s.on_resize(Rect::new(500.0, 300.0), 0);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(0, 9)));
    let slot_of_nine = slot_of(&s, 9).unwrap();
    let slot_of_zero = slot_of(&s, 0).unwrap();

    s.update_items(|items| items.insert(0, 1000));
    let pass = s.flush();
    assert_eq!(pass.mutations.len(), 10);
    assert_eq!(
        pass.mutations[0],
        Mutation::Assign {
            slot: slot_of_nine,
            index: 0,
            key: 1000,
            item_type: None,
            position: Position::default(),
            size: 50.0,
        }
    );
    for (n, m) in pass.mutations[1..].iter().enumerate() {
        match m {
            Mutation::Reposition {
                index, position, ..
            } => {
                assert_eq!(*index, n + 1);
                assert_eq!(position.main, (n + 1) as f64 * 50.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(slot_of(&s, 0), Some(slot_of_zero));
}

#[test]
fn duplicate_keys_keep_the_later_item() {
    let config = ScrollerConfig::fixed(10.0).with_buffer(0.0);
    let mut s = keyed_scroller(alloc::vec![1, 2, 2, 3], config);
    s.on_resize(Rect::new(100.0, 100.0), 0);
    let pass = s.flush();

    assert_eq!(
        pass.conflicts,
        [IdentityConflict {
            first_index: 1,
            index: 2
        }]
    );
    let assigned: Vec<usize> = pass
        .mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::Assign { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(assigned, [0, 2, 3]);
    let slot = s.pool().slot(slot_of(&s, 2).unwrap()).unwrap();
    assert_eq!(slot.index(), Some(2));
}

#[test]
fn capacity_overflow_is_reported_not_dropped_silently() {
    let config = ScrollerConfig::fixed(50.0)
        .with_buffer(0.0)
        .with_pool_capacity(Some(5));
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..100usize).collect()).unwrap();
    s.on_resize(Rect::new(500.0, 300.0), 0);
    let pass = s.flush();
    assert_eq!(pass.overflow, [5, 6, 7, 8, 9]);
    assert_eq!(pass.mutations.len(), 5);
    assert_eq!(s.pool().len(), 5);
}

#[test]
fn pool_prefers_idle_slot_of_matching_type() {
    let mut pool: ViewPool<u64> = ViewPool::new(None);
    let a = pool.acquire(1, Some(1)).unwrap();
    let b = pool.acquire(2, Some(2)).unwrap();
    assert_eq!(pool.acquire(1, Some(1)), Ok(a));

    assert_eq!(pool.release(a), Some(1));
    assert_eq!(pool.release(b), Some(2));
    assert_eq!(pool.release(b), None);
    assert_eq!(pool.find_by_key(&1), None);

    assert_eq!(pool.acquire(3, Some(2)), Ok(b));
    // No idle slot of type `None`: the oldest idle slot is retyped.
    assert_eq!(pool.acquire(4, None), Ok(a));
    assert_eq!(pool.slot(a).unwrap().item_type(), None);
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.bound_len(), 2);
}

#[test]
fn pool_capacity_and_sweep() {
    let mut pool: ViewPool<u64> = ViewPool::new(Some(2));
    let a = pool.acquire(10, None).unwrap();
    let b = pool.acquire(20, None).unwrap();
    assert_eq!(
        pool.acquire(30, None),
        Err(PoolError::CapacityExceeded { capacity: 2 })
    );

    pool.begin_pass();
    pool.mark_used(a);
    assert_eq!(pool.sweep_unused(), [(b, 20)]);
    assert!(pool.slot(a).unwrap().is_bound());
    assert!(!pool.slot(b).unwrap().is_bound());
    assert_eq!(pool.acquire(30, None), Ok(b));
}

#[test]
fn item_types_flow_into_assignments() {
    let config = ScrollerConfig::fixed(10.0).with_buffer(0.0);
    let options = ScrollerOptions::new(config).with_item_type(|item: &usize| Some(*item as u64 % 2));
    let mut s = RecycleScroller::new(options, (0..10usize).collect()).unwrap();
    s.on_resize(Rect::new(40.0, 10.0), 0);
    let pass = s.flush();
    let types: Vec<Option<ItemType>> = pass
        .mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::Assign { item_type, .. } => Some(*item_type),
            _ => None,
        })
        .collect();
    assert_eq!(types, [Some(0), Some(1), Some(0), Some(1)]);

    // One row down: item 4 (type 0) takes the slot item 0 (type 0) released.
    let slot_of_zero = slot_of(&s, 0).unwrap();
    s.on_scroll(10.0, 16);
    s.flush();
    assert_eq!(slot_of(&s, 4), Some(slot_of_zero));
}

#[test]
fn frames_coalesce_and_stale_tokens_are_ignored() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    let first = s.frame_request().unwrap();
    s.on_scroll(100.0, 1);
    s.on_scroll(200.0, 2);
    let latest = s.frame_request().unwrap();
    assert_ne!(first, latest);

    assert!(s.on_frame(first, 16).is_none());
    assert_eq!(s.window(), None);
    assert!(s.on_frame(latest, 16).is_some());
    assert_eq!(s.window(), Some(Window::new(2, 15)));
    assert_eq!(s.frame_request(), None);
    assert!(s.tick(32).is_none());

    // Same offset reached through many events produces the same assignment.
    let mut t = fixed_scroller(100, 50.0, 500.0, 100.0);
    t.on_scroll(200.0, 1);
    t.tick(16);
    for k in 2..10 {
        s.on_scroll(200.0 + k as f64, k);
        s.on_scroll(200.0, k);
    }
    s.tick(48);
    assert_eq!(s.window(), t.window());
}

#[test]
fn scroll_phase_goes_idle_after_quiet_period() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let config = ScrollerConfig::fixed(50.0).with_buffer(100.0);
    let options = ScrollerOptions::new(config).with_on_event(move |e| sink.lock().unwrap().push(e));
    let mut s = RecycleScroller::new(options, (0..100usize).collect()).unwrap();
    assert_eq!(s.phase(), ScrollPhase::Idle);

    s.on_resize(Rect::new(500.0, 300.0), 0);
    assert!(s.is_scrolling());
    s.flush();
    s.update_scrolling(149);
    assert!(s.is_scrolling());
    s.update_scrolling(150);
    assert_eq!(s.phase(), ScrollPhase::Idle);

    s.on_scroll(1000.0, 200);
    assert_eq!(s.scroll_direction(), Some(ScrollDirection::Forward));
    s.tick(216);
    assert!(s.is_scrolling());
    s.on_scroll(900.0, 300);
    assert_eq!(s.scroll_direction(), Some(ScrollDirection::Backward));
    s.tick(460);
    assert_eq!(s.phase(), ScrollPhase::Idle);
    assert_eq!(s.scroll_direction(), None);

    let events = events.lock().unwrap();
    assert_eq!(
        events.as_slice(),
        [
            ScrollerEvent::Resize {
                viewport: Rect::new(500.0, 300.0)
            },
            ScrollerEvent::ScrollStart,
            ScrollerEvent::Update {
                start_index: 0,
                end_index: 11,
                visible_start_index: 0,
                visible_end_index: 9,
            },
            ScrollerEvent::ScrollEnd,
            ScrollerEvent::ScrollStart,
            ScrollerEvent::Update {
                start_index: 18,
                end_index: 31,
                visible_start_index: 20,
                visible_end_index: 29,
            },
            ScrollerEvent::Update {
                start_index: 16,
                end_index: 29,
                visible_start_index: 18,
                visible_end_index: 27,
            },
            ScrollerEvent::ScrollEnd,
        ]
    );
}

#[test]
fn scroll_to_index_alignment() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    assert_eq!(s.max_scroll_offset(), 4500.0);
    assert_eq!(s.scroll_to_index_offset(10, Align::Start), 500.0);
    assert_eq!(s.scroll_to_index_offset(10, Align::End), 50.0);
    assert_eq!(s.scroll_to_index_offset(10, Align::Center), 275.0);
    assert_eq!(s.scroll_to_index_offset(10, Align::Auto), 50.0);
    assert_eq!(s.scroll_to_index_offset(3, Align::Auto), 0.0);
    assert_eq!(s.scroll_to_index_offset(0, Align::End), 0.0);
    assert_eq!(s.scroll_to_index_offset(99, Align::Start), 4500.0);
    assert_eq!(s.scroll_to_index_offset(5000, Align::Start), 4500.0);

    assert_eq!(s.scroll_to_index(99, Align::Start), 4500.0);
    assert!(s.frame_request().is_some());
    s.flush();
    assert_eq!(s.window(), Some(Window::new(88, 99)));

    // Already visible: `Auto` keeps the offset.
    assert_eq!(s.scroll_to_index_offset(95, Align::Auto), 4500.0);
    // Above the viewport: `Auto` aligns to start.
    assert_eq!(s.scroll_to_index_offset(40, Align::Auto), 2000.0);

    assert_eq!(s.scroll_to_offset(-20.0), 0.0);
    assert_eq!(s.scroll_to_offset(1e9), 4500.0);
    assert_eq!(s.scroll_to_offset(f64::NAN), 0.0);
}

#[test]
fn negative_scroll_offsets_are_clamped() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.on_scroll(-300.0, 1);
    assert_eq!(s.scroll_offset(), 0.0);
    s.on_scroll(f64::INFINITY, 2);
    assert_eq!(s.scroll_offset(), 0.0);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(0, 11)));
}

#[test]
fn invalid_configuration_stops_initialization() {
    assert_eq!(
        ScrollerConfig::default().with_buffer(-1.0).validate(),
        Err(ConfigError::Negative {
            field: "buffer",
            value: -1.0
        })
    );
    assert!(matches!(
        ScrollerConfig::default().with_min_item_size(f64::NAN).validate(),
        Err(ConfigError::NotFinite {
            field: "min_item_size",
            ..
        })
    ));
    assert_eq!(
        ScrollerConfig::fixed(0.0).validate(),
        Err(ConfigError::NonPositiveFixedSize(0.0))
    );
    assert_eq!(
        ScrollerConfig::grid(GridConfig::new(10.0, 10.0).with_column_range(0, 3)).validate(),
        Err(ConfigError::ZeroMinColumns)
    );
    assert_eq!(
        ScrollerConfig::grid(GridConfig::new(10.0, 10.0).with_column_range(4, 2)).validate(),
        Err(ConfigError::ColumnRange { min: 4, max: 2 })
    );
    assert_eq!(
        ScrollerConfig::grid(GridConfig::new(-10.0, 10.0)).validate(),
        Err(ConfigError::Negative {
            field: "grid.cell_main_size",
            value: -10.0
        })
    );
    assert_eq!(
        ScrollerConfig::default()
            .with_pool_capacity(Some(0))
            .validate(),
        Err(ConfigError::ZeroPoolCapacity)
    );
    assert_eq!(ScrollerConfig::default().validate(), Ok(()));

    let options = ScrollerOptions::new(ScrollerConfig::default().with_gap(f64::INFINITY));
    assert!(RecycleScroller::<u8>::new(options, Vec::new()).is_err());

    let mut s = fixed_scroller(10, 50.0, 500.0, 100.0);
    let bad = ScrollerOptions::new(ScrollerConfig::default().with_buffer(-5.0));
    assert!(s.set_options(bad).is_err());
    assert_eq!(s.options().config.buffer, 100.0);
}

#[test]
fn invalid_measurements_are_rejected() {
    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::measured(20.0)),
        (0..10usize).collect(),
    )
    .unwrap();
    assert_eq!(s.record_measurement(1, -1.0), Err(SizeError::Negative(-1.0)));
    assert!(matches!(
        s.record_measurement(1, f64::NAN),
        Err(SizeError::NotFinite(_))
    ));
    assert_eq!(s.total_size(), 200.0);

    // Below the minimum: clamped up, so nothing changes.
    assert_eq!(s.record_measurement(1, 3.0), Ok(0.0));
    // Out of range.
    assert_eq!(s.record_measurement(50, 30.0), Ok(0.0));
    assert_eq!(s.total_size(), 200.0);
}

#[test]
fn measurements_within_epsilon_are_ignored() {
    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::measured(50.0)),
        (0..10usize).collect(),
    )
    .unwrap();
    s.flush();
    assert_eq!(s.record_measurement(2, 50.4), Ok(0.0));
    assert!(s.frame_request().is_none());
    assert!(s.is_measured(2));
    assert_eq!(s.total_size(), 500.0);

    assert_eq!(s.record_measurement(2, 51.0), Ok(1.0));
    assert!(s.frame_request().is_some());
    assert_eq!(s.total_size(), 501.0);
}

#[test]
fn measurements_are_ignored_outside_measured_mode() {
    let mut s = fixed_scroller(10, 50.0, 500.0, 100.0);
    assert_eq!(s.record_measurement(2, 80.0), Ok(0.0));
    assert_eq!(s.total_size(), 500.0);
    assert_eq!(s.measurement_cache_len(), 0);
}

#[test]
fn measurement_above_offset_adjusts_scroll() {
    let config = ScrollerConfig::measured(50.0);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..100usize).collect()).unwrap();
    s.on_resize(Rect::new(500.0, 300.0), 0);
    s.on_scroll(1000.0, 1);
    s.flush();

    assert_eq!(s.record_measurement(5, 80.0), Ok(30.0));
    assert_eq!(s.scroll_offset(), 1030.0);
    // Below the offset: no adjustment.
    assert_eq!(s.record_measurement(40, 60.0), Ok(10.0));
    assert_eq!(s.scroll_offset(), 1030.0);

    let config = ScrollerConfig::measured(50.0).with_adjust_scroll_on_resize(false);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..100usize).collect()).unwrap();
    s.on_resize(Rect::new(500.0, 300.0), 0);
    s.on_scroll(1000.0, 1);
    s.record_measurement(5, 80.0).unwrap();
    assert_eq!(s.scroll_offset(), 1000.0);
}

#[test]
fn measure_slot_resolves_the_bound_item() {
    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::measured(10.0).with_buffer(0.0)),
        (0..100usize).collect(),
    )
    .unwrap();
    s.on_resize(Rect::new(100.0, 50.0), 0);
    s.flush();
    let slot = slot_of(&s, 3).unwrap();
    assert_eq!(s.measure_slot(slot, 25.0), Ok(15.0));
    assert_eq!(s.size_model().size_of(3), 25.0);

    s.flush();
    let pos = s.pool().slot(slot_of(&s, 4).unwrap()).unwrap().position().unwrap();
    assert_eq!(pos.main, 55.0);
    assert_eq!(s.measure_slot(SlotId(999), 25.0), Ok(0.0));
}

#[test]
fn measured_sizes_follow_keys_and_are_pruned() {
    let config = ScrollerConfig::measured(10.0);
    let mut s = keyed_scroller(alloc::vec![10, 20, 30], config);
    s.record_measurement(0, 40.0).unwrap();
    assert_eq!(s.measurement_cache_len(), 1);

    s.set_items(alloc::vec![30, 10, 20]);
    assert_eq!(s.size_model().size_of(0), 10.0);
    assert_eq!(s.size_model().size_of(1), 40.0);
    assert!(s.is_measured(1));
    assert_eq!(s.total_size(), 60.0);

    s.set_items(alloc::vec![20, 30]);
    assert_eq!(s.measurement_cache_len(), 0);
    assert_eq!(s.total_size(), 20.0);
}

#[test]
fn size_hints_seed_unmeasured_items() {
    let config = ScrollerConfig::measured(10.0);
    let options = ScrollerOptions::new(config).with_size_hint(|item: &usize| match item % 3 {
        0 => Some(30.0),
        1 => Some(2.0),
        _ => None,
    });
    let s = RecycleScroller::new(options, (0..6usize).collect()).unwrap();
    // Hints below the minimum fall back to it.
    assert_eq!(s.total_size(), 2.0 * (30.0 + 10.0 + 10.0));
    assert!(!s.is_measured(0));
}

#[test]
fn shrinking_the_list_clamps_the_offset() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.on_scroll(4000.0, 1);
    s.set_items((0..20).collect());
    assert_eq!(s.scroll_offset(), 500.0);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(8, 19)));
    check_bindings(&s);
}

#[test]
fn prerender_without_surface() {
    let config = ScrollerConfig::measured(20.0).with_prerender(5);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..100usize).collect()).unwrap();
    s.set_surface_available(false);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(0, 4)));
    assert_eq!(s.record_measurement(0, 80.0), Ok(0.0));
    assert_eq!(s.total_size(), 2000.0);

    s.set_surface_available(true);
    s.flush();
    assert_eq!(s.window(), None);
    s.on_resize(Rect::new(100.0, 100.0), 0);
    s.flush();
    assert_eq!(s.window(), Some(Window::new(0, 14)));

    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::measured(20.0)),
        (0..100usize).collect(),
    )
    .unwrap();
    s.set_surface_available(false);
    s.on_resize(Rect::new(100.0, 100.0), 0);
    s.flush();
    assert_eq!(s.window(), None);
}

#[test]
fn rendered_views_follow_index_order() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.on_scroll(1000.0, 1);
    s.flush();

    let mut views = Vec::new();
    s.collect_views(&mut views);
    assert_eq!(views.len(), 14);
    for (n, v) in views.iter().enumerate() {
        assert_eq!(v.index, 18 + n);
        assert_eq!(*v.item, 18 + n);
        assert_eq!(*v.key, (18 + n) as u64);
        assert_eq!(v.position.main, (18 + n) as f64 * 50.0);
        assert_eq!(v.size, 50.0);
        assert_eq!(s.pool().find_by_key(v.key), Some(v.slot));
    }
    assert_eq!(views[0].position.to_xy(Direction::Vertical), (0.0, 900.0));
    assert_eq!(views[0].position.to_xy(Direction::Horizontal), (900.0, 0.0));
}

#[test]
fn frame_state_round_trips() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.on_scroll(1000.0, 1);
    let state = s.frame_state();
    assert_eq!(state.scroll.offset, 1000.0);
    assert_eq!(state.scroll.phase, ScrollPhase::Scrolling);
    assert_eq!(state.viewport.rect, Rect::new(500.0, 300.0));

    let mut t = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::fixed(50.0).with_buffer(100.0)),
        (0..100usize).collect(),
    )
    .unwrap();
    t.restore_frame_state(state, 500);
    assert_eq!(t.scroll_offset(), 1000.0);
    assert!(t.is_scrolling());
    t.flush();
    assert_eq!(t.window(), Some(Window::new(18, 31)));
    t.update_scrolling(650);
    assert!(!t.is_scrolling());
}

#[test]
fn measurement_cache_export_import() {
    let config = ScrollerConfig::measured(10.0);
    let mut a = keyed_scroller((0..50).collect(), config);
    a.record_measurement(3, 40.0).unwrap();
    a.record_measurement(7, 25.0).unwrap();
    let mut cache = a.export_measurement_cache();
    cache.sort_by_key(|(k, _)| *k);
    assert_eq!(cache, [(3, 40.0), (7, 25.0)]);

    let mut b = keyed_scroller((0..50).collect(), config);
    b.import_measurement_cache(cache);
    assert_eq!(b.total_size(), a.total_size());
    assert_eq!(b.size_model().size_of(7), 25.0);

    b.reset_measurements();
    assert_eq!(b.total_size(), 500.0);
    assert_eq!(b.measurement_cache_len(), 0);
}

#[test]
fn set_options_keeps_measurements_and_slots() {
    let mut s = RecycleScroller::new(
        ScrollerOptions::new(ScrollerConfig::measured(10.0).with_buffer(0.0)),
        (0..100usize).collect(),
    )
    .unwrap();
    s.on_resize(Rect::new(100.0, 50.0), 0);
    s.record_measurement(2, 30.0).unwrap();
    s.flush();
    let slot = slot_of(&s, 1).unwrap();

    s.set_options(ScrollerOptions::new(
        ScrollerConfig::measured(10.0).with_buffer(20.0),
    ))
    .unwrap();
    assert_eq!(s.size_model().size_of(2), 30.0);
    s.flush();
    assert_eq!(slot_of(&s, 1), Some(slot));
    check_bindings(&s);
}

#[test]
fn teardown_drops_every_slot() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.flush();
    assert_eq!(s.pool().len(), 12);
    s.teardown();
    assert!(s.pool().is_empty());
    assert_eq!(s.window(), None);
    assert_eq!(s.phase(), ScrollPhase::Idle);
    s.flush();
    assert_eq!(s.pool().len(), 12);
}

#[test]
fn randomized_passes_keep_bindings_consistent() {
    let mut rng = Lcg::new(0x5eed);
    let count = 500;
    let gap = 2.0;
    let config = ScrollerConfig::measured(10.0).with_buffer(50.0).with_gap(gap);
    let mut s = RecycleScroller::new(ScrollerOptions::new(config), (0..count).collect()).unwrap();
    s.on_resize(Rect::new(400.0, 300.0), 0);
    let mut sizes = alloc::vec![10.0f64; count];
    let mut high_water = 0;

    for step in 0..400u64 {
        match rng.gen_range_u64(0, 3) {
            0 => {
                let offset = rng.gen_range_u64(0, s.total_size() as u64 + 1) as f64;
                s.on_scroll(offset, step);
            }
            1 => {
                let i = rng.gen_range_usize(0, count);
                let size = rng.gen_range_u64(1, 120) as f64;
                s.record_measurement(i, size).unwrap();
                sizes[i] = size.max(10.0);
            }
            _ => {}
        }
        s.flush();
        check_bindings(&s);

        let i = rng.gen_range_usize(0, count + 1);
        assert_eq!(s.size_model().offset_of(i), expected_offset(&sizes, gap, i));
        if let Some(w) = s.window() {
            high_water = high_water.max(w.len());
        }
        assert_eq!(s.pool().len(), high_water);
    }
}

#[test]
fn debug_output_reports_pool_size() {
    let mut s = fixed_scroller(100, 50.0, 500.0, 100.0);
    s.flush();
    let text = std::format!("{s:?}");
    assert!(text.contains("RecycleScroller"));
    assert!(text.contains("slots: 12"), "{text}");

    let pool: ViewPool<u64> = ViewPool::new(Some(4));
    assert_eq!(pool.len(), 0);
    assert_eq!(pool.capacity(), Some(4));
    assert!(std::format!("{pool:?}").contains("capacity: Some(4)"));
}
