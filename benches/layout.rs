//! Benchmarks for the layout pass and the pointer update path
//!
//! Run with: cargo bench layout

use std::time::{Duration, Instant};

use dockline::autohide::StaticWindowOracle;
use dockline::config::DockConfig;
use dockline::cursor::NullPointerSource;
use dockline::geometry::{Point, Rect};
use dockline::items::{DockItem, ItemId, ProviderId};
use dockline::layout::zoom::{magnification, offset, zoom_size};
use dockline::layout::{compute, DockEdge, ItemAlignment, ItemEffects, LayoutItem, LayoutParams};
use dockline::messages::{AutohideMsg, Msg};
use dockline::provider::{BasicBehavior, ItemProvider};
use dockline::update::{run_due_timers, update_at};
use dockline::DockModel;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const SCREEN: Rect = Rect::new(0.0, 0.0, 2560.0, 1440.0);

fn params(cursor: Option<Point>, zoom_in_percent: f32) -> LayoutParams {
    LayoutParams {
        screen: SCREEN,
        edge: DockEdge::Bottom,
        icon_size: 48.0,
        zoom_percent: 2.0,
        zoom_in_percent,
        panel_mode: false,
        alignment: ItemAlignment::Center,
        offset: 0,
        hide_progress: 0.0,
        hidden: false,
        cursor,
        external_gap: false,
    }
}

fn items(count: usize) -> Vec<LayoutItem> {
    (0..count)
        .map(|i| LayoutItem {
            id: ItemId(i as u64 + 1),
            square: i % 8 != 7,
            zoomable: true,
            separator: i % 8 == 7,
            slide: 0.0,
            effects: ItemEffects::default(),
        })
        .collect()
}

fn model_with(count: usize, now: Instant) -> DockModel {
    let mut provider = ItemProvider::new(ProviderId(0), "launchers", BasicBehavior::new(true, true));
    for i in 0..count {
        provider.add_item(DockItem::launcher(i as u64 + 1, format!("app-{}", i)), now);
    }
    let mut model = DockModel::new(
        DockConfig::default(),
        SCREEN,
        Box::new(StaticWindowOracle::new()),
        Box::new(NullPointerSource),
        now,
    )
    .with_provider(provider);
    update_at(&mut model, Msg::Autohide(AutohideMsg::StartupComplete), now);
    model
}

// ============================================================================
// Zoom curve
// ============================================================================

#[divan::bench]
fn zoom_curve_sweep(bencher: divan::Bencher) {
    let size = zoom_size(48.0, 2.0);
    bencher.bench(|| {
        let mut total = 0.0_f32;
        for step in 0..512 {
            let off = offset(divan::black_box(step as f32), size, 48.0, 2.0, false);
            total += magnification(off.percent, 2.0);
        }
        total
    });
}

// ============================================================================
// Layout pass
// ============================================================================

#[divan::bench(args = [8, 24, 64, 200])]
fn layout_at_rest(bencher: divan::Bencher, count: usize) {
    let items = items(count);
    let p = params(None, 1.0);
    bencher.bench(|| compute(divan::black_box(&p), divan::black_box(&items)));
}

#[divan::bench(args = [8, 24, 64, 200])]
fn layout_zoomed(bencher: divan::Bencher, count: usize) {
    let items = items(count);
    let p = params(Some(Point::new(1280.0, 1420.0)), 2.0);
    bencher.bench(|| compute(divan::black_box(&p), divan::black_box(&items)));
}

#[divan::bench(args = [24, 64])]
fn layout_pointer_sweep(bencher: divan::Bencher, count: usize) {
    let items = items(count);
    bencher.bench(|| {
        let mut hovered = 0;
        for x in (0..2560).step_by(40) {
            let p = params(Some(Point::new(x as f32, 1420.0)), 2.0);
            if compute(&p, &items).hovered.is_some() {
                hovered += 1;
            }
        }
        hovered
    });
}

// ============================================================================
// Model update path
// ============================================================================

#[divan::bench(args = [8, 64])]
fn pointer_move_update(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| {
            let now = Instant::now();
            (model_with(count, now), now)
        })
        .bench_local_values(|(mut model, now)| {
            for step in 0..32 {
                let at = now + Duration::from_millis(step * 8);
                let x = 1100.0 + step as f32 * 10.0;
                update_at(&mut model, Msg::pointer(x, 1420.0), at);
            }
            model
        });
}

#[divan::bench(args = [8, 64])]
fn render_frames_until_settled(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| {
            let now = Instant::now();
            let mut model = model_with(count, now);
            update_at(&mut model, Msg::pointer(1280.0, 1420.0), now);
            model
        })
        .bench_local_values(|mut model| {
            let mut frames = 0;
            while let Some(deadline) = model.next_deadline() {
                if !model.render_scheduled() || frames > 200 {
                    break;
                }
                run_due_timers(&mut model, deadline);
                frames += 1;
            }
            frames
        });
}
