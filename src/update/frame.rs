//! Frame pass: layout, hover, autohide and the render tick

use std::time::Instant;

use crate::autohide;
use crate::commands::Cmd;
use crate::cursor::ResolutionOwner;
use crate::layout;
use crate::messages::TimerKind;
use crate::model::{DockModel, FrameState, ItemDraw, FRAME_INTERVAL};

/// Recompute the frame: layout → hover → autohide
///
/// Returns true if the hovered item or the hidden state changed.
pub fn layout_pass(model: &mut DockModel, now: Instant) -> bool {
    let params = model.layout_params(now);
    let items = model.layout_items(now);
    let result = layout::compute(&params, &items);

    let cursor = model.cursor_position();
    let pointer_over = cursor.is_some_and(|p| autohide::pointer_hovers(&result.footprint, p, model.oracle.as_ref()));
    let dock_hovered = pointer_over || model.drag.is_internal();

    let was_hidden = model.autohide.hidden();
    let was_hovered = model.autohide.dock_hovered();
    model.autohide.set_dock_hovered(dock_hovered, &mut model.scheduler, now);
    let hidden = model.autohide.hidden();
    model.hide_ramp.set(hidden, now);
    model.zoom_ramp.set(dock_hovered && !hidden, now);

    if dock_hovered != was_hovered {
        let tracker = model.cursors.tracker(model.display, now);
        if dock_hovered {
            tracker.request_high_resolution(ResolutionOwner::Hover, &mut model.scheduler, now);
        } else {
            tracker.cancel_high_resolution(ResolutionOwner::Hover, &mut model.scheduler, now);
        }
    }

    // Swap the public hover only now that the geometry is settled
    let hovered = if hidden { None } else { result.hovered };
    let previous = std::mem::replace(&mut model.hovered, hovered);
    if previous != hovered {
        tracing::debug!(?previous, ?hovered, "hovered item changed");
        model.drag.hovered_changed(hovered, &mut model.providers, now);
    }

    model.removals.retain(|r| r.is_alive(now));
    model.frame = FrameState {
        items: result
            .values
            .into_iter()
            .map(|(id, value)| ItemDraw { id, value })
            .collect(),
        removing: model.removals.iter().map(|r| r.draw(now)).collect(),
        hovered,
        hidden,
        hide_progress: model.hide_progress(now),
        zoom_in_percent: params.zoom_in_percent,
        footprint: result.footprint,
        static_footprint: result.static_footprint,
        background: result.background,
    };

    previous != hovered || was_hidden != hidden
}

/// Make sure the render tick is running
pub fn arm_render(model: &mut DockModel, now: Instant) {
    if model.render_scheduled() {
        return;
    }
    model.render_timer = Some(
        model
            .scheduler
            .schedule_repeating(TimerKind::RenderFrame, now, FRAME_INTERVAL),
    );
}

/// Lay out and re-arm; the common tail of input handlers
pub fn refresh(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    layout_pass(model, now);
    arm_render(model, now);
    Some(Cmd::Redraw)
}

/// One render tick; stops the tick once nothing animates
pub fn render_tick(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    layout_pass(model, now);

    if !model.animation_needed(now) {
        model.scheduler.cancel_slot(&mut model.render_timer);
        tracing::trace!("animations settled, render tick stopped");
    }
    Some(Cmd::Redraw)
}

/// Re-evaluate window overlap against the resting footprint
pub fn recheck_windows(model: &mut DockModel, now: Instant) -> bool {
    if model.frame.static_footprint.is_empty() {
        layout_pass(model, now);
    }
    let intersects = autohide::window_intersects(
        model.autohide.behavior(),
        &model.frame.static_footprint,
        model.own_pid,
        model.oracle.as_ref(),
    );
    model
        .autohide
        .set_window_intersects(intersects, &mut model.scheduler, now)
}
