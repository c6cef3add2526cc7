//! Drag message handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::cursor::ResolutionOwner;
use crate::drag::DragOutcome;
use crate::items::{ItemId, ItemState};
use crate::messages::DragMsg;
use crate::model::DockModel;

use super::frame::refresh;

/// Handle drag messages
pub fn update_drag(model: &mut DockModel, msg: DragMsg, now: Instant) -> Option<Cmd> {
    match msg {
        DragMsg::BeginInternal(item) => {
            if begin_internal_drag(model, item, now) {
                refresh(model, now)
            } else {
                None
            }
        }

        DragMsg::ExternalEnter(payload) => {
            if !model.drag.begin_external(payload, now) {
                return None;
            }
            request_drag_resolution(model, now);
            refresh(model, now)
        }

        DragMsg::ExternalLeave => {
            if !model.drag.leave_external() {
                return None;
            }
            cancel_drag_resolution(model, now);
            refresh(model, now)
        }

        DragMsg::ExternalDrop => {
            if !model.drag.is_external() {
                return None;
            }
            let outcome = model
                .drag
                .drop_external(model.hovered, &mut model.providers, model.default_provider);
            tracing::debug!(?outcome, "external drag finished");
            cancel_drag_resolution(model, now);
            refresh(model, now)
        }

        DragMsg::End => finish_internal_drag(model, now),

        DragMsg::Cancel => {
            if !model.drag.is_active() {
                return None;
            }
            let dragged = model.drag.dragged_item();
            model.drag.cancel(&mut model.providers, now);
            if let Some(item) = dragged.and_then(|id| model.providers.item_mut(id)) {
                item.set_state(ItemState::MOVING, false, now);
            }
            cancel_drag_resolution(model, now);
            refresh(model, now)
        }
    }
}

/// Start dragging `item`; refused while items are locked
pub fn begin_internal_drag(model: &mut DockModel, item: ItemId, now: Instant) -> bool {
    if model.config.lock_items {
        tracing::debug!(item = item.0, "items are locked, drag refused");
        return false;
    }
    let Some(pointer) = model.cursor_position() else {
        return false;
    };
    let draw = model.frame.get(item).copied();
    if !model
        .drag
        .begin_internal(item, &model.providers, draw.as_ref(), pointer, now)
    {
        return false;
    }
    if let Some(dragged) = model.providers.item_mut(item) {
        dragged.set_state(ItemState::MOVING, true, now);
    }
    request_drag_resolution(model, now);
    true
}

/// Finish the internal drag where the pointer is now
pub fn finish_internal_drag(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    if !model.drag.is_internal() {
        return None;
    }
    let dragged = model.drag.dragged_item();
    let in_dock = model
        .cursor_position()
        .is_some_and(|p| model.frame.footprint.contains_point(p));

    // Capture the last frame before the item can disappear
    if let Some(id) = dragged.filter(|_| !in_dock) {
        if model.providers.owner_of(id).is_some_and(|p| p.can_remove(id)) {
            model.record_removal(id, now);
        }
    }

    match model.drag.finish_internal(in_dock, &mut model.providers) {
        DragOutcome::Removed(item) => {
            tracing::info!(item = item.id.0, label = %item.label, "item removed by drag");
        }
        outcome => {
            tracing::debug!(?outcome, "internal drag finished");
            if let Some(item) = dragged.and_then(|id| model.providers.item_mut(id)) {
                item.set_state(ItemState::MOVING, false, now);
            }
        }
    }
    cancel_drag_resolution(model, now);
    refresh(model, now)
}

fn request_drag_resolution(model: &mut DockModel, now: Instant) {
    model
        .cursors
        .tracker(model.display, now)
        .request_high_resolution(ResolutionOwner::Drag, &mut model.scheduler, now);
}

pub(super) fn cancel_drag_resolution(model: &mut DockModel, now: Instant) {
    model
        .cursors
        .tracker(model.display, now)
        .cancel_high_resolution(ResolutionOwner::Drag, &mut model.scheduler, now);
}
