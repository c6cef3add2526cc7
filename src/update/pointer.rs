//! Pointer message handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::cursor::{CursorChange, DisplayId};
use crate::drag::DRAG_THRESHOLD_PIXELS;
use crate::messages::{CursorMsg, PointerButton, ScrollDirection};
use crate::model::{DockModel, PointerPress};

use super::drag::{begin_internal_drag, finish_internal_drag};
use super::frame::refresh;

/// Handle pointer messages
pub fn update_cursor(model: &mut DockModel, msg: CursorMsg, now: Instant) -> Option<Cmd> {
    match msg {
        CursorMsg::Moved {
            display,
            position,
            modifiers,
        } => {
            let change = model
                .cursors
                .tracker(display, now)
                .submit_sample(position, modifiers, model.pointer.as_ref(), now);
            handle_change(model, display, change, now)
        }

        CursorMsg::Left(display) => {
            let change = model.cursors.tracker(display, now).leave(now);
            handle_change(model, display, change, now)
        }

        CursorMsg::Pressed(button) => {
            let origin = model.cursor_position()?;
            model.press = Some(PointerPress {
                item: model.hovered,
                origin,
                button,
            });
            None
        }

        CursorMsg::Released(button) => {
            let press = model.press.take();
            if model.drag.is_internal() {
                return finish_internal_drag(model, now);
            }
            let press = press.filter(|p| p.button == button)?;
            let item = press.item.filter(|&id| Some(id) == model.hovered)?;
            click_item(model, item, button, now)
        }

        CursorMsg::Scrolled(direction) => {
            let item = model.hovered?;
            scroll_item(model, item, direction)
        }
    }
}

/// Poll timer fired
pub fn poll_cursor(model: &mut DockModel, display: DisplayId, now: Instant) -> Option<Cmd> {
    let change = model
        .cursors
        .tracker(display, now)
        .poll(model.pointer.as_ref(), now);
    handle_change(model, display, change, now)
}

fn handle_change(model: &mut DockModel, display: DisplayId, change: Option<CursorChange>, now: Instant) -> Option<Cmd> {
    let change = change?;
    if display != model.display {
        return None;
    }
    model.last_motion = Some(now);

    if let Some(press) = model.press {
        let travelled = press.origin.distance(change.sample.position);
        if press.button == PointerButton::Left && travelled > DRAG_THRESHOLD_PIXELS && !model.drag.is_active() {
            if let Some(item) = press.item {
                model.press = None;
                begin_internal_drag(model, item, now);
            }
        }
    }

    refresh(model, now)
}

fn click_item(model: &mut DockModel, id: crate::items::ItemId, button: PointerButton, now: Instant) -> Option<Cmd> {
    let modifiers = model.cursors.get(model.display).map(|t| t.sample().modifiers).unwrap_or_default();
    let item = model.providers.item_mut(id)?;
    let handler = item.capabilities.click.as_mut()?;

    match handler.clicked(button, modifiers) {
        Ok(animation) => {
            tracing::debug!(item = id.0, ?button, ?animation, "item clicked");
            item.last_click = Some(now);
            item.click_animation = animation;
            refresh(model, now)
        }
        Err(e) => {
            tracing::warn!(item = id.0, "Click handler failed: {:#}", e);
            None
        }
    }
}

fn scroll_item(model: &mut DockModel, id: crate::items::ItemId, direction: ScrollDirection) -> Option<Cmd> {
    let modifiers = model.cursors.get(model.display).map(|t| t.sample().modifiers).unwrap_or_default();
    let handler = model.providers.item_mut(id)?.capabilities.scroll.as_mut()?;
    if let Err(e) = handler.scrolled(direction, modifiers) {
        tracing::warn!(item = id.0, "Scroll handler failed: {:#}", e);
    }
    None
}
