//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions. Every handler
//! takes the current instant so that replays and tests can drive the dock
//! on a synthetic clock.

mod app;
mod autohide;
mod drag;
mod frame;
mod items;
mod pointer;

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::{Msg, TimerKind};
use crate::model::DockModel;

#[cfg(debug_assertions)]
use crate::tracing::StateSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use app::update_app;
pub use autohide::{geometry_recheck, unhide_delay_elapsed, update_autohide};
pub use drag::{begin_internal_drag, finish_internal_drag, update_drag};
pub use frame::{layout_pass, recheck_windows, refresh, render_tick};
pub use items::update_items;
pub use pointer::{poll_cursor, update_cursor};

/// Main update function using the wall clock
#[inline]
pub fn update(model: &mut DockModel, msg: Msg) -> Option<Cmd> {
    update_at(model, msg, Instant::now())
}

/// Dispatch `msg` as if it arrived at `now`
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update_at(model: &mut DockModel, msg: Msg, now: Instant) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg, now)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg, now)
    }
}

/// Fire every timer due at `now`, in deadline order
pub fn run_due_timers(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    let mut result = None;
    for kind in model.scheduler.take_due(now) {
        let cmd = update_at(model, Msg::Timer(kind), now);
        result = Cmd::merge(result, cmd);
    }
    result
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut DockModel, msg: Msg, now: Instant) -> Option<Cmd> {
    if model.is_disposed() {
        return None;
    }

    let result = match msg {
        Msg::Cursor(m) => pointer::update_cursor(model, m, now),
        Msg::Item(m) => items::update_items(model, m, now),
        Msg::Drag(m) => drag::update_drag(model, m, now),
        Msg::Autohide(m) => autohide::update_autohide(model, m, now),
        Msg::App(m) => app::update_app(model, m, now),
        Msg::Timer(kind) => update_timer(model, kind, now),
    };

    for provider in model.providers.iter() {
        provider.assert_positions_valid();
    }
    result
}

fn update_timer(model: &mut DockModel, kind: TimerKind, now: Instant) -> Option<Cmd> {
    match kind {
        TimerKind::CursorPoll(display) => pointer::poll_cursor(model, display, now),
        TimerKind::RenderFrame => frame::render_tick(model, now),
        TimerKind::UnhideDelay => autohide::unhide_delay_elapsed(model, now),
        TimerKind::GeometryRecheck => autohide::geometry_recheck(model, now),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after dock state and logs diffs for debugging.
/// Filters out noisy timer messages from logging.
#[cfg(debug_assertions)]
fn update_traced(model: &mut DockModel, msg: Msg, now: Instant) -> Option<Cmd> {
    // Render ticks and cursor polls fire many times a second
    let is_noisy = matches!(
        &msg,
        Msg::Timer(TimerKind::RenderFrame) | Msg::Timer(TimerKind::CursorPoll(_))
    );

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = StateSnapshot::from_model(model);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg, now);

    let after = StateSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "dock", %diff, "state changed");
    }

    result
}

/// Get a display name for a message type
///
/// Uses Debug formatting to include variant names and arguments.
/// Example outputs:
/// - `Cursor::Pressed(Left)`
/// - `Autohide::ConfigMode(true)`
/// - `Timer::UnhideDelay`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Cursor(m) => format!("Cursor::{:?}", m),
        Msg::Item(m) => format!("Item::{:?}", m),
        Msg::Drag(m) => format!("Drag::{:?}", m),
        Msg::Autohide(m) => format!("Autohide::{:?}", m),
        Msg::App(m) => format!("App::{:?}", m),
        Msg::Timer(kind) => format!("Timer::{:?}", kind),
    }
}
