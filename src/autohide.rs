//! Autohide state machine
//!
//! `hidden` is derived from the configured behavior, whether the pointer is
//! over the dock, and whether another window overlaps the dock. Hiding is
//! immediate; revealing a hidden dock the pointer touched waits for the
//! unhide delay. Window geometry changes are coalesced into one recheck.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::DockError;
use crate::geometry::{Point, Rect};
use crate::messages::TimerKind;
use crate::timer::{Scheduler, TimerHandle};

/// Coalescing delay for geometry/active-window change events
pub const GEOMETRY_RECHECK_DELAY: Duration = Duration::from_millis(200);
/// Windows must overlap the footprint by more than this on each edge
pub const INTERSECT_INSET: f32 = 2.0;

/// When the dock hides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutohideBehavior {
    /// Always visible
    None,
    /// Hidden unless the pointer is over it
    Autohide,
    /// Hidden when a window of the active application overlaps it
    #[default]
    Intellihide,
    /// Hidden when any window overlaps it
    UniversalIntellihide,
}

/// Window types the oracle reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    Utility,
    Toolbar,
    Desktop,
    Dock,
    Splash,
    Menu,
}

impl WindowType {
    /// Desktop, dock, splash and menu windows never push the dock away
    pub fn is_ignored(self) -> bool {
        matches!(
            self,
            WindowType::Desktop | WindowType::Dock | WindowType::Splash | WindowType::Menu
        )
    }
}

/// A candidate window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub pid: u32,
    #[serde(default, rename = "type")]
    pub window_type: WindowType,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default = "default_true")]
    pub on_active_workspace: bool,
    pub rect: Rect,
}

fn default_true() -> bool {
    true
}

impl WindowInfo {
    pub fn new(pid: u32, rect: Rect) -> Self {
        Self {
            pid,
            window_type: WindowType::Normal,
            minimized: false,
            on_active_workspace: true,
            rect,
        }
    }
}

/// The focused window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub pid: u32,
    #[serde(default)]
    pub fullscreen: bool,
    pub rect: Rect,
}

/// Window geometry provider
pub trait WindowOracle {
    fn windows(&self) -> Result<Vec<WindowInfo>, DockError>;
    fn active_window(&self) -> Result<Option<ActiveWindow>, DockError>;
}

#[derive(Debug, Clone, Default)]
struct WindowSnapshot {
    windows: Vec<WindowInfo>,
    active: Option<ActiveWindow>,
}

/// An oracle answering from a shared, settable snapshot
///
/// Clones share the snapshot, so a caller can keep a handle and change the
/// windows while the model owns another.
#[derive(Debug, Clone, Default)]
pub struct StaticWindowOracle {
    state: Rc<RefCell<WindowSnapshot>>,
}

impl StaticWindowOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_windows(&self, windows: Vec<WindowInfo>) {
        self.state.borrow_mut().windows = windows;
    }

    pub fn set_active(&self, active: Option<ActiveWindow>) {
        self.state.borrow_mut().active = active;
    }
}

impl WindowOracle for StaticWindowOracle {
    fn windows(&self) -> Result<Vec<WindowInfo>, DockError> {
        Ok(self.state.borrow().windows.clone())
    }

    fn active_window(&self) -> Result<Option<ActiveWindow>, DockError> {
        Ok(self.state.borrow().active.clone())
    }
}

/// The `hidden` formula
pub fn compute_hidden(
    behavior: AutohideBehavior,
    startup_mode: bool,
    config_mode: bool,
    dock_hovered: bool,
    window_intersects: bool,
) -> bool {
    if startup_mode {
        return true;
    }
    match behavior {
        AutohideBehavior::None => false,
        AutohideBehavior::Autohide => !config_mode && !dock_hovered,
        AutohideBehavior::Intellihide | AutohideBehavior::UniversalIntellihide => {
            !config_mode && !dock_hovered && window_intersects
        }
    }
}

fn active_window_or_none(oracle: &dyn WindowOracle) -> Option<ActiveWindow> {
    match oracle.active_window() {
        Ok(active) => active,
        Err(e) => {
            tracing::warn!("Active window query failed: {}", e);
            None
        }
    }
}

/// Pointer inside `footprint`, unless a fullscreen window covers the dock
pub fn pointer_hovers(footprint: &Rect, pointer: Point, oracle: &dyn WindowOracle) -> bool {
    if !footprint.contains_point(pointer) {
        return false;
    }
    match active_window_or_none(oracle) {
        Some(active) if active.fullscreen => !active.rect.intersects(footprint),
        _ => true,
    }
}

/// Whether a relevant window overlaps `footprint`
///
/// Every window is examined on each call. Oracle failures count as "no
/// intersection" so the dock fails open to visible.
pub fn window_intersects(
    behavior: AutohideBehavior,
    footprint: &Rect,
    own_pid: u32,
    oracle: &dyn WindowOracle,
) -> bool {
    let required_pid = match behavior {
        AutohideBehavior::None | AutohideBehavior::Autohide => return false,
        AutohideBehavior::UniversalIntellihide => None,
        AutohideBehavior::Intellihide => match active_window_or_none(oracle) {
            Some(active) => Some(active.pid),
            None => return false,
        },
    };

    let windows = match oracle.windows() {
        Ok(windows) => windows,
        Err(e) => {
            tracing::warn!("Window query failed, assuming no overlap: {}", e);
            return false;
        }
    };

    let area = footprint.inset(INTERSECT_INSET);
    windows.iter().any(|w| {
        !w.minimized
            && w.pid != own_pid
            && !w.window_type.is_ignored()
            && w.on_active_workspace
            && required_pid.map_or(true, |pid| w.pid == pid)
            && w.rect.intersects(&area)
    })
}

/// Autohide state for one dock
#[derive(Debug, Clone)]
pub struct AutohideManager {
    behavior: AutohideBehavior,
    hidden: bool,
    dock_hovered: bool,
    window_intersects: bool,
    config_mode: bool,
    startup_mode: bool,
    unhide_delay: Duration,
    unhide_timer: Option<TimerHandle>,
    recheck_timer: Option<TimerHandle>,
    hidden_changed_at: Option<Instant>,
}

impl AutohideManager {
    /// Starts hidden, in startup mode
    pub fn new(behavior: AutohideBehavior, unhide_delay: Duration) -> Self {
        Self {
            behavior,
            hidden: true,
            dock_hovered: false,
            window_intersects: false,
            config_mode: false,
            startup_mode: true,
            unhide_delay,
            unhide_timer: None,
            recheck_timer: None,
            hidden_changed_at: None,
        }
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn behavior(&self) -> AutohideBehavior {
        self.behavior
    }

    pub fn dock_hovered(&self) -> bool {
        self.dock_hovered
    }

    pub fn window_intersects(&self) -> bool {
        self.window_intersects
    }

    pub fn config_mode(&self) -> bool {
        self.config_mode
    }

    pub fn startup_mode(&self) -> bool {
        self.startup_mode
    }

    /// When `hidden` last flipped
    pub fn hidden_changed_at(&self) -> Option<Instant> {
        self.hidden_changed_at
    }

    pub fn unhide_pending(&self) -> bool {
        self.unhide_timer.is_some()
    }

    pub fn recheck_pending(&self) -> bool {
        self.recheck_timer.is_some()
    }

    pub fn set_unhide_delay(&mut self, delay: Duration) {
        self.unhide_delay = delay;
    }

    pub fn set_behavior(&mut self, behavior: AutohideBehavior, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        self.behavior = behavior;
        self.update_hidden(scheduler, now)
    }

    pub fn set_dock_hovered(&mut self, hovered: bool, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        if self.dock_hovered == hovered {
            return false;
        }
        self.dock_hovered = hovered;
        self.update_hidden(scheduler, now)
    }

    pub fn set_window_intersects(
        &mut self,
        intersects: bool,
        scheduler: &mut Scheduler<TimerKind>,
        now: Instant,
    ) -> bool {
        if self.window_intersects == intersects {
            return false;
        }
        self.window_intersects = intersects;
        self.update_hidden(scheduler, now)
    }

    pub fn set_config_mode(&mut self, enabled: bool, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        self.config_mode = enabled;
        self.update_hidden(scheduler, now)
    }

    pub fn finish_startup(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        if !self.startup_mode {
            return false;
        }
        self.startup_mode = false;
        self.update_hidden(scheduler, now)
    }

    /// Schedule a window recheck unless one is already pending
    pub fn schedule_recheck(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) {
        if self.recheck_timer.is_some_and(|h| scheduler.is_pending(h)) {
            return;
        }
        self.recheck_timer = Some(scheduler.schedule_once(TimerKind::GeometryRecheck, now, GEOMETRY_RECHECK_DELAY));
    }

    /// The recheck timer fired. Returns false for a stale fire.
    pub fn take_recheck(&mut self) -> bool {
        self.recheck_timer.take().is_some()
    }

    /// The unhide delay elapsed
    pub fn unhide_delay_elapsed(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        if self.unhide_timer.take().is_none() {
            return false;
        }
        let target = self.target();
        if !target && self.hidden {
            self.set_hidden(false, now);
            return true;
        }
        self.update_hidden(scheduler, now)
    }

    fn target(&self) -> bool {
        compute_hidden(
            self.behavior,
            self.startup_mode,
            self.config_mode,
            self.dock_hovered,
            self.window_intersects,
        )
    }

    fn set_hidden(&mut self, hidden: bool, now: Instant) {
        self.hidden = hidden;
        self.hidden_changed_at = Some(now);
        tracing::debug!(
            hidden,
            behavior = ?self.behavior,
            hovered = self.dock_hovered,
            intersects = self.window_intersects,
            "dock visibility changed"
        );
    }

    /// Re-evaluate `hidden`. Returns true if it flipped.
    fn update_hidden(&mut self, scheduler: &mut Scheduler<TimerKind>, now: Instant) -> bool {
        if self.target() {
            scheduler.cancel_slot(&mut self.unhide_timer);
            if self.hidden {
                return false;
            }
            self.set_hidden(true, now);
            return true;
        }

        if !self.hidden || self.unhide_timer.is_some() {
            return false;
        }
        if self.dock_hovered && !self.unhide_delay.is_zero() {
            self.unhide_timer = Some(scheduler.schedule_once(TimerKind::UnhideDelay, now, self.unhide_delay));
            return false;
        }
        self.set_hidden(false, now);
        true
    }

    /// Cancel every timer this manager owns. Safe to call repeatedly.
    pub fn dispose(&mut self, scheduler: &mut Scheduler<TimerKind>) {
        scheduler.cancel_slot(&mut self.unhide_timer);
        scheduler.cancel_slot(&mut self.recheck_timer);
    }
}
