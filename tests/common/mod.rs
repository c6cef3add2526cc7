//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use dockline::autohide::{ActiveWindow, StaticWindowOracle, WindowInfo, WindowOracle};
use dockline::commands::Cmd;
use dockline::config::DockConfig;
use dockline::cursor::{DisplayId, Modifiers, PointerSource};
use dockline::error::DockError;
use dockline::geometry::{Point, Rect};
use dockline::items::{DockItem, ItemId, ProviderId};
use dockline::messages::{AutohideMsg, CursorMsg, Msg, PointerButton};
use dockline::model::DockModel;
use dockline::provider::{BasicBehavior, ItemProvider};
use dockline::update::{run_due_timers, update_at};

/// 1000x800 screen; a bottom dock of three 48px icons puts their centers at
/// x = 440, 500, 560 and y = 770
pub const SCREEN: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

/// Inside the dock, over the middle of three items
pub const OVER_MIDDLE: Point = Point::new(500.0, 790.0);

/// On the reveal strip of a hidden dock
pub const AT_EDGE: Point = Point::new(500.0, 799.0);

/// Clear of the dock, even fully zoomed (within one pointer jump of it)
pub const AWAY: Point = Point::new(500.0, 500.0);

pub const LAUNCHERS: ProviderId = ProviderId(0);

/// Pid used for windows of "another application"
pub const OTHER_PID: u32 = 0xFFFF_FF00;

/// Oracle whose every query fails
pub struct FailingOracle;

impl WindowOracle for FailingOracle {
    fn windows(&self) -> Result<Vec<WindowInfo>, DockError> {
        Err(DockError::WindowQuery("display connection lost".to_string()))
    }

    fn active_window(&self) -> Result<Option<ActiveWindow>, DockError> {
        Err(DockError::WindowQuery("display connection lost".to_string()))
    }
}

/// Wraps a [`StaticWindowOracle`] and counts window enumerations
#[derive(Clone, Default)]
pub struct CountingOracle {
    pub inner: StaticWindowOracle,
    pub enumerations: Rc<Cell<usize>>,
}

impl WindowOracle for CountingOracle {
    fn windows(&self) -> Result<Vec<WindowInfo>, DockError> {
        self.enumerations.set(self.enumerations.get() + 1);
        self.inner.windows()
    }

    fn active_window(&self) -> Result<Option<ActiveWindow>, DockError> {
        self.inner.active_window()
    }
}

/// Pointer source answering whatever was last set
#[derive(Clone, Default)]
pub struct SharedPointer(pub Rc<Cell<Option<Point>>>);

impl SharedPointer {
    pub fn set(&self, point: Option<Point>) {
        self.0.set(point);
    }
}

impl PointerSource for SharedPointer {
    fn query(&self, _display: DisplayId) -> Option<(Point, Modifiers)> {
        self.0.get().map(|p| (p, Modifiers::empty()))
    }
}

/// Launchers provider with items `1..=count`
pub fn launchers(count: u64, now: Instant) -> ItemProvider {
    let mut provider = ItemProvider::new(LAUNCHERS, "launchers", BasicBehavior::new(true, true));
    for id in 1..=count {
        provider.add_item(DockItem::launcher(id, format!("launcher-{}", id)), now);
    }
    provider
}

/// A window of another application covering the lower half of the screen
pub fn covering_window() -> WindowInfo {
    WindowInfo::new(OTHER_PID, Rect::new(100.0, 300.0, 800.0, 480.0))
}

pub fn active(window: &WindowInfo, fullscreen: bool) -> ActiveWindow {
    ActiveWindow {
        pid: window.pid,
        fullscreen,
        rect: window.rect,
    }
}

/// A dock driven on a synthetic clock
pub struct TestDock {
    pub model: DockModel,
    pub oracle: StaticWindowOracle,
    pub pointer: SharedPointer,
    pub start: Instant,
    pub now: Instant,
}

impl TestDock {
    /// Default preferences, three launchers, still in startup mode
    pub fn new() -> Self {
        Self::with_config(DockConfig::default(), 3)
    }

    pub fn with_config(config: DockConfig, items: u64) -> Self {
        let oracle = StaticWindowOracle::new();
        let mut dock = Self::with_oracle(config, items, Box::new(oracle.clone()));
        dock.oracle = oracle;
        dock
    }

    /// `oracle` answers window queries; `self.oracle` is then detached
    pub fn with_oracle(config: DockConfig, items: u64, oracle: Box<dyn WindowOracle>) -> Self {
        Self::assemble(config, vec![launchers(items, Instant::now())], oracle)
    }

    /// Custom providers; the first one is the default drop target
    pub fn with_providers(config: DockConfig, providers: Vec<ItemProvider>) -> Self {
        let oracle = StaticWindowOracle::new();
        let mut dock = Self::assemble(config, providers, Box::new(oracle.clone()));
        dock.oracle = oracle;
        dock
    }

    fn assemble(config: DockConfig, providers: Vec<ItemProvider>, oracle: Box<dyn WindowOracle>) -> Self {
        let start = Instant::now();
        let pointer = SharedPointer::default();
        let mut model = DockModel::new(config, SCREEN, oracle, Box::new(pointer.clone()), start);
        for provider in providers {
            model.add_provider(provider);
        }

        Self {
            model,
            oracle: StaticWindowOracle::new(),
            pointer,
            start,
            now: start,
        }
    }

    /// Default dock that finished startup and settled
    pub fn started() -> Self {
        let mut dock = Self::new();
        dock.startup();
        dock
    }

    pub fn started_with(config: DockConfig) -> Self {
        let mut dock = Self::with_config(config, 3);
        dock.startup();
        dock
    }

    pub fn send(&mut self, msg: Msg) -> Option<Cmd> {
        update_at(&mut self.model, msg, self.now)
    }

    /// Leave startup mode and let the reveal finish
    pub fn startup(&mut self) {
        self.send(Msg::Autohide(AutohideMsg::StartupComplete));
        self.advance(500);
    }

    /// Move the clock forward, firing timers at their exact deadlines
    pub fn advance(&mut self, ms: u64) -> Option<Cmd> {
        let target = self.now + Duration::from_millis(ms);
        let mut result = None;
        while let Some(deadline) = self.model.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = deadline;
            result = Cmd::merge(result, run_due_timers(&mut self.model, deadline));
        }
        self.now = target;
        result
    }

    pub fn point(&mut self, p: Point) -> Option<Cmd> {
        self.send(Msg::pointer(p.x, p.y))
    }

    pub fn point_xy(&mut self, x: f32, y: f32) -> Option<Cmd> {
        self.send(Msg::pointer(x, y))
    }

    pub fn press(&mut self) -> Option<Cmd> {
        self.send(Msg::Cursor(CursorMsg::Pressed(PointerButton::Left)))
    }

    pub fn release(&mut self) -> Option<Cmd> {
        self.send(Msg::Cursor(CursorMsg::Released(PointerButton::Left)))
    }

    pub fn click(&mut self) {
        for msg in Msg::click() {
            self.send(msg);
        }
    }

    /// Window change notification followed by the coalescing delay
    pub fn windows_changed(&mut self) {
        self.send(Msg::Autohide(AutohideMsg::GeometryChanged));
        self.advance(250);
    }

    /// Put a focused window of another application over the dock
    pub fn cover_dock(&mut self) {
        let window = covering_window();
        self.oracle.set_active(Some(active(&window, false)));
        self.oracle.set_windows(vec![window]);
        self.windows_changed();
    }

    pub fn uncover_dock(&mut self) {
        self.oracle.set_windows(Vec::new());
        self.oracle.set_active(None);
        self.windows_changed();
    }

    pub fn hidden(&self) -> bool {
        self.model.is_hidden()
    }

    pub fn hovered(&self) -> Option<u64> {
        self.model.hovered_item().map(|id| id.0)
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.model.item(ItemId(id)).map(|item| item.position)
    }

    /// Item ids in dock order
    pub fn order(&self) -> Vec<u64> {
        self.model
            .providers
            .ordered_items()
            .into_iter()
            .map(|item| item.id.0)
            .collect()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.now.saturating_duration_since(self.start).as_millis() as u64
    }
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}
