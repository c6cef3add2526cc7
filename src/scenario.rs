//! Headless scenario replay
//!
//! A scenario is a YAML file describing a screen, some providers and their
//! items, the windows on screen, and a list of timed actions. The runner
//! replays it against a [`DockModel`] on a synthetic clock, firing timers at
//! their exact deadlines, and writes every redrawn frame as a JSON line.
//!
//! ```yaml
//! screen: { x: 0, y: 0, width: 1280, height: 800 }
//! providers:
//!   - name: launchers
//!     removable: true
//!     items:
//!       - { id: 1, label: Files }
//!       - { id: 2, kind: separator }
//! steps:
//!   - { at_ms: 0, action: startup_complete }
//!   - { at_ms: 100, action: pointer, x: 640, y: 790 }
//! ```

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::autohide::{ActiveWindow, StaticWindowOracle, WindowInfo};
use crate::commands::Cmd;
use crate::config::DockConfig;
use crate::cursor::{DisplayId, Modifiers, NullPointerSource};
use crate::error::DockError;
use crate::geometry::Rect;
use crate::items::{ClickAnimation, DockItem, DropPayload, ItemId, ItemKind, ItemState, ProviderId};
use crate::messages::{AppMsg, AutohideMsg, CursorMsg, DragMsg, ItemMsg, Msg, PointerButton, ScrollDirection};
use crate::model::{DockModel, FrameState};
use crate::provider::{BasicBehavior, ItemProvider};
use crate::update::{refresh, run_due_timers, update_at};

/// How long the runner keeps ticking after the last step by default
pub const DEFAULT_SETTLE_MS: u64 = 1000;

/// A replayable dock session
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub screen: Rect,
    /// Preferences; missing fields use the defaults
    #[serde(default)]
    pub config: Option<DockConfig>,
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
    #[serde(default)]
    pub windows: Vec<WindowInfo>,
    #[serde(default)]
    pub active: Option<ActiveWindow>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Time to keep running after the last step
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    #[serde(default)]
    pub accepts_drops: bool,
    #[serde(default)]
    pub removable: bool,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub id: u64,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_kind")]
    pub kind: ItemKind,
    /// Animation the item plays when clicked
    #[serde(default)]
    pub click: ClickAnimation,
}

fn default_kind() -> ItemKind {
    ItemKind::Launcher
}

impl ItemSpec {
    fn build(&self) -> DockItem {
        let label = if self.label.is_empty() {
            format!("item-{}", self.id)
        } else {
            self.label.clone()
        };
        let item = DockItem::new(ItemId(self.id), self.kind, label);
        if self.click == ClickAnimation::None {
            item
        } else {
            item.with_click(FixedClick(self.click))
        }
    }
}

/// State flags a scenario can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateFlag {
    Active,
    Urgent,
    Waiting,
}

impl From<StateFlag> for ItemState {
    fn from(flag: StateFlag) -> Self {
        match flag {
            StateFlag::Active => ItemState::ACTIVE,
            StateFlag::Urgent => ItemState::URGENT,
            StateFlag::Waiting => ItemState::WAITING,
        }
    }
}

/// One timed action
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Milliseconds since the scenario started
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Pointer {
        x: f32,
        y: f32,
    },
    Leave,
    Press {
        #[serde(default = "default_button")]
        button: PointerButton,
    },
    Release {
        #[serde(default = "default_button")]
        button: PointerButton,
    },
    Click {
        #[serde(default = "default_button")]
        button: PointerButton,
    },
    Scroll {
        direction: ScrollDirection,
    },
    StartupComplete,
    ConfigMode {
        enabled: bool,
    },
    AddItem {
        provider: String,
        item: ItemSpec,
    },
    RemoveItem {
        id: u64,
    },
    SetState {
        id: u64,
        flag: StateFlag,
        on: bool,
    },
    BeginDrag {
        id: u64,
    },
    EndDrag,
    CancelDrag,
    ExternalEnter {
        uris: Vec<String>,
    },
    ExternalLeave,
    ExternalDrop,
    SetWindows {
        windows: Vec<WindowInfo>,
    },
    SetActive {
        window: Option<ActiveWindow>,
    },
    Screen {
        rect: Rect,
    },
    Preferences {
        config: DockConfig,
    },
    Quit,
}

fn default_button() -> PointerButton {
    PointerButton::Left
}

/// One line of frame output
#[derive(Debug, Serialize)]
pub struct FrameRecord<'a> {
    pub t_ms: u64,
    pub frame: &'a FrameState,
}

/// Summary of a finished replay
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub steps: usize,
    pub frames: usize,
    pub elapsed: Duration,
    pub last_frame: FrameState,
    pub hidden: bool,
    pub quit: bool,
}

struct FixedClick(ClickAnimation);

impl crate::items::Clickable for FixedClick {
    fn clicked(&mut self, _button: PointerButton, _modifiers: Modifiers) -> anyhow::Result<ClickAnimation> {
        Ok(self.0)
    }
}

impl Scenario {
    pub fn from_yaml(source: &str) -> Result<Self, DockError> {
        let scenario: Scenario = serde_yaml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, DockError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    fn validate(&self) -> Result<(), DockError> {
        if self.screen.is_empty() {
            return Err(DockError::Scenario("screen has no area".to_string()));
        }
        let mut ids: Vec<u64> = self
            .providers
            .iter()
            .flat_map(|p| p.items.iter().map(|i| i.id))
            .collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(DockError::Scenario(format!("duplicate item id {}", pair[0])));
        }
        if self.steps.windows(2).any(|pair| pair[1].at_ms < pair[0].at_ms) {
            return Err(DockError::Scenario("steps must be in time order".to_string()));
        }
        Ok(())
    }

    fn provider_id(&self, name: &str) -> Result<ProviderId, DockError> {
        self.providers
            .iter()
            .position(|p| p.name == name)
            .map(|index| ProviderId(index as u32))
            .ok_or_else(|| DockError::Scenario(format!("unknown provider '{}'", name)))
    }

    /// Build the model this scenario starts from
    pub fn build_model(&self, base: &DockConfig, oracle: StaticWindowOracle, now: Instant) -> DockModel {
        let config = self.config.clone().unwrap_or_else(|| base.clone());
        oracle.set_windows(self.windows.clone());
        oracle.set_active(self.active.clone());

        let mut model = DockModel::new(
            config,
            self.screen,
            Box::new(oracle),
            Box::new(NullPointerSource),
            now,
        );
        for (index, spec) in self.providers.iter().enumerate() {
            let mut provider = ItemProvider::new(
                ProviderId(index as u32),
                spec.name.clone(),
                BasicBehavior::new(spec.accepts_drops, spec.removable),
            );
            for item in &spec.items {
                provider.add_item(item.build(), now);
            }
            model.add_provider(provider);
        }
        model
    }

    /// Replay every step, writing one JSON line per redrawn frame to `out`
    pub fn run(&self, base: &DockConfig, out: &mut dyn Write) -> Result<ScenarioReport, DockError> {
        let start = Instant::now();
        let oracle = StaticWindowOracle::new();
        let mut model = self.build_model(base, oracle.clone(), start);
        let mut runner = Runner {
            model: &mut model,
            start,
            out,
            frames: 0,
        };

        // Lay out the initial frame before anything happens
        let cmd = refresh(runner.model, start);
        runner.emit(cmd, start)?;

        let mut quit = false;
        for step in &self.steps {
            let at = start + Duration::from_millis(step.at_ms);
            runner.advance_to(at)?;
            tracing::debug!(at_ms = step.at_ms, action = ?step.action, "scenario step");

            for msg in self.messages(&step.action, &oracle)? {
                let cmd = update_at(runner.model, msg, at);
                quit |= cmd.as_ref().is_some_and(Cmd::is_quit);
                runner.emit(cmd, at)?;
            }
            if quit {
                break;
            }
        }

        let last_at = self.steps.last().map_or(0, |s| s.at_ms);
        let end = start + Duration::from_millis(last_at + self.settle_ms);
        if !quit {
            runner.advance_to(end)?;
        }

        let frames = runner.frames;
        Ok(ScenarioReport {
            steps: self.steps.len(),
            frames,
            elapsed: end.saturating_duration_since(start),
            last_frame: model.frame.clone(),
            hidden: model.is_hidden(),
            quit,
        })
    }

    fn messages(&self, action: &Action, oracle: &StaticWindowOracle) -> Result<Vec<Msg>, DockError> {
        let msgs = match action {
            Action::Pointer { x, y } => vec![Msg::pointer(*x, *y)],
            Action::Leave => vec![Msg::Cursor(CursorMsg::Left(DisplayId::PRIMARY))],
            Action::Press { button } => vec![Msg::Cursor(CursorMsg::Pressed(*button))],
            Action::Release { button } => vec![Msg::Cursor(CursorMsg::Released(*button))],
            Action::Click { button } => vec![
                Msg::Cursor(CursorMsg::Pressed(*button)),
                Msg::Cursor(CursorMsg::Released(*button)),
            ],
            Action::Scroll { direction } => vec![Msg::Cursor(CursorMsg::Scrolled(*direction))],
            Action::StartupComplete => vec![Msg::Autohide(AutohideMsg::StartupComplete)],
            Action::ConfigMode { enabled } => vec![Msg::Autohide(AutohideMsg::ConfigMode(*enabled))],
            Action::AddItem { provider, item } => vec![Msg::Item(ItemMsg::Add {
                provider: self.provider_id(provider)?,
                item: item.build(),
            })],
            Action::RemoveItem { id } => vec![Msg::Item(ItemMsg::Remove(ItemId(*id)))],
            Action::SetState { id, flag, on } => vec![Msg::Item(ItemMsg::SetState {
                item: ItemId(*id),
                flags: (*flag).into(),
                on: *on,
            })],
            Action::BeginDrag { id } => vec![Msg::Drag(DragMsg::BeginInternal(ItemId(*id)))],
            Action::EndDrag => vec![Msg::Drag(DragMsg::End)],
            Action::CancelDrag => vec![Msg::Drag(DragMsg::Cancel)],
            Action::ExternalEnter { uris } => {
                vec![Msg::Drag(DragMsg::ExternalEnter(DropPayload::new(uris.clone())))]
            }
            Action::ExternalLeave => vec![Msg::Drag(DragMsg::ExternalLeave)],
            Action::ExternalDrop => vec![Msg::Drag(DragMsg::ExternalDrop)],
            Action::SetWindows { windows } => {
                oracle.set_windows(windows.clone());
                vec![Msg::Autohide(AutohideMsg::GeometryChanged)]
            }
            Action::SetActive { window } => {
                oracle.set_active(window.clone());
                vec![Msg::Autohide(AutohideMsg::ActiveWindowChanged)]
            }
            Action::Screen { rect } => vec![Msg::App(AppMsg::ScreenChanged(*rect))],
            Action::Preferences { config } => {
                vec![Msg::App(AppMsg::PreferencesChanged(Box::new(config.clone())))]
            }
            Action::Quit => vec![Msg::App(AppMsg::Quit)],
        };
        Ok(msgs)
    }
}

struct Runner<'a> {
    model: &'a mut DockModel,
    start: Instant,
    out: &'a mut dyn Write,
    frames: usize,
}

impl Runner<'_> {
    /// Fire every timer due up to and including `target`
    fn advance_to(&mut self, target: Instant) -> Result<(), DockError> {
        while let Some(deadline) = self.model.next_deadline() {
            if deadline > target {
                break;
            }
            let cmd = run_due_timers(self.model, deadline);
            self.emit(cmd, deadline)?;
        }
        Ok(())
    }

    fn emit(&mut self, cmd: Option<Cmd>, at: Instant) -> Result<(), DockError> {
        if !cmd.as_ref().is_some_and(Cmd::needs_redraw) {
            return Ok(());
        }
        let record = FrameRecord {
            t_ms: at.saturating_duration_since(self.start).as_millis() as u64,
            frame: &self.model.frame,
        };
        serde_json::to_writer(&mut *self.out, &record).map_err(std::io::Error::from)?;
        writeln!(self.out)?;
        self.frames += 1;
        Ok(())
    }
}
