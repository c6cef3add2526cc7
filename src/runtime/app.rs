use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use softbuffer::Context;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::Window;

use dockline::autohide::{ActiveWindow, StaticWindowOracle, WindowInfo};
use dockline::commands::Cmd;
use dockline::config::{ConfigOverrides, DockConfig};
use dockline::config_watcher::ConfigWatcher;
use dockline::cursor::{DisplayId, Modifiers, NullPointerSource};
use dockline::geometry::{Point, Rect};
use dockline::items::{ClickAnimation, Clickable, DockItem, ItemId, ItemKind, ItemState, ProviderId};
use dockline::messages::{
    AppMsg, AutohideMsg, CursorMsg, DragMsg, ItemMsg, Msg, PointerButton, ScrollDirection,
};
use dockline::model::DockModel;
use dockline::provider::{BasicBehavior, ItemProvider};
use dockline::update::{run_due_timers, update};

use super::render::Renderer;

const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 640;
/// Pid of the fake window toggled with `w`
const DEMO_WINDOW_PID: u32 = 1;
const LAUNCHERS: ProviderId = ProviderId(0);
const RUNNING: ProviderId = ProviderId(1);

/// Click feedback for preview items
struct PreviewClick;

impl Clickable for PreviewClick {
    fn clicked(&mut self, button: PointerButton, _modifiers: Modifiers) -> anyhow::Result<ClickAnimation> {
        Ok(match button {
            PointerButton::Left => ClickAnimation::Bounce,
            PointerButton::Middle => ClickAnimation::Lighten,
            PointerButton::Right => ClickAnimation::Darken,
        })
    }
}

/// Build the dock shown by the preview window
pub fn preview_model(config: DockConfig, items: usize, oracle: StaticWindowOracle, now: Instant) -> DockModel {
    let screen = Rect::new(0.0, 0.0, WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32);
    let mut model = DockModel::new(config, screen, Box::new(oracle), Box::new(NullPointerSource), now);

    let mut launchers = ItemProvider::new(LAUNCHERS, "launchers", BasicBehavior::new(true, true));
    for i in 0..items as u64 {
        let item = DockItem::launcher(i + 1, format!("launcher-{}", i + 1)).with_click(PreviewClick);
        launchers.add_item(item, now);
    }

    let mut running = ItemProvider::new(RUNNING, "running", BasicBehavior::new(false, false));
    running.add_item(DockItem::separator(1000), now);
    for (id, label) in [(1001, "editor"), (1002, "terminal")] {
        let item = DockItem::new(ItemId(id), ItemKind::Application, label).with_click(PreviewClick);
        running.add_item(item, now);
    }
    if let Some(editor) = running.item_mut(ItemId(1001)) {
        editor.set_state(ItemState::ACTIVE, true, now);
    }

    model.add_provider(launchers);
    model.add_provider(running);
    model
}

pub struct App {
    model: DockModel,
    oracle: StaticWindowOracle,
    renderer: Option<Renderer>,
    window: Option<Rc<Window>>,
    context: Option<Context<Rc<Window>>>,
    modifiers: ModifiersState,
    buttons: Modifiers,
    watcher: Option<ConfigWatcher>,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    next_item: u64,
    window_covered: bool,
}

impl App {
    pub fn new(
        model: DockModel,
        oracle: StaticWindowOracle,
        config_path: Option<PathBuf>,
        overrides: ConfigOverrides,
    ) -> Self {
        let watcher = config_path.clone().and_then(|path| match ConfigWatcher::new(path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!("Config watching disabled: {}", e);
                None
            }
        });

        Self {
            model,
            oracle,
            renderer: None,
            window: None,
            context: None,
            modifiers: ModifiersState::empty(),
            buttons: Modifiers::empty(),
            watcher,
            config_path,
            overrides,
            next_item: 2000,
            window_covered: false,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Dockline")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = Rc::new(event_loop.create_window(window_attributes)?);
        let context = Context::new(Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create context: {}", e))?;
        let renderer = Renderer::new(Rc::clone(&window), &context)?;

        let size = window.inner_size();
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.context = Some(context);

        let screen = Rect::new(0.0, 0.0, size.width as f32, size.height as f32);
        update(&mut self.model, Msg::App(AppMsg::ScreenChanged(screen)));
        update(&mut self.model, Msg::Autohide(AutohideMsg::StartupComplete));
        Ok(())
    }

    fn current_modifiers(&self) -> Modifiers {
        let mut mods = self.buttons;
        mods.set(Modifiers::SHIFT, self.modifiers.shift_key());
        mods.set(Modifiers::CONTROL, self.modifiers.control_key());
        mods.set(Modifiers::ALT, self.modifiers.alt_key());
        mods.set(Modifiers::SUPER, self.modifiers.super_key());
        mods
    }

    fn handle_event(&mut self, event: &WindowEvent) -> Option<Cmd> {
        match event {
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) = renderer.resize(size.width, size.height) {
                        tracing::warn!("Resize failed: {:#}", e);
                    }
                }
                let screen = Rect::new(0.0, 0.0, size.width as f32, size.height as f32);
                update(&mut self.model, Msg::App(AppMsg::ScreenChanged(screen)))
            }
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let modifiers = self.current_modifiers();
                update(
                    &mut self.model,
                    Msg::Cursor(CursorMsg::Moved {
                        display: DisplayId::PRIMARY,
                        position: Point::new(position.x as f32, position.y as f32),
                        modifiers,
                    }),
                )
            }
            WindowEvent::CursorLeft { .. } => {
                update(&mut self.model, Msg::Cursor(CursorMsg::Left(DisplayId::PRIMARY)))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let (button, flag) = match button {
                    MouseButton::Left => (PointerButton::Left, Modifiers::BUTTON1),
                    MouseButton::Middle => (PointerButton::Middle, Modifiers::BUTTON2),
                    MouseButton::Right => (PointerButton::Right, Modifiers::BUTTON3),
                    _ => return None,
                };
                let pressed = *state == ElementState::Pressed;
                self.buttons.set(flag, pressed);
                let msg = if pressed {
                    CursorMsg::Pressed(button)
                } else {
                    CursorMsg::Released(button)
                };
                update(&mut self.model, Msg::Cursor(msg))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
                };
                let direction = if dy.abs() >= dx.abs() {
                    if dy > 0.0 {
                        ScrollDirection::Up
                    } else {
                        ScrollDirection::Down
                    }
                } else if dx > 0.0 {
                    ScrollDirection::Right
                } else {
                    ScrollDirection::Left
                };
                update(&mut self.model, Msg::Cursor(CursorMsg::Scrolled(direction)))
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                self.handle_key(&event.logical_key)
            }
            _ => None,
        }
    }

    /// Preview shortcuts
    fn handle_key(&mut self, key: &Key) -> Option<Cmd> {
        match key {
            Key::Named(NamedKey::Escape) => update(&mut self.model, Msg::Drag(DragMsg::Cancel)),
            Key::Character(c) => match c.as_str() {
                "a" => {
                    let id = self.next_item;
                    self.next_item += 1;
                    let item = DockItem::launcher(id, format!("launcher-{}", id)).with_click(PreviewClick);
                    update(
                        &mut self.model,
                        Msg::Item(ItemMsg::Add {
                            provider: LAUNCHERS,
                            item,
                        }),
                    )
                }
                "d" => {
                    let id = self.model.hovered_item()?;
                    update(&mut self.model, Msg::Item(ItemMsg::Remove(id)))
                }
                "u" => self.toggle_state(ItemState::URGENT),
                "s" => self.toggle_state(ItemState::ACTIVE),
                "c" => {
                    let enabled = !self.model.autohide.config_mode();
                    update(&mut self.model, Msg::Autohide(AutohideMsg::ConfigMode(enabled)))
                }
                "w" => self.toggle_demo_window(),
                "q" => update(&mut self.model, Msg::App(AppMsg::Quit)),
                _ => None,
            },
            _ => None,
        }
    }

    fn toggle_state(&mut self, flag: ItemState) -> Option<Cmd> {
        let id = self.model.hovered_item()?;
        let on = !self.model.item(id)?.state.contains(flag);
        update(
            &mut self.model,
            Msg::Item(ItemMsg::SetState {
                item: id,
                flags: flag,
                on,
            }),
        )
    }

    /// Cover the lower part of the screen with a fake active window
    fn toggle_demo_window(&mut self) -> Option<Cmd> {
        self.window_covered = !self.window_covered;
        if self.window_covered {
            let screen = self.model.screen;
            let rect = Rect::new(
                screen.x + screen.width * 0.1,
                screen.y + screen.height * 0.3,
                screen.width * 0.8,
                screen.height * 0.7,
            );
            self.oracle.set_windows(vec![WindowInfo::new(DEMO_WINDOW_PID, rect)]);
            self.oracle.set_active(Some(ActiveWindow {
                pid: DEMO_WINDOW_PID,
                fullscreen: false,
                rect,
            }));
        } else {
            self.oracle.set_windows(Vec::new());
            self.oracle.set_active(None);
        }
        tracing::info!(covered = self.window_covered, "demo window toggled");
        let a = update(&mut self.model, Msg::Autohide(AutohideMsg::GeometryChanged));
        let b = update(&mut self.model, Msg::Autohide(AutohideMsg::ActiveWindowChanged));
        Cmd::merge(a, b)
    }

    fn reload_config(&mut self) -> Option<Cmd> {
        let path = self.config_path.as_ref()?;
        let mut config = DockConfig::load_from(path);
        config.apply_overrides(&self.overrides);
        update(&mut self.model, Msg::App(AppMsg::PreferencesChanged(Box::new(config))))
    }

    fn render(&mut self) {
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.render(&self.model.frame, self.model.config.edge) {
                tracing::warn!("Render failed: {:#}", e);
            }
        }
    }

    fn process_cmd(&self, event_loop: &ActiveEventLoop, cmd: Cmd) {
        if cmd.is_quit() {
            event_loop.exit();
            return;
        }
        if cmd.needs_redraw() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            tracing::error!("Failed to open preview window: {:#}", e);
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                update(&mut self.model, Msg::App(AppMsg::Quit));
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.render(),
            event => {
                if let Some(cmd) = self.handle_event(&event) {
                    self.process_cmd(event_loop, cmd);
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.watcher.as_ref().is_some_and(ConfigWatcher::poll_changed) {
            if let Some(cmd) = self.reload_config() {
                self.process_cmd(event_loop, cmd);
            }
        }

        if let Some(cmd) = run_due_timers(&mut self.model, Instant::now()) {
            self.process_cmd(event_loop, cmd);
        }

        // Sleep until the next timer; the config watcher is checked on wake
        match self.model.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
