//! Application model - the complete state of the dock
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod frame;

pub use frame::{FrameState, ItemDraw, RemovalAnimation};

use std::time::{Duration, Instant};

use crate::animation::{within, AnimationId, AnimationState, Ramp};
use crate::autohide::{AutohideManager, WindowOracle};
use crate::config::DockConfig;
use crate::cursor::{CursorRegistry, DisplayId, PointerSource};
use crate::drag::DockDragTracker;
use crate::geometry::{Point, Rect};
use crate::items::{DockItem, ItemId, ProviderId};
use crate::layout::effects::{self, item_effects, slide_slots};
use crate::layout::{DrawValue, LayoutItem, LayoutParams, HIDE_DURATION, ZOOM_IN_DURATION};
use crate::messages::TimerKind;
use crate::provider::{ItemProvider, ProviderList};
use crate::timer::{Scheduler, TimerHandle};

/// Render tick period while animating (~60 Hz)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// A button press that may become a click or a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub item: Option<ItemId>,
    pub origin: Point,
    pub button: crate::messages::PointerButton,
}

/// The complete dock model
pub struct DockModel {
    /// Preferences (read-only from the engine's point of view)
    pub config: DockConfig,
    /// Geometry of the screen the dock lives on
    pub screen: Rect,
    pub display: DisplayId,
    pub providers: ProviderList,
    /// Receives external drops nobody else takes
    pub default_provider: Option<ProviderId>,
    pub cursors: CursorRegistry,
    pub scheduler: Scheduler<TimerKind>,
    pub autohide: AutohideManager,
    pub drag: DockDragTracker,
    /// Last published frame
    pub frame: FrameState,
    /// Hovered item, swapped after each layout pass
    pub hovered: Option<ItemId>,
    pub press: Option<PointerPress>,
    pub removals: Vec<RemovalAnimation>,
    /// Magnification ramp, on while the pointer is over the visible dock
    pub zoom_ramp: Ramp,
    /// Slide ramp, on while hidden
    pub hide_ramp: Ramp,
    pub last_motion: Option<Instant>,
    pub(crate) render_timer: Option<TimerHandle>,
    pub(crate) animations: AnimationState<DockModel>,
    pub(crate) oracle: Box<dyn WindowOracle>,
    pub(crate) pointer: Box<dyn PointerSource>,
    pub own_pid: u32,
    disposed: bool,
}

impl std::fmt::Debug for DockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockModel")
            .field("config", &self.config)
            .field("screen", &self.screen)
            .field("providers", &self.providers)
            .field("autohide", &self.autohide)
            .field("drag", &self.drag)
            .field("hovered", &self.hovered)
            .field("animations", &self.animations)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl DockModel {
    /// Create a dock on `screen`; it starts hidden, in startup mode
    pub fn new(
        config: DockConfig,
        screen: Rect,
        oracle: Box<dyn WindowOracle>,
        pointer: Box<dyn PointerSource>,
        now: Instant,
    ) -> Self {
        let config = config.sanitized();
        let display = DisplayId::PRIMARY;
        let mut scheduler = Scheduler::new();
        let mut cursors = CursorRegistry::new();
        cursors.tracker(display, now).start(&mut scheduler, now);

        Self {
            autohide: AutohideManager::new(config.autohide, config.unhide_delay()),
            config,
            screen,
            display,
            providers: ProviderList::new(),
            default_provider: None,
            cursors,
            scheduler,
            drag: DockDragTracker::new(),
            frame: FrameState::default(),
            hovered: None,
            press: None,
            removals: Vec::new(),
            zoom_ramp: Ramp::new(false, ZOOM_IN_DURATION),
            hide_ramp: Ramp::new(true, HIDE_DURATION),
            last_motion: None,
            render_timer: None,
            animations: Self::register_animations(),
            oracle,
            pointer,
            own_pid: std::process::id(),
            disposed: false,
        }
    }

    fn register_animations() -> AnimationState<DockModel> {
        let mut animations = AnimationState::new();
        animations.add_condition(AnimationId::ZoomIn, |m: &DockModel, now| m.zoom_ramp.is_animating(now));
        animations.add_condition(AnimationId::HideSlide, |m: &DockModel, now| m.hide_ramp.is_animating(now));
        animations.add_condition(AnimationId::ItemSlide, |m: &DockModel, now| {
            m.providers.all_items().any(|item| effects::sliding(item, now))
        });
        animations.add_condition(AnimationId::ItemAdded, |m: &DockModel, now| {
            m.providers.all_items().any(|item| effects::fading_in(item, now))
        });
        animations.add_condition(AnimationId::ItemRemoved, |m: &DockModel, now| {
            m.removals.iter().any(|r| r.is_alive(now))
        });
        animations.add_condition(AnimationId::Click, |m: &DockModel, now| {
            m.providers.all_items().any(|item| effects::click_animating(item, now))
        });
        animations.add_condition(AnimationId::ItemState, |m: &DockModel, now| {
            m.providers.all_items().any(|item| effects::state_animating(item, now))
        });
        animations.add_condition(AnimationId::Drag, |m: &DockModel, _| m.drag.is_active());
        animations.add_condition(AnimationId::PointerMotion, |m: &DockModel, now| {
            m.autohide.dock_hovered() && within(m.last_motion, FRAME_INTERVAL * 2, now)
        });
        animations
    }

    /// Add a provider; the first one added becomes the default drop target
    pub fn add_provider(&mut self, provider: ItemProvider) {
        if self.default_provider.is_none() {
            self.default_provider = Some(provider.id);
        }
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: ItemProvider) -> Self {
        self.add_provider(provider);
        self
    }

    pub fn item(&self, id: ItemId) -> Option<&DockItem> {
        self.providers.item(id)
    }

    /// Draw value of `id` from the last frame
    ///
    /// # Panics
    /// If `id` was not laid out in the last frame.
    pub fn draw_value(&self, id: ItemId) -> &DrawValue {
        match self.frame.get(id) {
            Some(value) => value,
            None => panic!("no draw value for unknown item {:?}", id),
        }
    }

    pub fn hovered_item(&self) -> Option<ItemId> {
        self.hovered
    }

    pub fn is_hidden(&self) -> bool {
        self.autohide.hidden()
    }

    /// Latest pointer position on the dock's display
    pub fn cursor_position(&self) -> Option<Point> {
        self.cursors
            .get(self.display)
            .filter(|tracker| tracker.has_sample())
            .map(|tracker| tracker.position())
    }

    pub fn hide_progress(&self, now: Instant) -> f32 {
        self.hide_ramp.value(now)
    }

    /// Magnification at the pointer right now
    pub fn zoom_in_percent(&self, now: Instant) -> f32 {
        crate::layout::zoom::zoom_in_percent(self.config.effective_zoom_percent(), true, self.zoom_ramp.value(now))
    }

    /// Any condition still animating (no hysteresis)
    pub fn is_animating(&self, now: Instant) -> bool {
        !self.animations.active_ids(self, now).is_empty()
    }

    pub fn active_animations(&self, now: Instant) -> Vec<AnimationId> {
        self.animations.active_ids(self, now)
    }

    /// Read once per rendered frame
    pub fn animation_needed(&self, now: Instant) -> bool {
        self.animations.animation_needed(self, now)
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn render_scheduled(&self) -> bool {
        self.render_timer.is_some_and(|h| self.scheduler.is_pending(h))
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn layout_params(&self, now: Instant) -> LayoutParams {
        let external_gap = self.drag.is_external()
            && self
                .drag
                .external_accepted(self.hovered, &self.providers, self.default_provider);

        LayoutParams {
            screen: self.screen,
            edge: self.config.edge,
            icon_size: self.config.icon_size as f32,
            zoom_percent: self.config.effective_zoom_percent(),
            zoom_in_percent: self.zoom_in_percent(now),
            panel_mode: self.config.panel_mode,
            alignment: self.config.alignment,
            offset: self.config.offset,
            hide_progress: self.hide_progress(now),
            hidden: self.autohide.hidden(),
            cursor: self.cursor_position(),
            external_gap,
        }
    }

    pub(crate) fn layout_items(&self, now: Instant) -> Vec<LayoutItem> {
        let icon = self.config.icon_size as f32;
        self.providers
            .ordered_items()
            .into_iter()
            .map(|item| LayoutItem {
                id: item.id,
                square: item.square,
                zoomable: item.zoomable,
                separator: item.is_separator(),
                slide: slide_slots(item, now),
                effects: item_effects(item, icon, now),
            })
            .collect()
    }

    /// Keep a removed item's last frame around while it fades out
    pub(crate) fn record_removal(&mut self, id: ItemId, now: Instant) {
        if let Some(value) = self.frame.get(id).copied() {
            self.removals.push(RemovalAnimation {
                id,
                value,
                removed_at: now,
            });
        }
    }

    /// Cancel every timer and end any drag. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cursors.stop_all(&mut self.scheduler);
        self.autohide.dispose(&mut self.scheduler);
        self.scheduler.cancel_slot(&mut self.render_timer);
        self.scheduler.clear();
        self.drag.clear();
        self.press = None;
        self.disposed = true;
        tracing::debug!("dock model disposed");
    }
}

impl Drop for DockModel {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autohide::StaticWindowOracle;
    use crate::cursor::NullPointerSource;

    fn model() -> DockModel {
        DockModel::new(
            DockConfig::default(),
            Rect::new(0.0, 0.0, 1000.0, 800.0),
            Box::new(StaticWindowOracle::new()),
            Box::new(NullPointerSource),
            Instant::now(),
        )
    }

    #[test]
    fn test_starts_hidden_with_cursor_polling() {
        let m = model();
        assert!(m.is_hidden());
        assert!(m.autohide.startup_mode());
        assert_eq!(m.scheduler.len(), 1);
    }

    #[test]
    fn test_every_animation_registered_once() {
        let m = model();
        for id in [
            AnimationId::ZoomIn,
            AnimationId::HideSlide,
            AnimationId::ItemSlide,
            AnimationId::ItemAdded,
            AnimationId::ItemRemoved,
            AnimationId::Click,
            AnimationId::ItemState,
            AnimationId::Drag,
            AnimationId::PointerMotion,
        ] {
            assert!(m.animations.contains(id), "{id:?} missing");
        }
    }

    #[test]
    #[should_panic(expected = "no draw value")]
    fn test_draw_value_for_unknown_item_panics() {
        let m = model();
        m.draw_value(ItemId(42));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut m = model();
        m.dispose();
        m.dispose();
        assert!(m.scheduler.is_empty());
        assert!(m.is_disposed());
    }

    #[test]
    fn test_first_provider_is_default() {
        let m = model()
            .with_provider(ItemProvider::new(ProviderId(3), "a", crate::provider::BasicBehavior::default()))
            .with_provider(ItemProvider::new(ProviderId(4), "b", crate::provider::BasicBehavior::default()));
        assert_eq!(m.default_provider, Some(ProviderId(3)));
    }
}
