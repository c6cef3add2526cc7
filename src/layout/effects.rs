//! Per-item animation effects
//!
//! Bounces, fades and click feedback derived from an item's timestamps.
//! Everything here is a pure function of the item and `now`.

use std::f32::consts::PI;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::animation::{progress, within};
use crate::items::{ClickAnimation, DockItem, ItemState};

pub const CLICK_DURATION: Duration = Duration::from_millis(300);
pub const LAUNCH_BOUNCE_DURATION: Duration = Duration::from_millis(600);
pub const URGENT_BOUNCE_DURATION: Duration = Duration::from_millis(600);
pub const ACTIVE_DURATION: Duration = Duration::from_millis(300);
pub const ADD_DURATION: Duration = Duration::from_millis(200);
pub const REMOVE_DURATION: Duration = Duration::from_millis(200);
pub const SLIDE_DURATION: Duration = Duration::from_millis(300);

/// Bounce height as a fraction of the icon size
const BOUNCE_HEIGHT: f32 = 0.5;
const BOUNCES: f32 = 2.0;

/// Visual modifiers applied on top of the geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemEffects {
    /// Distance lifted away from the edge (bounces)
    pub lift: f32,
    pub opacity: f32,
    pub darken: f32,
    pub lighten: f32,
    /// Active-window indicator strength
    pub indicator: f32,
}

impl Default for ItemEffects {
    fn default() -> Self {
        Self {
            lift: 0.0,
            opacity: 1.0,
            darken: 0.0,
            lighten: 0.0,
            indicator: 0.0,
        }
    }
}

fn bounce(t: f32, height: f32) -> f32 {
    (PI * BOUNCES * t).sin().abs() * height * (1.0 - t)
}

pub fn click_animating(item: &DockItem, now: Instant) -> bool {
    let duration = match item.click_animation {
        ClickAnimation::None => return false,
        ClickAnimation::Bounce => LAUNCH_BOUNCE_DURATION,
        ClickAnimation::Darken | ClickAnimation::Lighten => CLICK_DURATION,
    };
    within(item.last_click, duration, now)
}

pub fn urgent_bouncing(item: &DockItem, now: Instant) -> bool {
    item.state.contains(ItemState::URGENT)
        && within(item.state_changed_at(ItemState::URGENT), URGENT_BOUNCE_DURATION, now)
}

pub fn state_animating(item: &DockItem, now: Instant) -> bool {
    urgent_bouncing(item, now) || within(item.state_changed_at(ItemState::ACTIVE), ACTIVE_DURATION, now)
}

pub fn fading_in(item: &DockItem, now: Instant) -> bool {
    within(item.added_at, ADD_DURATION, now)
}

pub fn sliding(item: &DockItem, now: Instant) -> bool {
    within(item.last_move.map(|m| m.at), SLIDE_DURATION, now)
}

/// Remaining slide distance in slots (signed, toward the old slot)
pub fn slide_slots(item: &DockItem, now: Instant) -> f32 {
    match item.last_move {
        Some(m) if sliding(item, now) => {
            let t = progress(m.at, SLIDE_DURATION, now);
            (m.from as f32 - item.position as f32) * (1.0 - t)
        }
        _ => 0.0,
    }
}

/// Effects for `item` at `now`
pub fn item_effects(item: &DockItem, icon_size: f32, now: Instant) -> ItemEffects {
    let mut effects = ItemEffects::default();
    let height = icon_size * BOUNCE_HEIGHT;

    if let Some(clicked) = item.last_click.filter(|_| click_animating(item, now)) {
        match item.click_animation {
            ClickAnimation::Bounce => {
                effects.lift = bounce(progress(clicked, LAUNCH_BOUNCE_DURATION, now), height);
            }
            ClickAnimation::Darken => {
                effects.darken = (PI * progress(clicked, CLICK_DURATION, now)).sin() * 0.5;
            }
            ClickAnimation::Lighten => {
                effects.lighten = (PI * progress(clicked, CLICK_DURATION, now)).sin() * 0.5;
            }
            ClickAnimation::None => {}
        }
    }

    if urgent_bouncing(item, now) {
        if let Some(since) = item.state_changed_at(ItemState::URGENT) {
            let lift = bounce(progress(since, URGENT_BOUNCE_DURATION, now), height);
            effects.lift = effects.lift.max(lift);
        }
    }

    let active = item.state.contains(ItemState::ACTIVE);
    effects.indicator = match item.state_changed_at(ItemState::ACTIVE) {
        Some(since) => {
            let t = progress(since, ACTIVE_DURATION, now);
            if active {
                t
            } else {
                1.0 - t
            }
        }
        None if active => 1.0,
        None => 0.0,
    };

    if let Some(added) = item.added_at {
        effects.opacity = progress(added, ADD_DURATION, now);
    }

    effects
}

/// Opacity of an item that was removed at `removed_at`
pub fn removal_opacity(removed_at: Instant, now: Instant) -> f32 {
    1.0 - progress(removed_at, REMOVE_DURATION, now)
}
