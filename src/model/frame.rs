//! Published per-frame state
//!
//! The renderer reads a [`FrameState`]; it never looks into the model.

use std::time::Instant;

use serde::Serialize;

use crate::geometry::Rect;
use crate::items::ItemId;
use crate::layout::effects::{removal_opacity, REMOVE_DURATION};
use crate::layout::DrawValue;

/// One item as drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemDraw {
    pub id: ItemId,
    pub value: DrawValue,
}

/// A removed item fading out at its last position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalAnimation {
    pub id: ItemId,
    pub value: DrawValue,
    pub removed_at: Instant,
}

impl RemovalAnimation {
    pub fn is_alive(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.removed_at) < REMOVE_DURATION
    }

    /// Draw value with the fade applied
    pub fn draw(&self, now: Instant) -> ItemDraw {
        let mut value = self.value;
        value.effects.opacity *= removal_opacity(self.removed_at, now);
        ItemDraw { id: self.id, value }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameState {
    /// Items in dock order
    pub items: Vec<ItemDraw>,
    /// Removed items still fading out
    pub removing: Vec<ItemDraw>,
    pub hovered: Option<ItemId>,
    pub hidden: bool,
    pub hide_progress: f32,
    pub zoom_in_percent: f32,
    pub footprint: Rect,
    pub static_footprint: Rect,
    pub background: Rect,
}

impl FrameState {
    pub fn get(&self, id: ItemId) -> Option<&DrawValue> {
        self.items.iter().find(|draw| draw.id == id).map(|draw| &draw.value)
    }
}
