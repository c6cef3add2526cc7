//! Dock items and their capabilities
//!
//! Items are owned by an [`ItemProvider`](crate::provider::ItemProvider).
//! The engine reads their flags and timestamps for animation and writes
//! `position` during drags. Behavior an item may offer (accepting drops,
//! reacting to clicks or scrolls) is attached as small capability objects.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::cursor::Modifiers;
use crate::messages::{PointerButton, ScrollDirection};

/// Unique item identifier (unique across providers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(pub u32);

/// What an item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Pinned launcher
    Launcher,
    /// Running application without a launcher
    Application,
    /// File or folder shortcut
    File,
    /// Visual separator; never hovered
    Separator,
}

bitflags! {
    /// Runtime state shown on an item
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemState: u32 {
        const ACTIVE = 1;
        const URGENT = 1 << 1;
        const WAITING = 1 << 2;
        const MOVING = 1 << 3;
    }
}

/// Feedback animation chosen by an item's click handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAnimation {
    #[default]
    None,
    Bounce,
    Darken,
    Lighten,
}

/// Payload of an external drag (URIs from a file manager or browser)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropPayload {
    pub uris: Vec<String>,
}

impl DropPayload {
    pub fn new(uris: Vec<String>) -> Self {
        Self { uris }
    }
}

/// Can take dropped payloads
pub trait AcceptsDrop {
    fn can_accept(&self, payload: &DropPayload) -> anyhow::Result<bool>;
    fn accept(&mut self, payload: &DropPayload) -> anyhow::Result<bool>;
}

/// Reacts to clicks
pub trait Clickable {
    fn clicked(&mut self, button: PointerButton, modifiers: Modifiers) -> anyhow::Result<ClickAnimation>;
}

/// Reacts to scroll wheel events
pub trait Scrollable {
    fn scrolled(&mut self, direction: ScrollDirection, modifiers: Modifiers) -> anyhow::Result<()>;
}

/// Optional behavior attached to an item
#[derive(Default)]
pub struct ItemCapabilities {
    pub drop: Option<Box<dyn AcceptsDrop>>,
    pub click: Option<Box<dyn Clickable>>,
    pub scroll: Option<Box<dyn Scrollable>>,
}

impl fmt::Debug for ItemCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCapabilities")
            .field("drop", &self.drop.is_some())
            .field("click", &self.click.is_some())
            .field("scroll", &self.scroll.is_some())
            .finish()
    }
}

/// Record of an item changing slot, used for the slide transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMove {
    pub at: Instant,
    pub from: usize,
}

/// A dock item
#[derive(Debug)]
pub struct DockItem {
    pub id: ItemId,
    pub provider: ProviderId,
    pub label: String,
    pub kind: ItemKind,
    /// Ordinal slot within the provider
    pub position: usize,
    /// Square items are one icon wide; others (separators) are narrower
    pub square: bool,
    pub zoomable: bool,
    pub added_at: Option<Instant>,
    pub last_click: Option<Instant>,
    pub click_animation: ClickAnimation,
    pub state: ItemState,
    state_changed_at: HashMap<ItemState, Instant>,
    pub last_move: Option<ItemMove>,
    pub capabilities: ItemCapabilities,
}

impl DockItem {
    pub fn new(id: ItemId, kind: ItemKind, label: impl Into<String>) -> Self {
        let separator = kind == ItemKind::Separator;
        Self {
            id,
            provider: ProviderId(0),
            label: label.into(),
            kind,
            position: 0,
            square: !separator,
            zoomable: true,
            added_at: None,
            last_click: None,
            click_animation: ClickAnimation::None,
            state: ItemState::empty(),
            state_changed_at: HashMap::new(),
            last_move: None,
            capabilities: ItemCapabilities::default(),
        }
    }

    pub fn launcher(id: u64, label: impl Into<String>) -> Self {
        Self::new(ItemId(id), ItemKind::Launcher, label)
    }

    pub fn separator(id: u64) -> Self {
        Self::new(ItemId(id), ItemKind::Separator, "")
    }

    pub fn with_drop(mut self, handler: impl AcceptsDrop + 'static) -> Self {
        self.capabilities.drop = Some(Box::new(handler));
        self
    }

    pub fn with_click(mut self, handler: impl Clickable + 'static) -> Self {
        self.capabilities.click = Some(Box::new(handler));
        self
    }

    pub fn with_scroll(mut self, handler: impl Scrollable + 'static) -> Self {
        self.capabilities.scroll = Some(Box::new(handler));
        self
    }

    pub fn zoomable(mut self, zoomable: bool) -> Self {
        self.zoomable = zoomable;
        self
    }

    pub fn is_separator(&self) -> bool {
        self.kind == ItemKind::Separator
    }

    /// Set or clear state flags; records the change time for each flag that flipped
    pub fn set_state(&mut self, flags: ItemState, on: bool, now: Instant) -> bool {
        let before = self.state;
        self.state.set(flags, on);
        let flipped = before ^ self.state;
        for flag in flipped.iter() {
            self.state_changed_at.insert(flag, now);
        }
        !flipped.is_empty()
    }

    /// When `flag` last flipped
    pub fn state_changed_at(&self, flag: ItemState) -> Option<Instant> {
        self.state_changed_at.get(&flag).copied()
    }

    /// Move to a new slot, remembering where it came from
    pub(crate) fn move_to(&mut self, position: usize, now: Instant) {
        if position != self.position {
            self.last_move = Some(ItemMove {
                at: now,
                from: self.position,
            });
            self.position = position;
        }
    }

    /// Ask the item whether it accepts `payload`; handler errors reject
    pub fn can_accept_drop(&self, payload: &DropPayload) -> anyhow::Result<bool> {
        match &self.capabilities.drop {
            Some(handler) => handler.can_accept(payload),
            None => Ok(false),
        }
    }
}
