//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::config::DockConfig;
use crate::cursor::{DisplayId, Modifiers};
use crate::geometry::{Point, Rect};
use crate::items::{DockItem, DropPayload, ItemId, ItemState, ProviderId};

/// Pointer buttons the dock reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Scroll wheel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// What a fired timer was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Poll the pointer on a display
    CursorPoll(DisplayId),
    /// Render tick while something is animating
    RenderFrame,
    /// Delayed reveal of a hidden dock
    UnhideDelay,
    /// Coalesced window-intersection recheck
    GeometryRecheck,
}

/// Pointer input
#[derive(Debug, Clone)]
pub enum CursorMsg {
    /// Pointer moved (pushed from an input event)
    Moved {
        display: DisplayId,
        position: Point,
        modifiers: Modifiers,
    },
    /// Pointer left the display surface
    Left(DisplayId),
    /// Button pressed at the current position
    Pressed(PointerButton),
    /// Button released at the current position
    Released(PointerButton),
    /// Scroll wheel over the dock
    Scrolled(ScrollDirection),
}

/// Provider and item changes
#[derive(Debug)]
pub enum ItemMsg {
    /// Append an item to a provider
    Add { provider: ProviderId, item: DockItem },
    /// Remove an item (with a removal animation)
    Remove(ItemId),
    /// Set or clear state flags on an item
    SetState {
        item: ItemId,
        flags: ItemState,
        on: bool,
    },
}

/// Drag and drop
#[derive(Debug, Clone)]
pub enum DragMsg {
    /// Start dragging an item off this dock
    BeginInternal(ItemId),
    /// A foreign drag entered the dock
    ExternalEnter(DropPayload),
    /// The foreign drag left without dropping
    ExternalLeave,
    /// The foreign drag was dropped at the current pointer position
    ExternalDrop,
    /// Finish the internal drag at the current pointer position
    End,
    /// Abort the drag and restore item positions
    Cancel,
}

/// Inputs to the autohide state machine
#[derive(Debug, Clone)]
pub enum AutohideMsg {
    /// Some window moved, resized, appeared or vanished
    GeometryChanged,
    /// Another window became active
    ActiveWindowChanged,
    /// Preferences dialog opened/closed; the dock stays visible while open
    ConfigMode(bool),
    /// Startup animation finished
    StartupComplete,
}

/// Application-level messages
#[derive(Debug, Clone)]
pub enum AppMsg {
    /// Screen (monitor) geometry changed
    ScreenChanged(Rect),
    /// Preferences were edited
    PreferencesChanged(Box<DockConfig>),
    /// Tear down timers and quit
    Quit,
}

/// Top-level message type
#[derive(Debug)]
pub enum Msg {
    Cursor(CursorMsg),
    Item(ItemMsg),
    Drag(DragMsg),
    Autohide(AutohideMsg),
    App(AppMsg),
    /// A scheduler timer fired
    Timer(TimerKind),
}

// Convenience constructors for common messages
impl Msg {
    /// Pointer moved on the primary display
    pub fn pointer(x: f32, y: f32) -> Self {
        Msg::Cursor(CursorMsg::Moved {
            display: DisplayId::PRIMARY,
            position: Point::new(x, y),
            modifiers: Modifiers::empty(),
        })
    }

    /// Left-button click: press then release
    pub fn click() -> [Self; 2] {
        [
            Msg::Cursor(CursorMsg::Pressed(PointerButton::Left)),
            Msg::Cursor(CursorMsg::Released(PointerButton::Left)),
        ]
    }

    /// Render tick
    pub fn frame() -> Self {
        Msg::Timer(TimerKind::RenderFrame)
    }
}
