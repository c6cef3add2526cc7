//! Drag and drop
//!
//! At most one drag session is live. Internal drags reorder items of one
//! provider in place and may end by dragging the item off the dock; external
//! drags carry a payload that is offered to the hovered item, its provider
//! and finally the default provider.

use std::collections::HashMap;
use std::time::Instant;

use crate::geometry::Point;
use crate::items::{DockItem, DropPayload, ItemId, ProviderId};
use crate::layout::DrawValue;
use crate::provider::ProviderList;

/// Pointer travel before a press over an item becomes a drag
pub const DRAG_THRESHOLD_PIXELS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Internal,
    External,
}

/// Image shown under the pointer during an internal drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragIcon {
    pub size: f32,
    pub zoom: f32,
    /// Pointer position relative to the icon center
    pub grab_offset: Point,
}

/// A live drag
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: DragKind,
    pub dragged_item: Option<ItemId>,
    pub provider: Option<ProviderId>,
    pub original_positions: HashMap<ItemId, usize>,
    pub payload: Option<DropPayload>,
    pub drag_icon: Option<DragIcon>,
    pub started_at: Instant,
    /// Hovered item last seen by the session
    hovered: Option<ItemId>,
}

/// Where an external payload went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Item(ItemId),
    Provider(ProviderId),
}

/// Result of ending a drag
#[derive(Debug)]
pub enum DragOutcome {
    /// Positions were restored
    Cancelled,
    /// The internal drag ended over the dock; the reorder stands
    Reordered,
    /// The item was dragged off the dock and removed
    Removed(DockItem),
    /// An external payload was accepted
    Dropped(DropTarget),
    /// Nothing took the payload, or the session did not apply
    Ignored,
}

/// Tracks the drag session
#[derive(Debug, Clone, Default)]
pub struct DockDragTracker {
    session: Option<DragSession>,
}

impl DockDragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_internal(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.kind == DragKind::Internal)
    }

    pub fn is_external(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.kind == DragKind::External)
    }

    pub fn dragged_item(&self) -> Option<ItemId> {
        self.session.as_ref().and_then(|s| s.dragged_item)
    }

    /// Start dragging `item` off the dock
    ///
    /// Snapshots the positions of every sibling for rollback. Returns false
    /// if a session is already live or the item is unknown.
    pub fn begin_internal(
        &mut self,
        item: ItemId,
        providers: &ProviderList,
        draw: Option<&DrawValue>,
        pointer: Point,
        now: Instant,
    ) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(provider) = providers.owner_of(item) else {
            return false;
        };

        let drag_icon = draw.map(|value| DragIcon {
            size: value.bounds.width.max(value.bounds.height),
            zoom: value.zoom,
            grab_offset: Point::new(pointer.x - value.center.x, pointer.y - value.center.y),
        });

        tracing::debug!(item = item.0, provider = %provider.name, "internal drag started");
        self.session = Some(DragSession {
            kind: DragKind::Internal,
            dragged_item: Some(item),
            provider: Some(provider.id),
            original_positions: provider.positions(),
            payload: None,
            drag_icon,
            started_at: now,
            hovered: Some(item),
        });
        true
    }

    /// A foreign drag entered the dock
    pub fn begin_external(&mut self, payload: DropPayload, now: Instant) -> bool {
        if self.session.is_some() {
            return false;
        }
        tracing::debug!(uris = payload.uris.len(), "external drag entered");
        self.session = Some(DragSession {
            kind: DragKind::External,
            dragged_item: None,
            provider: None,
            original_positions: HashMap::new(),
            payload: Some(payload),
            drag_icon: None,
            started_at: now,
            hovered: None,
        });
        true
    }

    /// Live reorder when the hovered item changes during an internal drag
    ///
    /// Returns true if positions changed.
    pub fn hovered_changed(&mut self, hovered: Option<ItemId>, providers: &mut ProviderList, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.hovered == hovered {
            return false;
        }
        session.hovered = hovered;

        let (Some(dragged), Some(target), Some(provider_id)) = (session.dragged_item, hovered, session.provider) else {
            return false;
        };
        if session.kind != DragKind::Internal || target == dragged {
            return false;
        }
        let Some(provider) = providers.get_mut(provider_id) else {
            return false;
        };
        let Some(slot) = provider.item(target).map(|item| item.position) else {
            return false;
        };

        let moved = provider.move_item(dragged, slot, now);
        if moved {
            tracing::debug!(item = dragged.0, slot, "drag reorder");
        }
        moved
    }

    /// Whether the external payload would be accepted where the pointer is
    pub fn external_accepted(&self, hovered: Option<ItemId>, providers: &ProviderList, default_provider: Option<ProviderId>) -> bool {
        let Some(payload) = self.session.as_ref().and_then(|s| s.payload.as_ref()) else {
            return false;
        };
        drop_candidates(hovered, providers, default_provider)
            .into_iter()
            .any(|target| can_accept(target, payload, providers))
    }

    /// Offer the external payload: hovered item, its provider, default provider
    pub fn drop_external(
        &mut self,
        hovered: Option<ItemId>,
        providers: &mut ProviderList,
        default_provider: Option<ProviderId>,
    ) -> DragOutcome {
        let Some(session) = self.take_external() else {
            return DragOutcome::Ignored;
        };
        let Some(payload) = session.payload else {
            return DragOutcome::Ignored;
        };

        for target in drop_candidates(hovered, providers, default_provider) {
            if !can_accept(target, &payload, providers) {
                continue;
            }
            let accepted = match target {
                DropTarget::Item(id) => providers
                    .item_mut(id)
                    .and_then(|item| item.capabilities.drop.as_mut())
                    .map(|handler| handler.accept(&payload)),
                DropTarget::Provider(id) => providers.get_mut(id).map(|p| p.accept_drop(&payload)),
            };
            match accepted {
                Some(Ok(true)) => {
                    tracing::debug!(?target, "external drop accepted");
                    return DragOutcome::Dropped(target);
                }
                Some(Ok(false)) | None => {}
                Some(Err(e)) => tracing::warn!(?target, "Drop handler failed: {:#}", e),
            }
        }

        tracing::debug!("external drop ignored");
        DragOutcome::Ignored
    }

    /// The foreign drag left without dropping
    pub fn leave_external(&mut self) -> bool {
        self.take_external().is_some()
    }

    /// Abort the drag, restoring every snapshotted position
    pub fn cancel(&mut self, providers: &mut ProviderList, now: Instant) -> DragOutcome {
        let Some(session) = self.session.take() else {
            return DragOutcome::Ignored;
        };
        if let Some(provider) = session.provider.and_then(|id| providers.get_mut(id)) {
            provider.restore_positions(&session.original_positions, now);
        }
        tracing::debug!(kind = ?session.kind, "drag cancelled");
        DragOutcome::Cancelled
    }

    /// Finish an internal drag
    ///
    /// Dropped outside the dock, the item is removed if its provider allows
    /// it; otherwise the reorder stands.
    pub fn finish_internal(&mut self, pointer_in_dock: bool, providers: &mut ProviderList) -> DragOutcome {
        if !self.is_internal() {
            return DragOutcome::Ignored;
        }
        let Some(session) = self.session.take() else {
            return DragOutcome::Ignored;
        };
        let (Some(item), Some(provider_id)) = (session.dragged_item, session.provider) else {
            return DragOutcome::Ignored;
        };

        if !pointer_in_dock {
            if let Some(provider) = providers.get_mut(provider_id) {
                if provider.can_remove(item) {
                    if let Some((removed, _)) = provider.remove_item(item) {
                        tracing::debug!(item = item.0, "item dragged off the dock");
                        return DragOutcome::Removed(removed);
                    }
                }
            }
        }
        DragOutcome::Reordered
    }

    /// A sibling of the dragged item left its provider
    ///
    /// The rollback snapshot forgets it and the remaining slots close up,
    /// keeping their order, so a later cancel still yields `0..n`.
    pub fn item_removed(&mut self, id: ItemId) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(removed_slot) = session.original_positions.remove(&id) else {
            return false;
        };
        for slot in session.original_positions.values_mut() {
            if *slot > removed_slot {
                *slot -= 1;
            }
        }
        tracing::debug!(item = id.0, "removed item dropped from drag snapshot");
        true
    }

    /// Drop the session without touching positions
    pub fn clear(&mut self) {
        self.session = None;
    }

    fn take_external(&mut self) -> Option<DragSession> {
        if self.is_external() {
            self.session.take()
        } else {
            None
        }
    }
}

fn drop_candidates(hovered: Option<ItemId>, providers: &ProviderList, default_provider: Option<ProviderId>) -> Vec<DropTarget> {
    let mut targets = Vec::with_capacity(3);
    if let Some(item) = hovered {
        targets.push(DropTarget::Item(item));
        if let Some(owner) = providers.owner_of(item) {
            targets.push(DropTarget::Provider(owner.id));
        }
    }
    if let Some(default) = default_provider {
        if !targets.contains(&DropTarget::Provider(default)) {
            targets.push(DropTarget::Provider(default));
        }
    }
    targets
}

/// Ask one target; handler errors count as a rejection
fn can_accept(target: DropTarget, payload: &DropPayload, providers: &ProviderList) -> bool {
    let answer = match target {
        DropTarget::Item(id) => providers.item(id).map(|item| item.can_accept_drop(payload)),
        DropTarget::Provider(id) => providers.get(id).map(|p| p.can_accept_drop(payload)),
    };
    match answer {
        Some(Ok(accepts)) => accepts,
        Some(Err(e)) => {
            tracing::warn!(?target, "Drop predicate failed: {:#}", e);
            false
        }
        None => false,
    }
}
