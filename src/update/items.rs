//! Item message handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::ItemMsg;
use crate::model::DockModel;

use super::drag::cancel_drag_resolution;
use super::frame::refresh;

/// Handle provider and item changes
pub fn update_items(model: &mut DockModel, msg: ItemMsg, now: Instant) -> Option<Cmd> {
    match msg {
        ItemMsg::Add { provider, item } => {
            let Some(target) = model.providers.get_mut(provider) else {
                tracing::warn!(provider = provider.0, item = item.id.0, "Add to unknown provider ignored");
                return None;
            };
            let changed = target.add_item(item, now);
            tracing::debug!(?changed, "items changed");
            model.autohide.schedule_recheck(&mut model.scheduler, now);
            refresh(model, now)
        }

        ItemMsg::Remove(id) => {
            if model.drag.dragged_item() == Some(id) {
                model.drag.clear();
                cancel_drag_resolution(model, now);
            } else {
                model.drag.item_removed(id);
            }
            model.record_removal(id, now);
            let provider = model.providers.owner_of_mut(id)?;
            let (_, changed) = provider.remove_item(id)?;
            tracing::debug!(?changed, "items changed");
            model.autohide.schedule_recheck(&mut model.scheduler, now);
            refresh(model, now)
        }

        ItemMsg::SetState { item, flags, on } => {
            let target = model.providers.item_mut(item)?;
            if !target.set_state(flags, on, now) {
                return None;
            }
            tracing::debug!(item = item.0, ?flags, on, "item state changed");
            refresh(model, now)
        }
    }
}
