//! Autohide message handlers

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::AutohideMsg;
use crate::model::DockModel;

use super::frame::{recheck_windows, refresh};

/// Handle autohide inputs
pub fn update_autohide(model: &mut DockModel, msg: AutohideMsg, now: Instant) -> Option<Cmd> {
    match msg {
        AutohideMsg::GeometryChanged | AutohideMsg::ActiveWindowChanged => {
            model.autohide.schedule_recheck(&mut model.scheduler, now);
            None
        }

        AutohideMsg::ConfigMode(enabled) => {
            model.autohide.set_config_mode(enabled, &mut model.scheduler, now);
            refresh(model, now)
        }

        AutohideMsg::StartupComplete => {
            recheck_windows(model, now);
            if !model.autohide.finish_startup(&mut model.scheduler, now) {
                tracing::debug!("startup complete, dock stays hidden");
            }
            refresh(model, now)
        }
    }
}

/// The coalesced recheck timer fired
pub fn geometry_recheck(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    if !model.autohide.take_recheck() {
        return None;
    }
    recheck_windows(model, now);
    refresh(model, now)
}

/// The unhide delay elapsed
pub fn unhide_delay_elapsed(model: &mut DockModel, now: Instant) -> Option<Cmd> {
    model.autohide.unhide_delay_elapsed(&mut model.scheduler, now);
    refresh(model, now)
}
