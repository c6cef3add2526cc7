//! App message handlers (screen changes, preferences, shutdown)

use std::time::Instant;

use crate::commands::Cmd;
use crate::config::DockConfig;
use crate::messages::AppMsg;
use crate::model::DockModel;

use super::frame::refresh;

/// Handle app messages
pub fn update_app(model: &mut DockModel, msg: AppMsg, now: Instant) -> Option<Cmd> {
    match msg {
        AppMsg::ScreenChanged(screen) => {
            if model.screen == screen {
                return None;
            }
            tracing::debug!(?screen, "screen geometry changed");
            model.screen = screen;
            model.autohide.schedule_recheck(&mut model.scheduler, now);
            refresh(model, now)
        }

        AppMsg::PreferencesChanged(config) => apply_preferences(model, *config, now),

        AppMsg::Quit => {
            model.dispose();
            Some(Cmd::Quit)
        }
    }
}

fn apply_preferences(model: &mut DockModel, config: DockConfig, now: Instant) -> Option<Cmd> {
    let config = config.sanitized();
    if config == model.config {
        return None;
    }
    tracing::info!(
        edge = ?config.edge,
        icon_size = config.icon_size,
        autohide = ?config.autohide,
        "preferences changed"
    );

    model.autohide.set_unhide_delay(config.unhide_delay());
    let behavior = config.autohide;
    model.config = config;
    model.autohide.set_behavior(behavior, &mut model.scheduler, now);

    // Footprint may have moved; recheck overlap once the layout settles
    model.autohide.schedule_recheck(&mut model.scheduler, now);
    refresh(model, now)
}
