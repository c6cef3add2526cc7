//! Command-line argument parsing for the dock
//!
//! Supports:
//! - Overriding preferences for one run (edge, icon size, zoom, autohide)
//! - An alternate preferences file
//! - Headless scenario replay with frame output

use clap::Parser;
use std::path::PathBuf;

use crate::autohide::AutohideBehavior;
use crate::config::ConfigOverrides;
use crate::layout::DockEdge;

/// An animated, auto-hiding application dock
#[derive(Parser, Debug)]
#[command(name = "dockline", version, about = "An animated, auto-hiding application dock")]
pub struct CliArgs {
    /// Preferences file (default: ~/.config/dockline/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Screen edge: top, bottom, left or right
    #[arg(long, value_parser = parse_edge)]
    pub edge: Option<DockEdge>,

    /// Icon size in pixels
    #[arg(long, value_name = "PX")]
    pub icon_size: Option<u32>,

    /// Magnification at the pointer (1.0 disables zoom)
    #[arg(long, value_name = "FACTOR")]
    pub zoom: Option<f32>,

    /// none, autohide, intellihide or universal-intellihide
    #[arg(long, value_parser = parse_autohide)]
    pub autohide: Option<AutohideBehavior>,

    /// Stretch the dock along the whole edge
    #[arg(long)]
    pub panel: bool,

    /// Number of placeholder launchers shown by the preview
    #[arg(long, value_name = "N", default_value_t = 6)]
    pub items: usize,

    /// Replay a YAML scenario headlessly instead of opening a window
    #[arg(long, value_name = "FILE")]
    pub scenario: Option<PathBuf>,

    /// Where scenario frames go (default: stdout)
    #[arg(long, value_name = "FILE", requires = "scenario")]
    pub frames_out: Option<PathBuf>,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq)]
pub enum StartupMode {
    /// Open the live preview window with `items` launchers
    Preview { items: usize },
    /// Replay a scenario file
    Scenario {
        path: PathBuf,
        frames_out: Option<PathBuf>,
    },
}

impl CliArgs {
    /// Preferences the flags override
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            edge: self.edge,
            icon_size: self.icon_size,
            zoom_percent: self.zoom,
            autohide: self.autohide,
            panel_mode: self.panel.then_some(true),
            unhide_delay_ms: None,
        }
    }

    pub fn mode(&self) -> StartupMode {
        match &self.scenario {
            Some(path) => StartupMode::Scenario {
                path: path.clone(),
                frames_out: self.frames_out.clone(),
            },
            None => StartupMode::Preview { items: self.items },
        }
    }
}

fn parse_edge(value: &str) -> Result<DockEdge, String> {
    match value.to_ascii_lowercase().as_str() {
        "top" => Ok(DockEdge::Top),
        "bottom" => Ok(DockEdge::Bottom),
        "left" => Ok(DockEdge::Left),
        "right" => Ok(DockEdge::Right),
        other => Err(format!("unknown edge '{}'", other)),
    }
}

fn parse_autohide(value: &str) -> Result<AutohideBehavior, String> {
    match value.to_ascii_lowercase().replace('_', "-").as_str() {
        "none" | "off" => Ok(AutohideBehavior::None),
        "autohide" => Ok(AutohideBehavior::Autohide),
        "intellihide" => Ok(AutohideBehavior::Intellihide),
        "universal-intellihide" => Ok(AutohideBehavior::UniversalIntellihide),
        other => Err(format!("unknown autohide behavior '{}'", other)),
    }
}
