//! Dock preferences
//!
//! Stored in `~/.config/dockline/config.yaml`. The engine only reads these
//! values; edits arrive as `AppMsg::PreferencesChanged`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::autohide::AutohideBehavior;
use crate::layout::{DockEdge, ItemAlignment};

pub const MIN_ICON_SIZE: u32 = 16;
pub const MAX_ICON_SIZE: u32 = 256;
pub const MAX_ZOOM_PERCENT: f32 = 4.0;

/// Preferences read by the dock engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Screen edge the dock is attached to
    pub edge: DockEdge,
    /// Natural (un-zoomed) icon size in pixels
    pub icon_size: u32,
    /// Whether icons magnify near the pointer
    pub zoom_enabled: bool,
    /// Magnification at the pointer (1.0 = none, 2.0 = double size)
    pub zoom_percent: f32,
    /// When the dock hides
    pub autohide: AutohideBehavior,
    /// Delay before revealing a hidden dock the pointer touched
    pub unhide_delay_ms: u64,
    /// Stretch the dock along the whole edge
    pub panel_mode: bool,
    /// Item alignment along the edge in panel mode
    pub alignment: ItemAlignment,
    /// Shift along the edge: percent of the free space when centered,
    /// pixels from the aligned end in panel mode
    pub offset: i32,
    /// Disable drag reordering and drag-off removal
    pub lock_items: bool,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            edge: DockEdge::Bottom,
            icon_size: 48,
            zoom_enabled: true,
            zoom_percent: 2.0,
            autohide: AutohideBehavior::Intellihide,
            unhide_delay_ms: 0,
            panel_mode: false,
            alignment: ItemAlignment::Center,
            offset: 0,
            lock_items: false,
        }
    }
}

/// Partial preferences, e.g. from command-line flags
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub edge: Option<DockEdge>,
    pub icon_size: Option<u32>,
    pub zoom_percent: Option<f32>,
    pub autohide: Option<AutohideBehavior>,
    pub panel_mode: Option<bool>,
    pub unhide_delay_ms: Option<u64>,
}

impl DockConfig {
    /// Load config from the default location, or return defaults
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<DockConfig>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.sanitized()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating the parent directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values into their supported ranges
    pub fn sanitized(mut self) -> Self {
        self.icon_size = self.icon_size.clamp(MIN_ICON_SIZE, MAX_ICON_SIZE);
        self.zoom_percent = if self.zoom_percent.is_finite() {
            self.zoom_percent.clamp(1.0, MAX_ZOOM_PERCENT)
        } else {
            1.0
        };
        self.offset = self.offset.clamp(-100, 100);
        self
    }

    /// Apply every override that is set
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut self.edge, &overrides.edge);
        set(&mut self.icon_size, &overrides.icon_size);
        set(&mut self.zoom_percent, &overrides.zoom_percent);
        set(&mut self.autohide, &overrides.autohide);
        set(&mut self.panel_mode, &overrides.panel_mode);
        set(&mut self.unhide_delay_ms, &overrides.unhide_delay_ms);
        *self = self.clone().sanitized();
    }

    /// Magnification actually applied, 1.0 when zoom is disabled
    pub fn effective_zoom_percent(&self) -> f32 {
        if self.zoom_enabled {
            self.zoom_percent.max(1.0)
        } else {
            1.0
        }
    }

    pub fn unhide_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.unhide_delay_ms)
    }
}
