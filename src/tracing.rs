//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging hover,
//! autohide and drag state transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=message=debug,dock=debug` - scoped filtering
//! - `RUST_LOG=dockline::autohide=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/dockline/logs/dockline.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::DockModel;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes
/// to `~/.config/dockline/logs/dockline.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console goes to stderr so frame dumps on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "dockline.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of dock state for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub hovered: Option<u64>,
    pub hidden: bool,
    pub dock_hovered: bool,
    pub window_intersects: bool,
    pub dragging: bool,
    pub items: usize,
}

impl StateSnapshot {
    pub fn from_model(model: &DockModel) -> Self {
        Self {
            hovered: model.hovered.map(|id| id.0),
            hidden: model.autohide.hidden(),
            dock_hovered: model.autohide.dock_hovered(),
            window_intersects: model.autohide.window_intersects(),
            dragging: model.drag.is_active(),
            items: model.providers.item_count(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &StateSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.hovered != other.hovered {
            changes.push(format!("hovered: {:?} → {:?}", self.hovered, other.hovered));
        }
        if self.hidden != other.hidden {
            changes.push(format!("hidden: {} → {}", self.hidden, other.hidden));
        }
        if self.dock_hovered != other.dock_hovered {
            changes.push(format!(
                "dock hovered: {} → {}",
                self.dock_hovered, other.dock_hovered
            ));
        }
        if self.window_intersects != other.window_intersects {
            changes.push(format!(
                "intersects: {} → {}",
                self.window_intersects, other.window_intersects
            ));
        }
        if self.dragging != other.dragging {
            let status = if other.dragging { "started" } else { "ended" };
            changes.push(format!("drag {}", status));
        }
        if self.items != other.items {
            changes.push(format!("items: {} → {}", self.items, other.items));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
