//! Dockline - Elm-style dock engine
//!
//! This crate provides the core types and logic for an animated,
//! auto-hiding application dock: pointer tracking, the magnifying layout,
//! autohide, drag and drop, and the animation scheduler that drives them.

pub mod animation;
pub mod autohide;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod config_watcher;
pub mod cursor;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod items;
pub mod layout;
pub mod messages;
pub mod model;
pub mod provider;
pub mod scenario;
pub mod timer;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::DockConfig;
pub use error::DockError;
pub use messages::Msg;
pub use model::DockModel;
