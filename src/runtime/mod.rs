//! Runtime module - winit/platform integration
//!
//! This module contains platform-specific code for running the preview:
//! - `app` - ApplicationHandler and window management
//! - `render` - softbuffer drawing of published frames

pub mod app;
pub mod render;

pub use app::{preview_model, App};
