//! Error types for recoverable faults
//!
//! Faults raised by collaborators (window oracle, item and provider handlers)
//! are reported through [`DockError`], logged, and replaced with a safe
//! default. Wiring bugs are not represented here; they panic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockError {
    /// The window oracle could not enumerate windows
    #[error("window enumeration failed: {0}")]
    WindowQuery(String),

    /// An item or provider callback failed
    #[error("{context} handler failed: {source}")]
    Handler {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A scenario file could not be read or parsed
    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl DockError {
    pub fn handler(context: &'static str, source: anyhow::Error) -> Self {
        DockError::Handler { context, source }
    }
}
