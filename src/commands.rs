//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

/// Side effects for the runtime to perform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Present the current frame
    Redraw,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
    /// Request application exit
    Quit,
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            // Quit doesn't need redraw - app is exiting
            Cmd::Quit => false,
        }
    }

    /// Check if this command asks the runtime to exit
    pub fn is_quit(&self) -> bool {
        match self {
            Cmd::Quit => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.is_quit()),
            _ => false,
        }
    }

    /// Merge two optional commands into one
    pub fn merge(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(Cmd::None), b) => b,
            (a, Some(Cmd::None)) => a,
            (Some(Cmd::Batch(mut cmds)), Some(b)) => {
                cmds.push(b);
                Some(Cmd::Batch(cmds))
            }
            (Some(a), Some(b)) => Some(Cmd::Batch(vec![a, b])),
        }
    }
}
