//! Control-flow values passed between the interpreter, the runner and the presentation

use serde::{Deserialize, Serialize};

/// Result of executing one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Advance normally; carries the next 0-based index
    Continue(usize),
    /// Control transferred; carries the resolved 0-based index
    Jump(usize),
    /// The player asked to save and leave
    TerminateSave,
    /// The run ends without saving
    TerminateNoSave,
    /// A hard dependency is missing; go back to the menu
    Abort,
}

/// Answer of the presentation layer's interrupt check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interrupt {
    /// Keep going
    #[default]
    None,
    /// The debug console moved the cursor to this 0-based line
    DebugJump(usize),
    SaveExit,
    NoSaveExit,
}
