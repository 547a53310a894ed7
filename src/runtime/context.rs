//! The running script as seen from outside the interpreter loop

use crate::types::state::GameState;
use std::path::{Path, PathBuf};

/// Narrow view of a run handed to the debug console and the pause menu
pub trait DebugSession {
    fn script_path(&self) -> &Path;

    /// 0-based index of the line being executed
    fn current_line(&self) -> usize;

    fn line_count(&self) -> usize;

    fn state(&self) -> &GameState;

    fn state_mut(&mut self) -> &mut GameState;
}

/// Script path, cursor and state of one run.
///
/// The runner updates `cursor` before every line, so anything reading the
/// context (a save from the pause menu, the debug console) sees the line
/// about to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    pub script_path: PathBuf,
    pub cursor: usize,
    pub line_count: usize,
    pub state: GameState,
}

impl ExecutionContext {
    pub fn new(script_path: impl Into<PathBuf>, line_count: usize, state: GameState) -> Self {
        Self {
            script_path: script_path.into(),
            cursor: 0,
            line_count,
            state,
        }
    }

    pub fn at(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }
}

impl DebugSession for ExecutionContext {
    fn script_path(&self) -> &Path {
        &self.script_path
    }

    fn current_line(&self) -> usize {
        self.cursor
    }

    fn line_count(&self) -> usize {
        self.line_count
    }

    fn state(&self) -> &GameState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}
