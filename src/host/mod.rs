//! Collaborators the interpreter talks to
//!
//! The engine never draws to a terminal, runs a process or opens a file for
//! display on its own. Those effects go through the traits here, so the
//! same interpreter runs in the terminal player and in tests.

use crate::error::{Diagnostic, EngineError};
use crate::runtime::context::DebugSession;
use crate::types::command::TextColor;
use crate::types::signal::Interrupt;
use std::path::Path;

pub mod plugin;
pub mod scripted;
pub mod viewer;

pub use plugin::{DirectoryPluginHost, PluginError};
pub use scripted::{MemoryEndingStore, MemoryFileViewer, MemoryPluginHost, ScriptedPresentation};
pub use viewer::SafeFileViewer;

/// Text output and player input
pub trait Presentation {
    /// Show a line of text. `seconds` is a pacing hint.
    fn display(&mut self, text: &str, color: TextColor, seconds: f64);

    /// Offer a choice; returns the 0-based index picked
    fn present_choice(&mut self, options: &[String]) -> usize;

    /// Read one line of text input
    fn read_line(&mut self, prompt: &str) -> String;

    /// Called after text has been shown. The pause menu and the debug console
    /// live behind this; `session` is the running script as seen by them.
    fn interrupt_check(&mut self, session: &mut dyn DebugSession) -> Interrupt;

    /// Show a message and block until the player acknowledges it
    fn acknowledge(&mut self, message: &str);

    fn clear(&mut self);

    /// Report a script error. Execution continues afterwards unless the caller decides otherwise.
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// Plugin lookup and execution
pub trait PluginHost {
    /// False when there is no plugin directory at all
    fn plugins_available(&self) -> bool;

    fn plugin_exists(&self, name: &str) -> bool;

    fn plugin_version(&self, name: &str) -> Option<String>;

    /// Run a plugin with already-templated arguments; returns its exit code
    fn run_plugin(&mut self, name: &str, args: &[String]) -> Result<i32, PluginError>;
}

/// Opens files for the player to look at
pub trait FileViewer {
    /// Returns false when the file is missing or refused
    fn open_safely(&mut self, path: &Path) -> bool;
}

/// Persistent record of the endings reached for one script folder
pub trait EndingStore {
    /// Record an ending; returns true when it was not recorded before
    fn record(&mut self, name: &str) -> Result<bool, EngineError>;

    fn collected(&self) -> Result<Vec<String>, EngineError>;
}

/// Everything the interpreter needs from the outside, borrowed for one run
pub struct Host<'a> {
    pub presentation: &'a mut dyn Presentation,
    pub plugins: &'a mut dyn PluginHost,
    pub viewer: &'a mut dyn FileViewer,
    pub endings: &'a mut dyn EndingStore,
}

impl<'a> Host<'a> {
    pub fn new(
        presentation: &'a mut dyn Presentation,
        plugins: &'a mut dyn PluginHost,
        viewer: &'a mut dyn FileViewer,
        endings: &'a mut dyn EndingStore,
    ) -> Self {
        Self {
            presentation,
            plugins,
            viewer,
            endings,
        }
    }
}
