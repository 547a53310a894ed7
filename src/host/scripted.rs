//! In-memory collaborators
//!
//! Drive a run without a terminal, a plugin folder or a disk: player input
//! is queued up front and everything the engine shows is recorded.

use super::{EndingStore, FileViewer, PluginError, PluginHost, Presentation};
use crate::error::{Diagnostic, EngineError};
use crate::runtime::context::DebugSession;
use crate::runtime::debug::{self, DebugReply};
use crate::types::command::TextColor;
use crate::types::signal::Interrupt;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// A line of text as it was displayed
#[derive(Debug, Clone, PartialEq)]
pub struct Displayed {
    pub text: String,
    pub color: TextColor,
    pub seconds: f64,
}

/// Presentation fed from queues.
///
/// An empty choice queue picks the first option, an empty input queue reads
/// an empty line and an empty interrupt queue never interrupts.
#[derive(Debug, Default)]
pub struct ScriptedPresentation {
    choices: VecDeque<usize>,
    inputs: VecDeque<String>,
    interrupts: VecDeque<Interrupt>,
    console: VecDeque<String>,
    pub transcript: Vec<Displayed>,
    pub offered: Vec<Vec<String>>,
    pub prompts: Vec<String>,
    pub acknowledged: Vec<String>,
    pub console_output: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub clears: usize,
}

impl ScriptedPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn with_inputs<S: Into<String>>(mut self, inputs: impl IntoIterator<Item = S>) -> Self {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    /// Answers for successive interrupt checks
    pub fn with_interrupts(mut self, interrupts: impl IntoIterator<Item = Interrupt>) -> Self {
        self.interrupts.extend(interrupts);
        self
    }

    /// Debug console commands, run at the next interrupt check until one of
    /// them leaves the console
    pub fn with_console<S: Into<String>>(mut self, commands: impl IntoIterator<Item = S>) -> Self {
        self.console.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Displayed texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.transcript.iter().map(|d| d.text.as_str()).collect()
    }

    fn run_console(&mut self, session: &mut dyn DebugSession) -> Interrupt {
        while let Some(command) = self.console.pop_front() {
            match debug::execute(&command, session) {
                DebugReply::Output(text) => self.console_output.push(text),
                DebugReply::Jump(index) => return Interrupt::DebugJump(index),
                DebugReply::Exit => return Interrupt::None,
            }
        }
        Interrupt::None
    }
}

impl Presentation for ScriptedPresentation {
    fn display(&mut self, text: &str, color: TextColor, seconds: f64) {
        self.transcript.push(Displayed {
            text: text.to_string(),
            color,
            seconds,
        });
    }

    fn present_choice(&mut self, options: &[String]) -> usize {
        self.offered.push(options.to_vec());
        self.choices.pop_front().unwrap_or(0)
    }

    fn read_line(&mut self, prompt: &str) -> String {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().unwrap_or_default()
    }

    fn interrupt_check(&mut self, session: &mut dyn DebugSession) -> Interrupt {
        if !self.console.is_empty() {
            return self.run_console(session);
        }
        self.interrupts.pop_front().unwrap_or_default()
    }

    fn acknowledge(&mut self, message: &str) {
        self.acknowledged.push(message.to_string());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPlugin {
    pub version: Option<String>,
    pub exit_code: i32,
}

/// Plugin host with a fixed set of plugins that records every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPluginHost {
    available: bool,
    plugins: HashMap<String, MemoryPlugin>,
    /// `(name, expanded args)` of every run
    pub runs: Vec<(String, Vec<String>)>,
}

impl Default for MemoryPluginHost {
    fn default() -> Self {
        Self {
            available: true,
            plugins: HashMap::new(),
            runs: Vec::new(),
        }
    }
}

impl MemoryPluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// No plugin directory at all
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn with_plugin(mut self, name: &str, version: Option<&str>, exit_code: i32) -> Self {
        self.plugins.insert(
            name.to_string(),
            MemoryPlugin {
                version: version.map(str::to_string),
                exit_code,
            },
        );
        self
    }
}

impl PluginHost for MemoryPluginHost {
    fn plugins_available(&self) -> bool {
        self.available
    }

    fn plugin_exists(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    fn plugin_version(&self, name: &str) -> Option<String> {
        self.plugins.get(name).and_then(|p| p.version.clone())
    }

    fn run_plugin(&mut self, name: &str, args: &[String]) -> Result<i32, PluginError> {
        let plugin = self.plugins.get(name).ok_or_else(|| PluginError::Missing {
            name: name.to_string(),
        })?;
        self.runs.push((name.to_string(), args.to_vec()));
        Ok(plugin.exit_code)
    }
}

/// Viewer that accepts every file and remembers what it was asked to open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFileViewer {
    pub refuse: bool,
    pub opened: Vec<PathBuf>,
}

impl MemoryFileViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileViewer for MemoryFileViewer {
    fn open_safely(&mut self, path: &Path) -> bool {
        self.opened.push(path.to_path_buf());
        !self.refuse
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEndingStore {
    pub endings: Vec<String>,
}

impl MemoryEndingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endings<S: Into<String>>(endings: impl IntoIterator<Item = S>) -> Self {
        Self {
            endings: endings.into_iter().map(Into::into).collect(),
        }
    }
}

impl EndingStore for MemoryEndingStore {
    fn record(&mut self, name: &str) -> Result<bool, EngineError> {
        if self.endings.iter().any(|e| e == name) {
            return Ok(false);
        }
        self.endings.push(name.to_string());
        Ok(true)
    }

    fn collected(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.endings.clone())
    }
}
