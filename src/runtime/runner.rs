//! Script runner
//!
//! Owns the loop around [`LineInterpreter::execute`]: prepares the game state
//! for a fresh start or a resume, follows the returned signals and turns the
//! final one into a [`RunOutcome`].

use super::LineInterpreter;
use super::context::ExecutionContext;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::host::Host;
use crate::parser;
use crate::storage::{self, SaveRecord};
use crate::types::script::Script;
use crate::types::signal::Signal;
use crate::types::state::GameState;
use std::path::{Path, PathBuf};

/// How a run begins
#[derive(Debug, Clone, PartialEq)]
pub enum StartMode {
    Fresh,
    /// Continue from a save; its state and line replace the fresh ones
    Resume(SaveRecord),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Execution ran past the last line
    Finished,
    /// The player saved and left; carries the save file
    Saved(PathBuf),
    /// `end`, a failed choice or the player leaving without a save
    Exited,
    /// A required dependency is missing
    ReturnToMenu,
}

pub struct ScriptRunner<'h> {
    config: EngineConfig,
    interpreter: LineInterpreter<'h>,
}

impl<'h> ScriptRunner<'h> {
    pub fn new(config: &EngineConfig, host: Host<'h>) -> Self {
        Self {
            config: config.clone(),
            interpreter: LineInterpreter::new(config, host),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a script from disk and run it
    pub fn run_file(
        &mut self,
        path: impl AsRef<Path>,
        mode: StartMode,
    ) -> Result<RunOutcome, EngineError> {
        let script = Script::load(path)?;
        self.run_script(&script, mode)
    }

    /// Resume the script recorded in a save file
    pub fn resume(&mut self, save_path: impl AsRef<Path>) -> Result<RunOutcome, EngineError> {
        let record = storage::load(save_path.as_ref())?;
        let script = Script::load(&record.script_path)?;
        self.run_script(&script, StartMode::Resume(record))
    }

    pub fn run_script(
        &mut self,
        script: &Script,
        mode: StartMode,
    ) -> Result<RunOutcome, EngineError> {
        let (state, cursor) = self.prepare(script, mode)?;
        let mut ctx = ExecutionContext::new(script.path(), script.len(), state).at(cursor);

        loop {
            if ctx.cursor >= script.len() {
                log::info!("[Engine] {} finished", script.path().display());
                self.interpreter
                    .host()
                    .presentation
                    .acknowledge("Script finished");
                return Ok(RunOutcome::Finished);
            }

            match self.interpreter.execute(&mut ctx, script) {
                Signal::Continue(next) | Signal::Jump(next) => ctx.cursor = next,
                Signal::TerminateSave => {
                    let path = storage::save(
                        script.path(),
                        ctx.cursor,
                        &ctx.state,
                        &self.config.save_slot,
                    )?;
                    return Ok(RunOutcome::Saved(path));
                }
                Signal::TerminateNoSave => {
                    log::info!("[Engine] run ended at line {}", ctx.cursor + 1);
                    return Ok(RunOutcome::Exited);
                }
                Signal::Abort => {
                    log::warn!("[Engine] run aborted at line {}", ctx.cursor + 1);
                    return Ok(RunOutcome::ReturnToMenu);
                }
            }
        }
    }

    /// Game state and first line for a run
    fn prepare(
        &mut self,
        script: &Script,
        mode: StartMode,
    ) -> Result<(GameState, usize), EngineError> {
        let (mut state, cursor) = match mode {
            StartMode::Fresh => {
                let mut state = GameState::new();
                for name in self.interpreter.host().endings.collected()? {
                    state.add_ending(&name);
                }
                log::info!("[Engine] starting {}", script.path().display());
                (state, 0)
            }
            StartMode::Resume(record) => {
                log::info!(
                    "[Engine] resuming {} at line {}",
                    script.path().display(),
                    record.cursor + 1
                );
                (record.state, record.cursor)
            }
        };

        for name in parser::declared_endings(script.lines()) {
            state.register_ending(&name);
        }
        for name in state.undeclared_endings() {
            log::warn!("[Engine] collected ending '{name}' is not declared in the script");
        }

        Ok((state, cursor))
    }
}
