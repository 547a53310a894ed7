//! Line interpreter
//!
//! Executes one script line against the run context and answers with a
//! [`Signal`] telling the runner where to go next. Script mistakes are
//! reported through the presentation and never escape this module.

use crate::condition;
use crate::config::EngineConfig;
use crate::error::{Diagnostic, ScriptError};
use crate::host::Host;
use crate::host::plugin::{PluginError, TemplateContext, expand_args, version_satisfies};
use crate::parser;
use crate::types::command::{ChoiceOption, Command, SayArgs, SetOp, TextColor};
use crate::types::script::Script;
use crate::types::signal::{Interrupt, Signal};
use crate::types::state::GameState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

pub mod context;
pub mod debug;
pub mod runner;


pub use context::{DebugSession, ExecutionContext};
pub use runner::{RunOutcome, ScriptRunner, StartMode};

/// Dispatches script lines to their handlers
pub struct LineInterpreter<'h> {
    config: EngineConfig,
    host: Host<'h>,
    rng: StdRng,
}

impl<'h> LineInterpreter<'h> {
    pub fn new(config: &EngineConfig, host: Host<'h>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config: config.clone(),
            host,
            rng,
        }
    }

    pub fn host(&mut self) -> &mut Host<'h> {
        &mut self.host
    }

    /// Execute the line at `ctx.cursor`
    pub fn execute(&mut self, ctx: &mut ExecutionContext, script: &Script) -> Signal {
        let cursor = ctx.cursor;
        let Some(line) = script.line(cursor) else {
            log::warn!("[Engine] cursor {cursor} is past the end of the script");
            return Signal::TerminateNoSave;
        };
        log::trace!("[Engine] line {}: {line}", cursor + 1);

        let result = parser::parse_line(line).and_then(|command| {
            log::debug!("[Engine] line {} -> {command:?}", cursor + 1);
            self.dispatch(command, ctx, script)
        });

        match result {
            Ok(signal) => signal,
            Err(error) => {
                self.report(cursor, line, error);
                Signal::Continue(cursor + 1)
            }
        }
    }

    fn report(&mut self, cursor: usize, line: &str, error: ScriptError) {
        let diagnostic = Diagnostic::new(cursor, line, error);
        log::warn!("[Script] {diagnostic}");
        self.host.presentation.report(&diagnostic);
    }

    fn dispatch(
        &mut self,
        command: Command,
        ctx: &mut ExecutionContext,
        script: &Script,
    ) -> Result<Signal, ScriptError> {
        let next = ctx.cursor + 1;

        match command {
            Command::Empty | Command::Comment | Command::Label { .. } => Ok(Signal::Continue(next)),
            Command::End => {
                log::info!("[Flow] end of story at line {next}");
                self.host.presentation.acknowledge("The End");
                Ok(Signal::TerminateNoSave)
            }
            Command::EndName { name } => {
                self.reach_ending(ctx, &name);
                Ok(Signal::Continue(next))
            }
            Command::Wait { millis } => {
                log::debug!("[Flow] waiting {millis}ms");
                std::thread::sleep(Duration::from_millis(millis));
                Ok(Signal::Continue(next))
            }
            Command::Say(SayArgs {
                text,
                color,
                seconds,
            }) => {
                let text = ctx.state.interpolate(&text);
                Ok(self.show_text(ctx, &text, color, seconds))
            }
            Command::SayVar {
                name,
                color,
                seconds,
            } => {
                let text = ctx.state.get_int(&name).to_string();
                Ok(self.show_text(ctx, &text, color, seconds))
            }
            Command::Input { prompt, var } => {
                let value = self.host.presentation.read_line(&prompt);
                log::debug!("[Variables] {var} = {value:?} (input)");
                ctx.state.set_string(&var, value);
                Ok(Signal::Continue(next))
            }
            Command::Show { file } => {
                let path = script.folder().join(&self.config.archive_dir).join(&file);
                if !self.host.viewer.open_safely(&path) {
                    log::warn!("[Resources] could not show {}", path.display());
                }
                Ok(Signal::Continue(next))
            }
            Command::Choose { options } => Ok(self.choose(ctx, script, &options)),
            Command::Clear => {
                self.host.presentation.clear();
                Ok(Signal::Continue(next))
            }
            Command::Random { var, min, max } => {
                let (low, high) = if min > max { (max, min) } else { (min, max) };
                let value = self.rng.random_range(low..=high);
                log::debug!("[Variables] {var} = {value} (random {low}..={high})");
                ctx.state.set_int(&var, value);
                Ok(Signal::Continue(next))
            }
            Command::Set { var, op, value } => {
                apply_set(&mut ctx.state, &var, op, value);
                log::debug!("[Variables] {var} = {}", ctx.state.get_int(&var));
                Ok(Signal::Continue(next))
            }
            Command::Jump { target } => {
                let index = script
                    .resolve_index(&target)
                    .ok_or_else(|| ScriptError::invalid_target(&target))?;
                log::debug!("[Flow] jump to line {}", index + 1);
                Ok(Signal::Jump(index))
            }
            Command::If { condition, target } => {
                let tokens = condition::tokenize(&condition);
                if !condition::evaluate(&tokens, &ctx.state) {
                    log::debug!("[Flow] condition '{condition}' is false");
                    return Ok(Signal::Continue(next));
                }
                let index = script
                    .resolve_index(&target)
                    .ok_or_else(|| ScriptError::invalid_target(&target))?;
                log::debug!("[Flow] condition '{condition}' is true, jump to line {}", index + 1);
                Ok(Signal::Jump(index))
            }
            Command::Plugin { name, args } => {
                self.run_plugin(ctx, script, &name, &args)?;
                Ok(Signal::Continue(next))
            }
            Command::Use { name, version } => {
                Ok(self.require_plugin(ctx, script, &name, version.as_deref()))
            }
            Command::Unknown { command } => Err(ScriptError::UnknownCommand { command }),
        }
    }

    /// Display text, then give the player a chance to pause or debug
    fn show_text(
        &mut self,
        ctx: &mut ExecutionContext,
        text: &str,
        color: TextColor,
        seconds: f64,
    ) -> Signal {
        self.host.presentation.display(text, color, seconds);
        match self.host.presentation.interrupt_check(ctx) {
            Interrupt::None => Signal::Continue(ctx.cursor + 1),
            Interrupt::DebugJump(index) => {
                log::info!("[Flow] debug jump to line {}", index + 1);
                Signal::Jump(index)
            }
            Interrupt::SaveExit => Signal::TerminateSave,
            Interrupt::NoSaveExit => Signal::TerminateNoSave,
        }
    }

    fn reach_ending(&mut self, ctx: &mut ExecutionContext, name: &str) {
        ctx.state.add_ending(name);
        match self.host.endings.record(name) {
            Ok(true) => log::info!("[Engine] new ending recorded: {name}"),
            Ok(false) => log::info!("[Engine] ending reached again: {name}"),
            Err(e) => log::error!("[Engine] cannot record ending {name}: {e}"),
        }

        let message = format!(
            "Ending reached: {name}\nEndings collected: {}/{}",
            ctx.state.collected_count(),
            ctx.state.total_count()
        );
        self.host.presentation.acknowledge(&message);
    }

    /// A failed `choose` ends the run: there is no sensible line to continue from
    fn choose(
        &mut self,
        ctx: &mut ExecutionContext,
        script: &Script,
        options: &[ChoiceOption],
    ) -> Signal {
        let cursor = ctx.cursor;
        let line = script.line(cursor).unwrap_or_default();
        let texts: Vec<String> = options.iter().map(|o| o.text.clone()).collect();

        let picked = self.host.presentation.present_choice(&texts);
        let Some(option) = options.get(picked) else {
            let error = ScriptError::InvalidChoice {
                index: picked + 1,
                count: options.len(),
            };
            self.report(cursor, line, error);
            return Signal::TerminateNoSave;
        };

        log::info!("[Flow] choice {}: {}", picked + 1, option.text);
        ctx.state.record_choice(option.text.clone());

        let Some(target) = script.resolve_index(&option.label) else {
            self.report(cursor, line, ScriptError::invalid_target(&option.label));
            return Signal::TerminateNoSave;
        };
        Signal::Jump(target)
    }

    fn template_context<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        script: &'a Script,
    ) -> TemplateContext<'a> {
        TemplateContext {
            script_dir: script.folder(),
            log_file: self
                .config
                .log
                .file
                .as_deref()
                .filter(|_| self.config.log.enabled),
            state: &ctx.state,
        }
    }

    fn run_plugin(
        &mut self,
        ctx: &ExecutionContext,
        script: &Script,
        name: &str,
        args: &str,
    ) -> Result<(), ScriptError> {
        if !self.host.plugins.plugins_available() {
            return Err(PluginError::PluginsUnavailable {
                dir: self.config.plugins_dir.clone(),
            }
            .into());
        }
        if !self.host.plugins.plugin_exists(name) {
            return Err(PluginError::Missing {
                name: name.to_string(),
            }
            .into());
        }

        let args = expand_args(args, &self.template_context(ctx, script));
        match self.host.plugins.run_plugin(name, &args)? {
            0 => Ok(()),
            code => Err(PluginError::Failed {
                name: name.to_string(),
                code,
            }
            .into()),
        }
    }

    /// `use`: only a missing plugin directory stops the run
    fn require_plugin(
        &mut self,
        ctx: &ExecutionContext,
        script: &Script,
        name: &str,
        required: Option<&str>,
    ) -> Signal {
        let cursor = ctx.cursor;
        let line = script.line(cursor).unwrap_or_default();

        if !self.host.plugins.plugins_available() {
            let error = PluginError::PluginsUnavailable {
                dir: self.config.plugins_dir.clone(),
            };
            self.report(cursor, line, error.into());
            return Signal::Abort;
        }

        if !self.host.plugins.plugin_exists(name) {
            let error = PluginError::Missing {
                name: name.to_string(),
            };
            self.report(cursor, line, error.into());
            return Signal::Continue(cursor + 1);
        }

        if let Some(required) = required {
            let installed = self.host.plugins.plugin_version(name);
            let satisfied = installed
                .as_deref()
                .is_some_and(|installed| version_satisfies(installed, required));
            if !satisfied {
                let error = PluginError::VersionMismatch {
                    name: name.to_string(),
                    required: required.to_string(),
                    installed,
                };
                self.report(cursor, line, error.into());
                return Signal::Continue(cursor + 1);
            }
        }

        log::info!("[Engine] plugin {name} available");
        Signal::Continue(cursor + 1)
    }
}

/// `set`: `*=` and `/=` leave an unset variable alone, `/=` also ignores a zero divisor
fn apply_set(state: &mut GameState, var: &str, op: SetOp, value: i64) {
    match op {
        SetOp::Assign => state.set_int(var, value),
        SetOp::Add => state.add_int(var, value),
        SetOp::Subtract => state.add_int(var, value.wrapping_neg()),
        SetOp::Multiply => {
            if state.has_int(var) {
                let current = state.get_int(var);
                state.set_int(var, current.wrapping_mul(value));
            }
        }
        SetOp::Divide => {
            if state.has_int(var) && value != 0 {
                let current = state.get_int(var);
                state.set_int(var, current.wrapping_div(value));
            }
        }
    }
}
