//! Terminal front end: the player, the script folder menu and the wiring
//! between the engine and the real collaborators.

pub mod menu;
pub mod terminal;

use crate::config::EngineConfig;
use crate::host::{DirectoryPluginHost, Host, SafeFileViewer};
use crate::runtime::{RunOutcome, ScriptRunner, StartMode};
use crate::storage::{self, endings::FileEndingStore};
use colored::Colorize;
use std::path::Path;
use terminal::TerminalPresentation;

/// Play one script in the terminal, resuming from the configured slot when
/// `resume` is set and a save exists
pub fn play_script(config: &EngineConfig, script: &Path, resume: bool) -> anyhow::Result<RunOutcome> {
    let folder = script.parent().unwrap_or_else(|| Path::new(""));

    let mut presentation = TerminalPresentation::new(config.debug_console);
    let mut plugins = DirectoryPluginHost::new(&config.plugins_dir);
    let mut viewer = SafeFileViewer::new(config.max_view_size);
    let mut endings = FileEndingStore::new(folder);
    let host = Host::new(&mut presentation, &mut plugins, &mut viewer, &mut endings);
    let mut runner = ScriptRunner::new(config, host);

    let save = storage::save_path(script, &config.save_slot);
    let outcome = if resume && save.is_file() {
        runner.resume(&save)?
    } else {
        if resume {
            log::info!("no save in slot {}, starting fresh", config.save_slot);
        }
        runner.run_file(script, StartMode::Fresh)?
    };

    match &outcome {
        RunOutcome::Saved(path) => println!("{} {}", "Saved to".green(), path.display()),
        RunOutcome::ReturnToMenu => println!("{}", "A required plugin is missing.".yellow()),
        RunOutcome::Finished | RunOutcome::Exited => {}
    }
    Ok(outcome)
}
