//! Script folder menu
//!
//! Every folder `<novel_dir>/<name>/` holding `<name>.pgn` is a game. The
//! menu shows each with its ending progress and save state.

use super::play_script;
use super::terminal::prompt;
use crate::config::EngineConfig;
use crate::storage::{self, SaveInfo, endings};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// One playable script folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelEntry {
    pub name: String,
    pub script: PathBuf,
    pub endings_collected: usize,
    pub endings_total: usize,
    pub save: SaveInfo,
}

impl NovelEntry {
    fn label(&self) -> String {
        let save = match &self.save {
            SaveInfo::NoSave => "no save".to_string(),
            SaveInfo::Saved { time } => format!("saved {time}"),
            SaveInfo::NoTimestamp => "saved".to_string(),
            SaveInfo::Unreadable => "save unreadable".to_string(),
        };
        format!(
            "{}  [endings {}/{}] [{save}]",
            self.name, self.endings_collected, self.endings_total
        )
    }
}

/// Script folders under `novel_dir`, sorted by name
pub fn discover(novel_dir: &Path, slot: &str) -> Vec<NovelEntry> {
    let Ok(entries) = std::fs::read_dir(novel_dir) else {
        log::warn!("cannot read {}", novel_dir.display());
        return Vec::new();
    };

    let mut found: Vec<NovelEntry> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let folder = entry.path();
            let script = folder.join(format!("{name}.pgn"));
            if !script.is_file() {
                log::debug!("skipping {}: no {name}.pgn", folder.display());
                return None;
            }
            let (endings_collected, endings_total) = endings::ending_stats(&folder);
            Some(NovelEntry {
                name,
                save: storage::save_info(&script, slot),
                script,
                endings_collected,
                endings_total,
            })
        })
        .collect();

    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// What to do with a game that has a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    Continue,
    NewGame,
    DeleteSave,
    Back,
}

impl SaveAction {
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer {
            "1" => Some(Self::Continue),
            "2" => Some(Self::NewGame),
            "3" => Some(Self::DeleteSave),
            "4" | "" => Some(Self::Back),
            _ => None,
        }
    }
}

/// Interactive menu loop; returns when the player quits
pub fn run(config: &EngineConfig) -> anyhow::Result<()> {
    loop {
        let games = discover(&config.novel_dir, &config.save_slot);
        println!();
        println!("{}", "=== PGN ===".bold());
        if games.is_empty() {
            println!(
                "No scripts found. Put them in {}/<name>/<name>.pgn",
                config.novel_dir.display()
            );
            return Ok(());
        }
        for (index, game) in games.iter().enumerate() {
            println!("{}. {}", index + 1, game.label());
        }
        println!("q. Quit");

        let Some(answer) = prompt("Select:") else {
            return Ok(());
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(());
        }
        let Some(game) = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| games.get(i))
        else {
            println!("Invalid choice.");
            continue;
        };

        if matches!(game.save, SaveInfo::NoSave) {
            play_script(config, &game.script, false)?;
            continue;
        }

        println!("1. Continue  2. New game  3. Delete save  4. Back");
        let action = prompt("Select (1-4):").and_then(|a| SaveAction::from_answer(&a));
        match action {
            Some(SaveAction::Continue) => {
                play_script(config, &game.script, true)?;
            }
            Some(SaveAction::NewGame) => {
                play_script(config, &game.script, false)?;
            }
            Some(SaveAction::DeleteSave) => {
                storage::delete_save(&game.script, &config.save_slot)?;
                println!("{}", "Save deleted.".green());
            }
            Some(SaveAction::Back) => {}
            None => println!("Invalid choice."),
        }
    }
}
