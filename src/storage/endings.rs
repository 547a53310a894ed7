//! Ending registry
//!
//! Endings reached are remembered per script folder in `data.inf`, under an
//! `[ENDINGS]` section. An older flat `endings.dat` list is still read when
//! present.

use crate::error::EngineError;
use crate::host::EndingStore;
use crate::parser;
use std::path::{Path, PathBuf};

pub const DATA_FILE: &str = "data.inf";
pub const LEGACY_FILE: &str = "endings.dat";
const SECTION_ENDINGS: &str = "[ENDINGS]";

/// File-backed [`EndingStore`] for one script folder
#[derive(Debug, Clone)]
pub struct FileEndingStore {
    folder: PathBuf,
}

impl FileEndingStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn data_path(&self) -> PathBuf {
        self.folder.join(DATA_FILE)
    }

    fn read_lines(path: &Path) -> Result<Vec<String>, EngineError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::save_read(path, e))?;
        Ok(text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect())
    }
}

impl EndingStore for FileEndingStore {
    fn record(&mut self, name: &str) -> Result<bool, EngineError> {
        let path = self.data_path();
        let mut lines = Self::read_lines(&path)?;

        let section = match lines.iter().position(|l| l == SECTION_ENDINGS) {
            Some(index) => index,
            None => {
                lines.push(SECTION_ENDINGS.to_string());
                lines.len() - 1
            }
        };

        let end = lines[section + 1..]
            .iter()
            .position(|l| l.starts_with('['))
            .map_or(lines.len(), |offset| section + 1 + offset);
        if lines[section + 1..end].iter().any(|l| l == name) {
            log::debug!("[Engine] ending already in {}: {name}", path.display());
            return Ok(false);
        }

        lines.insert(end, name.to_string());
        let mut text = lines.join("\n");
        text.push('\n');
        std::fs::write(&path, text).map_err(|e| EngineError::save_write(&path, e))?;
        log::info!("[Engine] ending saved to {}: {name}", path.display());
        Ok(true)
    }

    fn collected(&self) -> Result<Vec<String>, EngineError> {
        let legacy = Self::read_lines(&self.folder.join(LEGACY_FILE))?;
        let legacy: Vec<String> = legacy
            .into_iter()
            .filter(|l| !l.is_empty() && l != SECTION_ENDINGS)
            .collect();
        if !legacy.is_empty() {
            log::debug!("[Engine] read {} endings from {LEGACY_FILE}", legacy.len());
            return Ok(legacy);
        }

        let mut endings = Vec::new();
        let mut in_section = false;
        for line in Self::read_lines(&self.data_path())? {
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_section = line == SECTION_ENDINGS;
                continue;
            }
            if in_section {
                endings.push(line);
            }
        }
        log::debug!("[Engine] read {} endings from {DATA_FILE}", endings.len());
        Ok(endings)
    }
}

/// First `.pgn` file of a folder, by name
pub fn first_script(folder: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(folder).ok()?;
    let mut scripts: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pgn"))
        })
        .collect();
    scripts.sort();
    scripts.into_iter().next()
}

/// `(collected, total)` for the menu. Total falls back to the collected
/// count when the script declares no endings.
pub fn ending_stats(folder: &Path) -> (usize, usize) {
    let collected = match FileEndingStore::new(folder).collected() {
        Ok(endings) => endings.len(),
        Err(e) => {
            log::warn!("cannot read endings in {}: {e}", folder.display());
            0
        }
    };

    let declared = first_script(folder)
        .and_then(|path| std::fs::read_to_string(path).ok())
        .map(|text| parser::declared_endings(&text.lines().collect::<Vec<_>>()).len())
        .unwrap_or(0);

    if declared == 0 {
        (collected, collected)
    } else {
        (collected.min(declared), declared)
    }
}
