//! Save store
//!
//! A save is a text file `<script dir>/saves/<slot>.sav`: a `[SAVE_INFO]`
//! header with the script path, the line to resume at and a timestamp,
//! followed by the serialized game state.

use crate::error::EngineError;
use crate::types::state::GameState;
use std::path::{Path, PathBuf};

pub mod endings;

pub const SAVE_DIR: &str = "saves";
pub const SAVE_EXTENSION: &str = "sav";
const SECTION_SAVE_INFO: &str = "[SAVE_INFO]";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything needed to resume a run
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub script_path: PathBuf,
    /// 0-based line to resume at
    pub cursor: usize,
    pub state: GameState,
    /// `YYYY-MM-DD HH:MM:SS`, if the file had one
    pub saved_at: Option<String>,
}

/// What the menu shows about a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveInfo {
    NoSave,
    Saved { time: String },
    /// The save exists but carries no timestamp
    NoTimestamp,
    Unreadable,
}

/// Path of a slot for the given script
pub fn save_path(script_path: &Path, slot: &str) -> PathBuf {
    let dir = script_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(SAVE_DIR).join(format!("{slot}.{SAVE_EXTENSION}"))
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// Render a save file
pub fn encode(record: &SaveRecord) -> String {
    let mut out = String::new();
    out.push_str(SECTION_SAVE_INFO);
    out.push('\n');
    out.push_str(&format!("script_path={}\n", record.script_path.display()));
    out.push_str(&format!("current_line={}\n", record.cursor));
    if let Some(time) = &record.saved_at {
        out.push_str(&format!("save_time={time}\n"));
    }
    out.push('\n');
    out.push_str(&record.state.serialize());
    out
}

/// Parse a save file. Never fails: a missing or bad `current_line` means line 0.
pub fn decode(text: &str) -> SaveRecord {
    let mut script_path = PathBuf::new();
    let mut cursor = 0;
    let mut saved_at = None;
    let mut in_header = false;

    for raw in text.lines() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.starts_with('[') && line.ends_with(']') {
            in_header = line == SECTION_SAVE_INFO;
            continue;
        }
        if !in_header {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key {
            "script_path" => script_path = PathBuf::from(value),
            "current_line" => {
                cursor = value.trim().parse().unwrap_or_else(|_| {
                    log::warn!("invalid current_line '{value}' in save, using 0");
                    0
                })
            }
            "save_time" => saved_at = Some(value.to_string()),
            _ => {}
        }
    }

    SaveRecord {
        script_path,
        cursor,
        state: GameState::from_serialized(text),
        saved_at,
    }
}

/// Write a save for `script_path`, creating the `saves/` folder if needed
pub fn save(
    script_path: &Path,
    cursor: usize,
    state: &GameState,
    slot: &str,
) -> Result<PathBuf, EngineError> {
    let path = save_path(script_path, slot);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| EngineError::save_write(dir, e))?;
    }

    let record = SaveRecord {
        script_path: script_path.to_path_buf(),
        cursor,
        state: state.clone(),
        saved_at: Some(now_timestamp()),
    };
    let text = encode(&record);
    std::fs::write(&path, &text).map_err(|e| EngineError::save_write(&path, e))?;

    log::info!(
        "saved {} at line {} ({} bytes)",
        path.display(),
        cursor + 1,
        text.len()
    );
    Ok(path)
}

pub fn load(path: &Path) -> Result<SaveRecord, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|e| EngineError::save_read(path, e))?;
    let record = decode(&text);
    log::info!(
        "loaded {} (script {}, line {})",
        path.display(),
        record.script_path.display(),
        record.cursor + 1
    );
    Ok(record)
}

pub fn has_save(script_path: &Path, slot: &str) -> bool {
    save_path(script_path, slot).is_file()
}

pub fn save_info(script_path: &Path, slot: &str) -> SaveInfo {
    let path = save_path(script_path, slot);
    if !path.exists() {
        return SaveInfo::NoSave;
    }

    let Ok(text) = std::fs::read_to_string(&path) else {
        log::warn!("cannot read save {}", path.display());
        return SaveInfo::Unreadable;
    };
    match decode(&text).saved_at {
        Some(time) => SaveInfo::Saved { time },
        None => SaveInfo::NoTimestamp,
    }
}

pub fn delete_save(script_path: &Path, slot: &str) -> Result<(), EngineError> {
    let path = save_path(script_path, slot);
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| EngineError::save_write(&path, e))?;
        log::info!("deleted {}", path.display());
    }
    Ok(())
}
