//! Log backend
//!
//! A small `log::Log` implementation writing
//! `<YYYY-MM-DD HH:MM:SS> [LEVEL] target: message` lines to stderr or a file.

use crate::config::LogConfig;
use crate::error::EngineError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable that raises the level to `debug`
pub const DEBUG_ENV: &str = "PGN_DEBUG";

/// Where log lines go
#[derive(Debug)]
pub enum LogOutput {
    Stderr,
    File { path: PathBuf, file: Mutex<File> },
}

impl LogOutput {
    /// Log file path, if logging to a file
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stderr => None,
            Self::File { path, .. } => Some(path),
        }
    }
}

#[derive(Debug)]
pub struct EngineLogger {
    level: LevelFilter,
    output: LogOutput,
}

impl EngineLogger {
    /// Build a logger from the config without installing it.
    /// A disabled config yields `LevelFilter::Off`.
    pub fn from_config(config: &LogConfig) -> Result<Self, EngineError> {
        let level = effective_level(config, std::env::var_os(DEBUG_ENV).is_some())?;

        let output = match &config.file {
            Some(path) if config.enabled => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        EngineError::Logger(format!("cannot create {}: {e}", dir.display()))
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        EngineError::Logger(format!("cannot open {}: {e}", path.display()))
                    })?;
                LogOutput::File {
                    path: path.clone(),
                    file: Mutex::new(file),
                }
            }
            _ => LogOutput::Stderr,
        };

        Ok(Self { level, output })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn output(&self) -> &LogOutput {
        &self.output
    }

    /// Install as the global logger
    pub fn install(self) -> Result<(), EngineError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).map_err(|e| EngineError::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }
}

/// Install a logger for `config`; returns the log file path, if any
pub fn init(config: &LogConfig) -> Result<Option<PathBuf>, EngineError> {
    let logger = EngineLogger::from_config(config)?;
    let path = logger.output().path().map(Path::to_path_buf);
    logger.install()?;
    log::debug!("logging initialised");
    Ok(path)
}

fn effective_level(config: &LogConfig, debug_env: bool) -> Result<LevelFilter, EngineError> {
    if !config.enabled {
        return Ok(LevelFilter::Off);
    }
    let level: LevelFilter = config
        .level
        .parse()
        .map_err(|_| EngineError::Logger(format!("unknown log level '{}'", config.level)))?;
    if debug_env && level < LevelFilter::Debug {
        return Ok(LevelFilter::Debug);
    }
    Ok(level)
}

/// One formatted log line, without the trailing newline
pub fn format_line(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("{timestamp} [{level}] {target}: {message}")
}

impl Log for EngineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let line = format_line(
            &timestamp,
            record.level(),
            record.target(),
            &record.args().to_string(),
        );

        match &self.output {
            LogOutput::Stderr => eprintln!("{line}"),
            LogOutput::File { file, .. } => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{line}");
                }
            }
        }
    }

    fn flush(&self) {
        if let LogOutput::File { file, .. } = &self.output
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}
