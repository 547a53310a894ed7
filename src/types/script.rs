//! A loaded script: its lines, its label table and where it came from

use crate::error::EngineError;
use crate::parser::labels::LabelTable;
use std::path::{Path, PathBuf};

/// Immutable for the duration of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    path: PathBuf,
    lines: Vec<String>,
    labels: LabelTable,
}

impl Script {
    /// Build a script from source text; `path` is used for saves and relative files
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        Self::from_lines(path, lines)
    }

    pub fn from_lines(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        let labels = LabelTable::build(&lines);
        Self {
            path: path.into(),
            lines,
            labels,
        }
    }

    /// Read a script file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| EngineError::script_read(path, e))?;
        let script = Self::from_source(path, &source);
        log::debug!(
            "read {} lines and {} labels from {}",
            script.len(),
            script.labels.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder holding the script; saves, archives and endings live next to it
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Resolve a jump target to a 0-based index inside this script
    pub fn resolve_index(&self, target: &str) -> Option<usize> {
        self.labels.resolve_index(target, self.lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_source_builds_labels() {
        let script = Script::from_source("novel/story.pgn", "start:\nsay hi\nend:\n");
        assert_eq!(script.len(), 3);
        assert_eq!(script.labels().get("start"), Some(1));
        assert_eq!(script.resolve_index("end"), Some(2));
        assert_eq!(script.folder(), Path::new("novel"));
    }

    #[test]
    fn load_missing_file_is_a_resource_error() {
        let err = Script::load("/definitely/not/here.pgn").unwrap_err();
        assert!(matches!(err, EngineError::ScriptRead { .. }));
    }
}
