//! File viewer used by `show`
//!
//! Only files with a known media or document extension and below a size
//! limit are handed to the system's default application.

use super::FileViewer;
use std::path::Path;
use std::process::Command as Process;
use thiserror::Error;

/// Extensions `show` may open, lowercase without the dot
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "md", "log", "ini", "inf", "cfg", "json", "xml", // text
    "jpg", "jpeg", "png", "bmp", "gif", "ico", // images
    "mp3", "wav", "ogg", "flac", // audio
    "mp4", "avi", "mkv", "mov", // video
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", // documents
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewRefusal {
    #[error("file does not exist")]
    Missing,
    #[error("extension '{0}' is not allowed")]
    Disallowed(String),
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

pub fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Opens vetted files with the platform's default application
#[derive(Debug, Clone)]
pub struct SafeFileViewer {
    max_size: u64,
}

impl SafeFileViewer {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// Check a file against the allow-list and the size limit
    pub fn check(&self, path: &Path) -> Result<(), ViewRefusal> {
        let metadata = std::fs::metadata(path).map_err(|_| ViewRefusal::Missing)?;
        if !metadata.is_file() {
            return Err(ViewRefusal::Missing);
        }
        if !is_allowed_extension(path) {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(ViewRefusal::Disallowed(ext));
        }
        if metadata.len() > self.max_size {
            return Err(ViewRefusal::TooLarge {
                size: metadata.len(),
                limit: self.max_size,
            });
        }
        Ok(())
    }

    fn opener(path: &Path) -> Process {
        if cfg!(target_os = "windows") {
            let mut process = Process::new("cmd");
            process.args(["/C", "start", ""]).arg(path);
            process
        } else if cfg!(target_os = "macos") {
            let mut process = Process::new("open");
            process.arg(path);
            process
        } else {
            let mut process = Process::new("xdg-open");
            process.arg(path);
            process
        }
    }
}

impl FileViewer for SafeFileViewer {
    fn open_safely(&mut self, path: &Path) -> bool {
        if let Err(refusal) = self.check(path) {
            log::warn!("refusing to open {}: {refusal}", path.display());
            return false;
        }

        match Self::opener(path).spawn() {
            Ok(_) => {
                log::info!("opened {}", path.display());
                true
            }
            Err(e) => {
                log::error!("cannot open {}: {e}", path.display());
                false
            }
        }
    }
}
