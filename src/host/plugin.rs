//! Plugins: version rule, argument templating and the directory-backed host
//!
//! A plugin is a folder `<plugins_dir>/<name>/` holding an `about.cfg`
//! manifest that says how to launch it.

use super::PluginHost;
use crate::types::state::GameState;
use std::path::{Path, PathBuf};
use std::process::Command as Process;
use thiserror::Error;

/// Manifest file inside every plugin folder
pub const MANIFEST_FILE: &str = "about.cfg";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin directory {} does not exist", dir.display())]
    PluginsUnavailable { dir: PathBuf },

    #[error("plugin '{name}' is not installed")]
    Missing { name: String },

    #[error("plugin '{name}' {} does not satisfy required version {required}", installed.as_deref().unwrap_or("(no version)"))]
    VersionMismatch {
        name: String,
        required: String,
        installed: Option<String>,
    },

    #[error("cannot launch plugin '{name}': {message}")]
    Launch { name: String, message: String },

    #[error("plugin '{name}' exited with code {code}")]
    Failed { name: String, code: i32 },

    #[error("bad manifest for plugin '{name}': {reason}")]
    BadManifest { name: String, reason: String },
}

/// Strip a leading `v` and take everything before the first `.`
fn major(version: &str) -> Option<u64> {
    let version = version.trim();
    let version = version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version);
    version.split('.').next()?.parse().ok()
}

/// Whether an installed version satisfies a requirement.
///
/// Any installed major version at or above the required one is accepted,
/// whatever the minor and patch parts. Versions without a numeric major
/// part must match exactly.
pub fn version_satisfies(installed: &str, required: &str) -> bool {
    match (major(installed), major(required)) {
        (Some(installed), Some(required)) => installed >= required,
        _ => installed.trim() == required.trim(),
    }
}

/// Values available to plugin argument templates
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub script_dir: &'a Path,
    /// Log file path; `None` when logging goes to stderr
    pub log_file: Option<&'a Path>,
    pub state: &'a GameState,
}

/// Expand `$file{rel}`, `$log` and `${var}` in plugin arguments.
/// An unterminated `$file{` or `${` is copied as written.
pub fn expand_template(input: &str, ctx: &TemplateContext<'_>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let tail = &rest[dollar..];

        if let Some(body) = tail.strip_prefix("$file{") {
            let Some(end) = body.find('}') else {
                out.push_str(tail);
                return out;
            };
            out.push_str(&ctx.script_dir.join(&body[..end]).to_string_lossy());
            rest = &body[end + 1..];
        } else if let Some(body) = tail.strip_prefix("${") {
            let Some(end) = body.find('}') else {
                out.push_str(tail);
                return out;
            };
            out.push_str(&ctx.state.resolve_placeholder(&body[..end]));
            rest = &body[end + 1..];
        } else if let Some(after) = tail.strip_prefix("$log") {
            if let Some(path) = ctx.log_file {
                out.push_str(&path.to_string_lossy());
            }
            rest = after;
        } else {
            out.push('$');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Split plugin arguments, then expand templates in each one, so substituted
/// values never change how many arguments there are
pub fn expand_args(input: &str, ctx: &TemplateContext<'_>) -> Vec<String> {
    split_args(input)
        .iter()
        .map(|arg| expand_template(arg, ctx))
        .collect()
}

/// Split a command line on whitespace, keeping double-quoted runs together
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }
    args
}

/// Parsed `about.cfg`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginManifest {
    pub run_command: Option<String>,
    pub run_file: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

impl PluginManifest {
    /// `key = value` lines; `#` starts a comment line, surrounding quotes are stripped
    pub fn parse(text: &str) -> Self {
        let mut manifest = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim()).to_string();

            match key.trim() {
                "RunCommand" => manifest.run_command = Some(value),
                "RunFile" => manifest.run_file = Some(value),
                "Version" => manifest.version = Some(value),
                "Description" => manifest.description = Some(value),
                "Author" => manifest.author = Some(value),
                other => log::debug!("about.cfg: ignoring key '{other}'"),
            }
        }

        manifest
    }

    /// True when `RunFile` is meant to be executed directly
    pub fn runs_directly(&self) -> bool {
        matches!(
            self.run_command.as_deref().map(str::trim),
            None | Some("" | ".exe" | "bin" | "/")
        )
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Plugins installed as folders under one directory
#[derive(Debug, Clone)]
pub struct DirectoryPluginHost {
    root: PathBuf,
}

impl DirectoryPluginHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plugin_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn manifest(&self, name: &str) -> Result<PluginManifest, PluginError> {
        let dir = self.plugin_dir(name);
        if !dir.is_dir() {
            return Err(PluginError::Missing {
                name: name.to_string(),
            });
        }

        let text = std::fs::read_to_string(dir.join(MANIFEST_FILE)).map_err(|e| {
            PluginError::BadManifest {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(PluginManifest::parse(&text))
    }

    /// Build the process for a plugin run without starting it
    pub fn command(&self, name: &str, args: &[String]) -> Result<Process, PluginError> {
        let manifest = self.manifest(name)?;
        let bad = |reason: &str| PluginError::BadManifest {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let run_file = manifest
            .run_file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| bad("missing RunFile"))?;
        let run_file = {
            let path = Path::new(run_file);
            if path.is_relative() {
                self.plugin_dir(name).join(path)
            } else {
                path.to_path_buf()
            }
        };

        let mut process = if manifest.runs_directly() {
            Process::new(&run_file)
        } else {
            let launcher = split_args(manifest.run_command.as_deref().unwrap_or_default());
            let (program, launcher_args) = launcher
                .split_first()
                .ok_or_else(|| bad("empty RunCommand"))?;
            let mut process = Process::new(program);
            process.args(launcher_args).arg(&run_file);
            process
        };

        process.args(args);
        Ok(process)
    }
}

impl PluginHost for DirectoryPluginHost {
    fn plugins_available(&self) -> bool {
        self.root.is_dir()
    }

    fn plugin_exists(&self, name: &str) -> bool {
        self.plugin_dir(name).is_dir()
    }

    fn plugin_version(&self, name: &str) -> Option<String> {
        self.manifest(name).ok()?.version
    }

    fn run_plugin(&mut self, name: &str, args: &[String]) -> Result<i32, PluginError> {
        let mut process = self.command(name, args)?;
        log::info!("running plugin {name}: {process:?}");

        let started = std::time::Instant::now();
        let status = process.status().map_err(|e| PluginError::Launch {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let code = status.code().unwrap_or(-1);
        log::info!(
            "plugin {name} exited with {code} after {}ms",
            started.elapsed().as_millis()
        );
        Ok(code)
    }
}
