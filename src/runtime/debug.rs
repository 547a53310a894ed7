//! Debug console
//!
//! Interprets one console command at a time against a [`DebugSession`].
//! The terminal front end owns the prompt loop; this module only turns a
//! command line into a reply, so it can be tested without a terminal.

use super::context::DebugSession;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Commands understood by the console
pub const COMMANDS: &[&str] = &[
    "help", "vars", "set", "add", "history", "endings", "info", "dump", "goto", "log", "exit",
    "quit",
];

/// What the console should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugReply {
    /// Print this and keep prompting
    Output(String),
    /// Leave the console and resume at this 0-based line
    Jump(usize),
    /// Leave the console and resume where the run was
    Exit,
}

/// Serializable picture of a run, printed by `dump`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub script_path: PathBuf,
    /// 1-based line about to run
    pub line: usize,
    pub line_count: usize,
    pub int_vars: BTreeMap<String, i64>,
    pub string_vars: BTreeMap<String, String>,
    pub choice_history: Vec<String>,
    pub collected_endings: Vec<String>,
    pub total_endings: usize,
}

impl DebugSnapshot {
    pub fn capture(session: &dyn DebugSession) -> Self {
        let state = session.state();
        Self {
            script_path: session.script_path().to_path_buf(),
            line: session.current_line() + 1,
            line_count: session.line_count(),
            int_vars: state.int_vars().clone(),
            string_vars: state.string_vars().clone(),
            choice_history: state.choice_history().to_vec(),
            collected_endings: state.collected_endings().to_vec(),
            total_endings: state.total_count(),
        }
    }
}

/// Run one console command
pub fn execute(command: &str, session: &mut dyn DebugSession) -> DebugReply {
    let command = command.trim();
    let (name, args) = match command.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (command, ""),
    };
    log::info!("[Debug] command: {command}");

    let output = match name {
        "" => String::new(),
        "exit" | "quit" => return DebugReply::Exit,
        "help" => help(),
        "vars" => vars(session),
        "set" => set(session, args),
        "add" => add(session, args),
        "history" => history(session),
        "endings" => endings(session),
        "info" => info(session),
        "dump" => dump(session),
        "log" => log_line(args),
        "goto" => match goto(session, args) {
            Ok(index) => return DebugReply::Jump(index),
            Err(message) => message,
        },
        other => unknown(other),
    };

    DebugReply::Output(output)
}

fn help() -> String {
    [
        "Commands:",
        "  vars                 show all variables",
        "  set <name> <int>     set an integer variable",
        "  set <name> \"text\"    set a string variable",
        "  add <name> <int>     add to an integer variable",
        "  history              show the choice history",
        "  endings              show collected endings",
        "  info                 show the current script and line",
        "  dump                 print the run as JSON",
        "  goto <line>          continue from a line (1-based)",
        "  log <level> <text>   write a line to the log",
        "  help                 show this help",
        "  exit | quit          leave the console",
    ]
    .join("\n")
}

fn vars(session: &dyn DebugSession) -> String {
    let state = session.state();
    let mut out = String::new();

    let _ = writeln!(out, "Integer variables:");
    if state.int_vars().is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, value) in state.int_vars() {
        let _ = writeln!(out, "  {name} = {value}");
    }

    let _ = writeln!(out, "String variables:");
    if state.string_vars().is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, value) in state.string_vars() {
        let _ = writeln!(out, "  {name} = {value:?}");
    }

    out.trim_end().to_string()
}

fn set(session: &mut dyn DebugSession, args: &str) -> String {
    const USAGE: &str = "usage: set <name> <int> | set <name> \"text\"";

    let Some((name, value)) = args.split_once(char::is_whitespace) else {
        return USAGE.to_string();
    };
    let value = value.trim();
    if value.is_empty() {
        return USAGE.to_string();
    }

    let quoted = ['"', '\''].into_iter().find_map(|q| {
        value
            .strip_prefix(q)
            .and_then(|v| v.strip_suffix(q))
            .filter(|_| value.len() >= 2)
    });

    if quoted.is_none()
        && let Ok(number) = value.parse::<i64>()
    {
        session.state_mut().set_int(name, number);
        log::info!("[Debug] set {name} = {number}");
        return format!("{name} = {number}");
    }

    let text = quoted.unwrap_or(value);
    session.state_mut().set_string(name, text);
    log::info!("[Debug] set {name} = {text:?}");
    format!("{name} = {text:?} ({} characters)", text.chars().count())
}

fn add(session: &mut dyn DebugSession, args: &str) -> String {
    let mut parts = args.split_whitespace();
    let (Some(name), Some(Ok(delta))) = (parts.next(), parts.next().map(str::parse::<i64>)) else {
        return "usage: add <name> <int>".to_string();
    };

    let state = session.state_mut();
    state.add_int(name, delta);
    format!("{name} = {}", state.get_int(name))
}

fn history(session: &dyn DebugSession) -> String {
    let history = session.state().choice_history();
    let mut out = format!("Choice history ({} entries):", history.len());
    for (index, choice) in history.iter().enumerate() {
        let _ = write!(out, "\n  {}. {choice}", index + 1);
    }
    out
}

fn endings(session: &dyn DebugSession) -> String {
    let state = session.state();
    let collected = state.collected_count();
    let total = state.total_count();

    let mut out = format!("Endings: {collected}/{total}");
    for (index, name) in state.collected_endings().iter().enumerate() {
        let _ = write!(out, "\n  {}. {name}", index + 1);
    }
    if total > 0 {
        let _ = write!(out, "\nProgress: {}%", collected * 100 / total);
    }
    out
}

fn info(session: &dyn DebugSession) -> String {
    let state = session.state();
    format!(
        "Script: {}\nLine: {}/{}\nCollected endings: {}\nChoices made: {}",
        session.script_path().display(),
        session.current_line() + 1,
        session.line_count(),
        state.collected_count(),
        state.choice_history().len()
    )
}

fn dump(session: &dyn DebugSession) -> String {
    match serde_json::to_string_pretty(&DebugSnapshot::capture(session)) {
        Ok(json) => json,
        Err(e) => format!("cannot serialize state: {e}"),
    }
}

fn log_line(args: &str) -> String {
    const USAGE: &str = "usage: log <error|warn|info|debug|trace> <text>";

    let (level, message) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    match level.parse::<log::Level>() {
        Ok(level) => {
            log::log!(target: "pgn::console", level, "{}", message.trim());
            String::new()
        }
        Err(_) => USAGE.to_string(),
    }
}

fn goto(session: &dyn DebugSession, args: &str) -> Result<usize, String> {
    let line = args
        .parse::<usize>()
        .map_err(|_| "usage: goto <line>".to_string())?;
    if line == 0 || line > session.line_count() {
        return Err(format!(
            "line must be between 1 and {}",
            session.line_count()
        ));
    }
    log::info!("[Debug] goto line {line}");
    Ok(line - 1)
}

fn unknown(command: &str) -> String {
    let mut out = format!("unknown command: {command}");
    let closest = COMMANDS
        .iter()
        .map(|c| (c, strsim::levenshtein(command, c)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance);
    if let Some((suggestion, _)) = closest {
        let _ = write!(out, "\ndid you mean: {suggestion}?");
    }
    out.push_str("\ntype 'help' for a list of commands");
    out
}
