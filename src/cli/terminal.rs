//! Terminal presentation
//!
//! Prints text with a typewriter effect, reads choices and input from stdin
//! and hosts the pause menu and the debug console between lines.

use crate::error::Diagnostic;
use crate::host::Presentation;
use crate::runtime::context::DebugSession;
use crate::runtime::debug::{self, DebugReply};
use crate::types::command::TextColor;
use crate::types::signal::Interrupt;
use colored::{Color, Colorize};
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Shortest pause between two characters
const MIN_CHAR_DELAY_MS: u64 = 10;

pub struct TerminalPresentation {
    debug_console: bool,
}

impl TerminalPresentation {
    pub fn new(debug_console: bool) -> Self {
        Self { debug_console }
    }

    fn debug_console(&mut self, session: &mut dyn DebugSession) -> Interrupt {
        println!("{}", "=== debug console (type 'help') ===".yellow());
        loop {
            let Some(command) = prompt("debug>") else {
                return Interrupt::None;
            };
            match debug::execute(&command, session) {
                DebugReply::Output(text) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                }
                DebugReply::Jump(index) => return Interrupt::DebugJump(index),
                DebugReply::Exit => return Interrupt::None,
            }
        }
    }

    fn pause_menu(&mut self) -> Interrupt {
        loop {
            println!("{}", "--- Paused ---".bold());
            println!("  1. Continue");
            println!("  2. Save and exit");
            println!("  3. Exit without saving");
            let Some(answer) = prompt("Select (1-3):") else {
                return Interrupt::NoSaveExit;
            };
            match answer.as_str() {
                "1" | "" => return Interrupt::None,
                "2" => return Interrupt::SaveExit,
                "3" => return Interrupt::NoSaveExit,
                _ => println!("Invalid choice. Enter 1-3."),
            }
        }
    }
}

impl Presentation for TerminalPresentation {
    fn display(&mut self, text: &str, color: TextColor, seconds: f64) {
        let color = terminal_color(color);
        let delay = char_delay(text, seconds);
        let mut stdout = io::stdout();

        for ch in text.chars() {
            let _ = write!(stdout, "{}", ch.to_string().color(color));
            let _ = stdout.flush();
            if let Some(delay) = delay {
                std::thread::sleep(delay * punctuation_weight(ch));
            }
        }
        println!();
    }

    fn present_choice(&mut self, options: &[String]) -> usize {
        println!("{}", "--- Choice ---".bold());
        for (index, option) in options.iter().enumerate() {
            println!("{}. {option}", index + 1);
        }

        loop {
            let Some(answer) = prompt(&format!("Select (1-{}):", options.len())) else {
                // stdin closed: pick something out of range so the run ends
                return options.len();
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
                _ => println!("Invalid choice. Enter 1-{}.", options.len()),
            }
        }
    }

    fn read_line(&mut self, prompt_text: &str) -> String {
        prompt(prompt_text).unwrap_or_default()
    }

    fn interrupt_check(&mut self, session: &mut dyn DebugSession) -> Interrupt {
        let hint = if self.debug_console {
            "[Enter] next  [m] menu  [d] debug"
        } else {
            "[Enter] next  [m] menu"
        };
        let Some(answer) = prompt(&hint.dimmed().to_string()) else {
            return Interrupt::NoSaveExit;
        };

        match answer.as_str() {
            "m" | "menu" => self.pause_menu(),
            "d" | "debug" if self.debug_console => self.debug_console(session),
            _ => Interrupt::None,
        }
    }

    fn acknowledge(&mut self, message: &str) {
        println!();
        println!("{}", message.bold());
        let _ = prompt(&"Press Enter to continue".dimmed().to_string());
    }

    fn clear(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }

    fn report(&mut self, diagnostic: &Diagnostic) {
        eprintln!("{} {diagnostic}", "error:".red().bold());
        eprintln!("  {}", diagnostic.source);
        if let Some(column) = diagnostic.column {
            eprintln!("  {}{}", " ".repeat(column.saturating_sub(1)), "^".red());
        }
    }
}

/// Print a prompt and read one trimmed line; `None` on end of input
pub fn prompt(text: &str) -> Option<String> {
    if !text.is_empty() {
        print!("{text} ");
        let _ = io::stdout().flush();
    }

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn terminal_color(color: TextColor) -> Color {
    match color {
        TextColor::Black => Color::Black,
        TextColor::Blue => Color::Blue,
        TextColor::Green => Color::Green,
        TextColor::Aqua => Color::Cyan,
        TextColor::Red => Color::Red,
        TextColor::Purple => Color::Magenta,
        TextColor::Yellow => Color::Yellow,
        TextColor::White => Color::White,
    }
}

/// Pause after each character so the whole text takes about `seconds`
fn char_delay(text: &str, seconds: f64) -> Option<Duration> {
    let total_ms = (seconds * 1000.0) as u64;
    let chars = text.chars().count() as u64;
    if total_ms == 0 || chars == 0 {
        return None;
    }
    Some(Duration::from_millis((total_ms / chars).max(MIN_CHAR_DELAY_MS)))
}

fn punctuation_weight(ch: char) -> u32 {
    match ch {
        ',' | ';' => 3,
        '!' | '?' => 5,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_spreads_over_characters() {
        assert_eq!(char_delay("abcd", 1.0), Some(Duration::from_millis(250)));
        assert_eq!(char_delay("a long line of text", 0.05), Some(Duration::from_millis(10)));
        assert_eq!(char_delay("abc", 0.0), None);
        assert_eq!(char_delay("", 1.0), None);
    }

    #[test]
    fn punctuation_pauses_longer() {
        assert_eq!(punctuation_weight('a'), 1);
        assert_eq!(punctuation_weight(','), 3);
        assert_eq!(punctuation_weight('?'), 5);
    }

    #[test]
    fn aqua_and_purple_map_to_terminal_names() {
        assert_eq!(terminal_color(TextColor::Aqua), Color::Cyan);
        assert_eq!(terminal_color(TextColor::Purple), Color::Magenta);
    }
}
