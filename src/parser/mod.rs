//! Line pre-parser for PGN scripts
//!
//! Each line is classified by its first whitespace-delimited token into a
//! [`Command`]. Parsing happens when a line is about to run, so a mistake on
//! one line never stops the rest of the script from loading.

use crate::error::ScriptError;
use crate::types::command::{
    ChoiceOption, Command, DEFAULT_SAY_SECONDS, SayArgs, SetOp, TextColor,
};

pub mod labels;

#[cfg(test)]
mod tests;

/// Classify a single script line
pub fn parse_line(line: &str) -> Result<Command, ScriptError> {
    let body = line.trim_start();
    let Some(head) = body.split_whitespace().next() else {
        return Ok(Command::Empty);
    };

    if head.starts_with("//") || head.starts_with('#') {
        return Ok(Command::Comment);
    }

    if let Some(name) = head.strip_suffix(':') {
        return Ok(Command::Label {
            name: name.to_string(),
        });
    }

    let rest = &body[head.len()..];
    let args = LineArgs { line, rest };

    match head.to_ascii_lowercase().as_str() {
        "end" => Ok(Command::End),
        "endname" => args.endname(),
        "wait" => args.wait(),
        "say" => args.say(),
        "sayvar" => args.sayvar(),
        "input" => args.input(),
        "show" => args.show(),
        "choose" => args.choose(),
        "cls" | "clean" => Ok(Command::Clear),
        "random" => args.random(),
        "set" => args.set(),
        "jump" => args.jump(),
        "if" => args.condition(),
        "plugin" | "runplugin" => args.plugin(),
        "use" => args.use_plugin(),
        _ => Ok(Command::Unknown {
            command: head.to_string(),
        }),
    }
}

/// Names declared by `endname` lines, in order of first appearance
pub fn declared_endings<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in lines {
        let body = line.as_ref().trim_start();
        let Some(head) = body.split_whitespace().next() else {
            continue;
        };
        if !head.eq_ignore_ascii_case("endname") {
            continue;
        }
        let name = body[head.len()..].trim_matches([' ', '\t', '\r']);
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    names
}

/// Result of scanning a double-quoted string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted<'a> {
    pub text: String,
    /// Everything after the closing quote
    pub remainder: &'a str,
}

/// Scan a quoted string. `input` starts right after the opening quote.
///
/// Recognised escapes are `\"`, `\n`, `\t`, `\r` and `\\`; any other escaped
/// character keeps its backslash. Returns `None` when the closing quote is missing.
pub fn scan_quoted(input: &str) -> Option<Quoted<'_>> {
    let mut text = String::new();
    let mut chars = input.char_indices();

    while let Some((index, c)) = chars.next() {
        match c {
            '"' => {
                return Some(Quoted {
                    text,
                    remainder: &input[index + 1..],
                });
            }
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    '"' => text.push('"'),
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    '\\' => text.push('\\'),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
            }
            _ => text.push(c),
        }
    }

    None
}

/// A duration in seconds, as written after `say`. Only plain decimal numbers count.
fn parse_seconds(token: &str) -> Option<f64> {
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    token.parse::<f64>().ok().filter(|s| s.is_finite())
}

fn parse_int(command: &str, what: &str, token: Option<&str>) -> Result<i64, ScriptError> {
    let token = token.ok_or_else(|| ScriptError::malformed(command, format!("missing {what}")))?;
    token
        .parse::<i64>()
        .map_err(|_| ScriptError::malformed(command, format!("{what} '{token}' is not an integer")))
}

fn require<'a>(command: &str, what: &str, token: Option<&'a str>) -> Result<&'a str, ScriptError> {
    token.ok_or_else(|| ScriptError::malformed(command, format!("missing {what}")))
}

/// The arguments of one line, with enough context to compute columns
struct LineArgs<'a> {
    line: &'a str,
    /// Text after the command word
    rest: &'a str,
}

impl<'a> LineArgs<'a> {
    fn tokens(&self) -> std::str::SplitWhitespace<'a> {
        self.rest.split_whitespace()
    }

    /// 1-based character column of `fragment`, which must be a suffix of the line
    fn column_of(&self, fragment: &str) -> usize {
        let offset = self.line.len() - fragment.len();
        self.line[..offset].chars().count() + 1
    }

    fn missing_quote(&self, command: &str, opening: &str) -> ScriptError {
        ScriptError::MissingQuote {
            command: command.to_string(),
            column: self.column_of(opening),
        }
    }

    fn endname(&self) -> Result<Command, ScriptError> {
        let name = self.rest.trim_matches([' ', '\t', '\r']);
        if name.is_empty() {
            return Err(ScriptError::malformed("endname", "missing ending name"));
        }
        Ok(Command::EndName {
            name: name.to_string(),
        })
    }

    fn wait(&self) -> Result<Command, ScriptError> {
        let token = require("wait", "duration", self.tokens().next())?;
        let millis = token.parse::<u64>().map_err(|_| {
            ScriptError::malformed("wait", format!("duration '{token}' is not a number of milliseconds"))
        })?;
        Ok(Command::Wait { millis })
    }

    fn say(&self) -> Result<Command, ScriptError> {
        let body = self.rest.trim_start();
        if body.is_empty() {
            return Ok(Command::Empty);
        }

        if let Some(quote) = body.find('"') {
            let mut args = SayArgs::default();
            let prefix_is_params = body[..quote]
                .split_whitespace()
                .all(|token| apply_say_param(&mut args, token));

            if prefix_is_params {
                let opening = &body[quote..];
                let quoted =
                    scan_quoted(&opening[1..]).ok_or_else(|| self.missing_quote("say", opening))?;
                args.text = quoted.text;

                let mut trailing: Vec<&str> = quoted.remainder.split_whitespace().collect();
                if let Some(color) = trailing.last().and_then(|t| t.parse::<TextColor>().ok()) {
                    args.color = color;
                    trailing.pop();
                }
                if let Some(seconds) = trailing.last().and_then(|t| parse_seconds(t)) {
                    args.seconds = seconds;
                    trailing.pop();
                }
                if !trailing.is_empty() {
                    log::debug!("say: ignoring trailing tokens {trailing:?}");
                }
                return Ok(Command::Say(args));
            }
        }

        Ok(Command::Say(parse_unquoted_say(body)))
    }

    fn sayvar(&self) -> Result<Command, ScriptError> {
        let mut tokens = self.tokens();
        let name = require("sayvar", "variable name", tokens.next())?;
        let mut args = SayArgs::default();

        for token in tokens {
            if !apply_say_param(&mut args, token) {
                return Err(ScriptError::malformed(
                    "sayvar",
                    format!("'{token}' is neither a duration nor a colour"),
                ));
            }
        }

        Ok(Command::SayVar {
            name: name.to_string(),
            color: args.color,
            seconds: args.seconds,
        })
    }

    fn input(&self) -> Result<Command, ScriptError> {
        let body = self.rest.trim_start();

        let (prompt, after) = if body.starts_with('"') {
            let quoted = scan_quoted(&body[1..]).ok_or_else(|| self.missing_quote("input", body))?;
            (quoted.text, quoted.remainder)
        } else {
            (String::new(), body)
        };

        let var = require("input", "variable name", after.split_whitespace().next())?;
        Ok(Command::Input {
            prompt,
            var: var.to_string(),
        })
    }

    fn show(&self) -> Result<Command, ScriptError> {
        let file = require("show", "file name", self.tokens().next())?;
        Ok(Command::Show {
            file: file.to_string(),
        })
    }

    fn choose(&self) -> Result<Command, ScriptError> {
        let mut tokens = self.tokens();
        let count_token = require("choose", "option count", tokens.next())?;
        let count = count_token.parse::<usize>().map_err(|_| {
            ScriptError::malformed("choose", format!("option count '{count_token}' is not a number"))
        })?;

        let options: Vec<ChoiceOption> = tokens
            .take(count)
            .map(|token| match token.split_once(':') {
                Some((label, text)) => ChoiceOption {
                    label: label.to_string(),
                    text: text.to_string(),
                },
                None => ChoiceOption {
                    label: token.to_string(),
                    text: token.to_string(),
                },
            })
            .collect();

        if options.is_empty() {
            return Err(ScriptError::malformed("choose", "no options given"));
        }
        if options.len() < count {
            log::warn!("choose: expected {count} options, found {}", options.len());
        }

        Ok(Command::Choose { options })
    }

    fn random(&self) -> Result<Command, ScriptError> {
        let mut tokens = self.tokens();
        let var = require("random", "variable name", tokens.next())?;
        let min = parse_int("random", "minimum", tokens.next())?;
        let max = parse_int("random", "maximum", tokens.next())?;
        Ok(Command::Random {
            var: var.to_string(),
            min,
            max,
        })
    }

    fn set(&self) -> Result<Command, ScriptError> {
        let mut tokens = self.tokens();
        let var = require("set", "variable name", tokens.next())?;
        let op_token = require("set", "operator", tokens.next())?;
        let value = parse_int("set", "value", tokens.next())?;
        let op = op_token
            .parse::<SetOp>()
            .map_err(|_| ScriptError::InvalidOperator {
                op: op_token.to_string(),
            })?;
        Ok(Command::Set {
            var: var.to_string(),
            op,
            value,
        })
    }

    fn jump(&self) -> Result<Command, ScriptError> {
        let target = require("jump", "target", self.tokens().next())?;
        Ok(Command::Jump {
            target: target.to_string(),
        })
    }

    /// `if <condition> <target>`: the target is whatever follows the last whitespace
    fn condition(&self) -> Result<Command, ScriptError> {
        let body = self.rest.trim();
        let Some((condition, target)) = body.rsplit_once(char::is_whitespace) else {
            return Err(ScriptError::malformed("if", "expected a condition and a target"));
        };
        Ok(Command::If {
            condition: condition.trim().to_string(),
            target: target.to_string(),
        })
    }

    fn plugin(&self) -> Result<Command, ScriptError> {
        let body = self.rest.trim_start();
        let name = require("plugin", "plugin name", body.split_whitespace().next())?;
        let after = body[name.len()..].trim_start();

        let args = if after.starts_with('"') {
            scan_quoted(&after[1..])
                .ok_or_else(|| self.missing_quote("plugin", after))?
                .text
        } else {
            after.trim_end().to_string()
        };

        Ok(Command::Plugin {
            name: name.to_string(),
            args,
        })
    }

    fn use_plugin(&self) -> Result<Command, ScriptError> {
        let mut tokens = self.tokens();
        let name = require("use", "plugin name", tokens.next())?;
        Ok(Command::Use {
            name: name.to_string(),
            version: tokens.next().map(str::to_string),
        })
    }
}

/// Apply a colour or duration token; false when the token is neither
fn apply_say_param(args: &mut SayArgs, token: &str) -> bool {
    if let Ok(color) = token.parse::<TextColor>() {
        args.color = color;
        true
    } else if let Some(seconds) = parse_seconds(token) {
        args.seconds = seconds;
        true
    } else {
        false
    }
}

/// Legacy `say` without quotes: read from the end, the first colour and the
/// first number seen are parameters, everything else is text
fn parse_unquoted_say(body: &str) -> SayArgs {
    let mut color = None;
    let mut seconds = None;
    let mut words: Vec<&str> = Vec::new();

    for token in body.split_whitespace().rev() {
        if color.is_none()
            && let Ok(c) = token.parse::<TextColor>()
        {
            color = Some(c);
            continue;
        }
        if seconds.is_none()
            && let Some(s) = parse_seconds(token)
        {
            seconds = Some(s);
            continue;
        }
        words.push(token);
    }

    words.reverse();
    SayArgs {
        text: words.join(" "),
        color: color.unwrap_or_default(),
        seconds: seconds.unwrap_or(DEFAULT_SAY_SECONDS),
    }
}
